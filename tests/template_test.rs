use serde_json::json;
use verko::models::template::Model as TemplateModel;
use verko::services::event::Channel;
use verko::services::template::TemplateService;

fn template(
    event_type: &str,
    language: &str,
    channel: &str,
    title: &str,
    message: &str,
) -> TemplateModel {
    TemplateModel {
        id: 0,
        event_type: event_type.to_string(),
        language: language.to_string(),
        channel: channel.to_string(),
        title_pattern: title.to_string(),
        message_pattern: message.to_string(),
        email_subject_pattern: None,
        email_html_pattern: None,
        priority: "medium".to_string(),
        is_active: true,
        created_at: chrono::Utc::now().naive_utc(),
    }
}

#[test]
fn missing_language_falls_back_to_default() {
    let svc = TemplateService::from_models(&[template(
        "stock_low",
        "en",
        "in_app",
        "Low stock warning",
        "Only {{currentStock}} units of {{productName}} left",
    )]);

    let tpl = svc
        .resolve("stock_low", "sv", Channel::InApp)
        .expect("default-language fallback");
    assert_eq!(tpl.language, "en");

    let out = tpl.render(&json!({"currentStock": 2, "productName": "Beans"}));
    assert_eq!(out.title, "Low stock warning");
    assert_eq!(out.message, "Only 2 units of Beans left");
}

#[test]
fn requested_language_wins_over_default() {
    let svc = TemplateService::from_models(&[
        template("stock_low", "en", "in_app", "Low stock warning", "en body"),
        template("stock_low", "de", "in_app", "Bestand niedrig", "de body"),
    ]);

    let tpl = svc.resolve("stock_low", "de", Channel::InApp).unwrap();
    assert_eq!(tpl.language, "de");
    assert_eq!(tpl.render(&json!({})).title, "Bestand niedrig");
}

#[test]
fn miss_on_one_channel_does_not_affect_the_other() {
    let svc = TemplateService::from_models(&[template(
        "customer_registered",
        "en",
        "in_app",
        "New customer",
        "{{customerName}} just registered",
    )]);

    assert!(svc
        .resolve("customer_registered", "en", Channel::Email)
        .is_none());
    assert!(svc
        .resolve("customer_registered", "en", Channel::InApp)
        .is_some());
}

#[test]
fn rtl_variant_uses_the_same_variable_contract() {
    let svc = TemplateService::from_models(&[
        template("stock_out", "en", "in_app", "Out of stock", "{{productName}} is out of stock"),
        template("stock_out", "ar", "in_app", "نفد المخزون", "نفد مخزون {{productName}}"),
    ]);

    let vars = json!({"productName": "Sugar"});
    let en = svc.resolve("stock_out", "en", Channel::InApp).unwrap();
    let ar = svc.resolve("stock_out", "ar", Channel::InApp).unwrap();
    assert_eq!(en.render(&vars).message, "Sugar is out of stock");
    assert_eq!(ar.render(&vars).message, "نفد مخزون Sugar");
}

#[test]
fn inactive_templates_are_not_loaded_when_filtered_upstream() {
    // from_models receives pre-filtered rows; an empty set resolves nothing.
    let svc = TemplateService::from_models(&[]);
    assert!(svc.resolve("order_created", "en", Channel::InApp).is_none());
}
