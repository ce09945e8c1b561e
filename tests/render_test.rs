use serde_json::json;
use verko::utils::render::render;

#[test]
fn order_update_separator_logic() {
    // Mirrors the seeded order_updated message: comma only between two
    // phrases that are both present, no leading or trailing punctuation.
    let tpl = "{{#if changes.customer}}customer changed{{#if changes.items}}, {{/if}}{{/if}}\
{{#if changes.items}}items modified{{#if changes.totalAmount}}, {{/if}}{{/if}}\
{{#if changes.totalAmount}}total updated{{/if}}";

    let vars = json!({"changes": {"customer": true, "items": true, "totalAmount": false}});
    assert_eq!(render(tpl, &vars), "customer changed, items modified");

    let vars = json!({"changes": {"customer": false, "items": true, "totalAmount": true}});
    assert_eq!(render(tpl, &vars), "items modified, total updated");

    let vars = json!({"changes": {"customer": true, "items": false, "totalAmount": true}});
    // No items phrase, so the customer block must not emit its separator.
    assert_eq!(render(tpl, &vars), "customer changedtotal updated");

    let vars = json!({"changes": {"customer": false, "items": false, "totalAmount": false}});
    assert_eq!(render(tpl, &vars), "");
}

#[test]
fn payload_fields_missing_from_template_degrade_gracefully() {
    // A template referencing a variable absent from this event's payload
    // renders the gap as empty instead of failing the notification.
    let tpl = "Order {{orderId}} for {{customerName}}";
    let vars = json!({"orderId": "A-7"});
    assert_eq!(render(tpl, &vars), "Order A-7 for ");
}

#[test]
fn unknown_tags_are_preserved_verbatim() {
    let tpl = "{{#unless x}}kept{{/unless}} and {{valid}}";
    let vars = json!({"valid": "ok"});
    assert_eq!(render(tpl, &vars), "{{#unless x}}kept{{/unless}} and ok");
}

#[test]
fn deeply_nested_same_condition() {
    let tpl = "{{#if a}}1{{#if a}}2{{#if a}}3{{/if}}{{/if}}{{/if}}";
    assert_eq!(render(tpl, &json!({"a": true})), "123");
    assert_eq!(render(tpl, &json!({"a": false})), "");
}

#[test]
fn numeric_and_boolean_values_render_as_text() {
    let vars = json!({"currentStock": 4, "urgent": true});
    assert_eq!(
        render("{{currentStock}} left, urgent={{urgent}}", &vars),
        "4 left, urgent=true"
    );
}
