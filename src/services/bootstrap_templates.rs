use crate::{
    error::AppResult,
    models::{template, Template},
    services::event::{Channel, EventType},
    services::template::DEFAULT_LANGUAGE,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

struct Seed {
    event_type: EventType,
    channel: Channel,
    title: &'static str,
    message: &'static str,
    email_subject: Option<&'static str>,
    email_html: Option<&'static str>,
}

/// Insert any missing default-language templates at startup. Existing rows
/// (including admin-edited ones) are left untouched, so this is safe to run
/// on every boot. Guarantees every emitted (type, channel) pair has its
/// default-language variant.
pub async fn ensure_default_templates(db: &DatabaseConnection) -> AppResult<usize> {
    let mut inserted = 0;

    for seed in default_templates() {
        let exists = Template::find()
            .filter(template::Column::EventType.eq(seed.event_type.as_str()))
            .filter(template::Column::Language.eq(DEFAULT_LANGUAGE))
            .filter(template::Column::Channel.eq(seed.channel.as_str()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let model = template::ActiveModel {
            event_type: sea_orm::ActiveValue::Set(seed.event_type.as_str().to_string()),
            language: sea_orm::ActiveValue::Set(DEFAULT_LANGUAGE.to_string()),
            channel: sea_orm::ActiveValue::Set(seed.channel.as_str().to_string()),
            title_pattern: sea_orm::ActiveValue::Set(seed.title.to_string()),
            message_pattern: sea_orm::ActiveValue::Set(seed.message.to_string()),
            email_subject_pattern: sea_orm::ActiveValue::Set(
                seed.email_subject.map(|s| s.to_string()),
            ),
            email_html_pattern: sea_orm::ActiveValue::Set(seed.email_html.map(|s| s.to_string())),
            priority: sea_orm::ActiveValue::Set(
                seed.event_type.default_priority().as_str().to_string(),
            ),
            is_active: sea_orm::ActiveValue::Set(true),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };
        model.insert(db).await?;
        inserted += 1;
    }

    if inserted > 0 {
        tracing::info!(inserted, "seeded default notification templates");
    }
    Ok(inserted)
}

// The order_updated message joins the changed-field phrases with commas via
// nested conditions on the `changes.*` booleans, so the separator only
// appears between two phrases that are both present.
const ORDER_UPDATED_MESSAGE: &str = "Order {{orderId}} was updated: \
{{#if changes.customer}}customer changed{{#if changes.items}}, {{/if}}{{/if}}\
{{#if changes.items}}items modified{{#if changes.totalAmount}}, {{/if}}{{/if}}\
{{#if changes.totalAmount}}total updated to {{totalAmount}}{{/if}}";

fn default_templates() -> Vec<Seed> {
    vec![
        Seed {
            event_type: EventType::OrderCreated,
            channel: Channel::InApp,
            title: "New order received",
            message: "Order {{orderId}} from {{customerName}}, total {{totalAmount}}",
            email_subject: None,
            email_html: None,
        },
        Seed {
            event_type: EventType::OrderCreated,
            channel: Channel::Email,
            title: "New order received",
            message: "Order {{orderId}} from {{customerName}}, total {{totalAmount}}",
            email_subject: Some("New order {{orderId}}"),
            email_html: Some(
                "<p>Order <strong>{{orderId}}</strong> was placed by {{customerName}}.</p>\
                 <p>Total: {{totalAmount}}</p>",
            ),
        },
        Seed {
            event_type: EventType::OrderUpdated,
            channel: Channel::InApp,
            title: "Order updated",
            message: ORDER_UPDATED_MESSAGE,
            email_subject: None,
            email_html: None,
        },
        Seed {
            event_type: EventType::OrderUpdated,
            channel: Channel::Email,
            title: "Order updated",
            message: ORDER_UPDATED_MESSAGE,
            email_subject: Some("Order {{orderId}} updated"),
            email_html: Some("<p>{{#if changes.customer}}The customer on order {{orderId}} changed. {{/if}}{{#if changes.items}}Items on order {{orderId}} were modified. {{/if}}{{#if changes.totalAmount}}The total is now {{totalAmount}}.{{/if}}</p>"),
        },
        Seed {
            event_type: EventType::StockMedium,
            channel: Channel::InApp,
            title: "Stock running down",
            message: "{{productName}} is down to {{currentStock}} units{{#if category}} ({{category}}){{/if}}",
            email_subject: None,
            email_html: None,
        },
        Seed {
            event_type: EventType::StockMedium,
            channel: Channel::Email,
            title: "Stock running down",
            message: "{{productName}} is down to {{currentStock}} units",
            email_subject: Some("Stock notice: {{productName}}"),
            email_html: Some(
                "<p>{{productName}} is down to <strong>{{currentStock}}</strong> units.</p>",
            ),
        },
        Seed {
            event_type: EventType::StockLow,
            channel: Channel::InApp,
            title: "Low stock warning",
            message: "Only {{currentStock}} units of {{productName}} left",
            email_subject: None,
            email_html: None,
        },
        Seed {
            event_type: EventType::StockLow,
            channel: Channel::Email,
            title: "Low stock warning",
            message: "Only {{currentStock}} units of {{productName}} left",
            email_subject: Some("Low stock: {{productName}}"),
            email_html: Some(
                "<p>Only <strong>{{currentStock}}</strong> units of {{productName}} left.\
                 {{#if category}} Category: {{category}}.{{/if}}</p>",
            ),
        },
        Seed {
            event_type: EventType::StockOut,
            channel: Channel::InApp,
            title: "Out of stock",
            message: "{{productName}} is out of stock",
            email_subject: None,
            email_html: None,
        },
        Seed {
            event_type: EventType::StockOut,
            channel: Channel::Email,
            title: "Out of stock",
            message: "{{productName}} is out of stock",
            email_subject: Some("Out of stock: {{productName}}"),
            email_html: Some("<p><strong>{{productName}}</strong> is out of stock.</p>"),
        },
        Seed {
            event_type: EventType::CustomerRegistered,
            channel: Channel::InApp,
            title: "New customer",
            message: "{{customerName}} just registered",
            email_subject: None,
            email_html: None,
        },
        Seed {
            event_type: EventType::CustomerRegistered,
            channel: Channel::Email,
            title: "New customer",
            message: "{{customerName}} just registered",
            email_subject: Some("New customer: {{customerName}}"),
            email_html: Some("<p>{{customerName}} just registered.</p>"),
        },
        Seed {
            event_type: EventType::SystemAlert,
            channel: Channel::InApp,
            title: "System alert",
            message: "{{message}}",
            email_subject: None,
            email_html: None,
        },
        Seed {
            event_type: EventType::SystemAlert,
            channel: Channel::Email,
            title: "System alert",
            message: "{{message}}",
            email_subject: Some("System alert"),
            email_html: Some("<p>{{message}}</p>"),
        },
    ]
}
