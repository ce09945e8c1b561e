use crate::{
    error::AppResult,
    models::{delivery, Delivery, NotificationModel, UserModel},
    services::{
        email::EmailService,
        event::{Channel, EventType},
        preference::PreferenceService,
        template::TemplateService,
    },
};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

/// Routes one notification to one recipient: resolves their preference,
/// renders per channel, creates the delivery row, then attempts email. The
/// in-app row is durable before email is tried, and an email failure only
/// leaves that delivery's email state pending.
pub struct DeliveryRouter {
    db: DatabaseConnection,
    templates: TemplateService,
    preferences: PreferenceService,
    email: EmailService,
}

impl DeliveryRouter {
    pub fn new(
        db: DatabaseConnection,
        templates: TemplateService,
        preferences: PreferenceService,
        email: EmailService,
    ) -> Self {
        Self {
            db,
            templates,
            preferences,
            email,
        }
    }

    /// Create and route the delivery for one recipient. A duplicate
    /// (notification, user) pair is a no-op, which makes fan-out retries
    /// safe.
    pub async fn deliver(
        &self,
        notification: &NotificationModel,
        user: &UserModel,
    ) -> AppResult<()> {
        let event_type = EventType::parse(&notification.event_type)?;
        let prefs = self.preferences.resolve(user, event_type).await?;

        // In-app content is rendered up front in the recipient's language
        // and stored on the row. Disabled channel or missing template means
        // the row exists for audit but is never surfaced.
        let (title, message, visible) = if prefs.in_app_enabled {
            match self
                .templates
                .resolve(&notification.event_type, &prefs.language, Channel::InApp)
            {
                Some(tpl) => {
                    let rendered = tpl.render(&notification.payload);
                    (rendered.title, rendered.message, true)
                }
                None => (String::new(), String::new(), false),
            }
        } else {
            (String::new(), String::new(), false)
        };

        let now = chrono::Utc::now().naive_utc();
        let row = delivery::ActiveModel {
            notification_id: Set(notification.id),
            user_id: Set(user.id),
            title: Set(title),
            message: Set(message),
            is_read: Set(false),
            read_at: Set(None),
            is_visible: Set(visible),
            hidden_at: Set(None),
            is_email_sent: Set(false),
            email_sent_at: Set(None),
            created_at: Set(now),
            ..Default::default()
        };

        let delivery_id = match Delivery::insert(row)
            .on_conflict(
                OnConflict::columns([delivery::Column::NotificationId, delivery::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await
        {
            Ok(result) => result.last_insert_id,
            Err(DbErr::RecordNotInserted) => {
                tracing::debug!(
                    notification_id = notification.id,
                    user_id = user.id,
                    "delivery already exists, skipping"
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if prefs.email_enabled {
            self.try_email(notification, user, &prefs.language, delivery_id)
                .await?;
        }

        Ok(())
    }

    /// Email sub-state only ever goes pending -> sent. A failed or skipped
    /// send leaves the flag pending for a later retry sweep.
    async fn try_email(
        &self,
        notification: &NotificationModel,
        user: &UserModel,
        language: &str,
        delivery_id: i32,
    ) -> AppResult<()> {
        if !self.email.is_configured() {
            tracing::debug!(user_id = user.id, "SMTP not configured, leaving email pending");
            return Ok(());
        }

        let Some(tpl) = self
            .templates
            .resolve(&notification.event_type, language, Channel::Email)
        else {
            return Ok(());
        };

        let rendered = tpl.render(&notification.payload);
        let subject = rendered.subject.unwrap_or(rendered.title);
        let html = rendered.html.unwrap_or(rendered.message);

        match self.email.send(&user.email, &subject, &html).await {
            Ok(()) => {
                let now = chrono::Utc::now().naive_utc();
                Delivery::update_many()
                    .col_expr(delivery::Column::IsEmailSent, Expr::value(true))
                    .col_expr(delivery::Column::EmailSentAt, Expr::value(now))
                    .filter(delivery::Column::Id.eq(delivery_id))
                    .exec(&self.db)
                    .await?;
            }
            Err(e) => {
                tracing::warn!(
                    notification_id = notification.id,
                    user_id = user.id,
                    error = %e,
                    "email send failed, delivery left pending"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{preference, TemplateModel};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn order_notification(event_type: &str) -> NotificationModel {
        NotificationModel {
            id: 7,
            event_type: event_type.to_string(),
            payload: json!({"orderId": "A-1", "customerName": "Iris", "totalAmount": 10}),
            related_entity_type: Some("order".to_string()),
            related_entity_id: Some(1),
            target_roles: json!(["admin", "manager"]),
            priority: "medium".to_string(),
            created_by: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn recipient() -> UserModel {
        UserModel {
            id: 3,
            username: "iris".to_string(),
            email: "iris@example.com".to_string(),
            role: "manager".to_string(),
            language: "en".to_string(),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn templates() -> TemplateService {
        TemplateService::from_models(&[TemplateModel {
            id: 0,
            event_type: "order_created".to_string(),
            language: "en".to_string(),
            channel: "in_app".to_string(),
            title_pattern: "New order received".to_string(),
            message_pattern: "Order {{orderId}} from {{customerName}}".to_string(),
            email_subject_pattern: None,
            email_html_pattern: None,
            priority: "medium".to_string(),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }])
    }

    fn router(db: DatabaseConnection) -> DeliveryRouter {
        // `DatabaseConnection` is not `Clone` with the mock feature on, but
        // the mock variant holds an `Arc`, so a second handle to the same
        // connection can be rebuilt from it.
        let prefs_db = match &db {
            DatabaseConnection::MockDatabaseConnection(conn) => {
                DatabaseConnection::MockDatabaseConnection(conn.clone())
            }
            _ => unreachable!("tests run against the mock backend"),
        };
        DeliveryRouter::new(
            db,
            templates(),
            PreferenceService::new(prefs_db),
            EmailService::from_env(),
        )
    }

    #[tokio::test]
    async fn test_duplicate_delivery_insert_is_noop() {
        // No preference row, then the delivery insert hits the unique
        // (notification_id, user_id) index: ON CONFLICT DO NOTHING returns
        // no row, which deliver treats as already-delivered, not an error.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<preference::Model>::new()])
            .append_query_results([Vec::<delivery::Model>::new()])
            .into_connection();

        let result = router(db)
            .deliver(&order_notification("order_created"), &recipient())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_event_type_rejected_before_any_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = router(db)
            .deliver(&order_notification("price_exploded"), &recipient())
            .await;
        assert!(matches!(result, Err(AppError::InvalidEvent(_))));
    }
}
