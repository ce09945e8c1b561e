use crate::{
    error::{AppError, AppResult},
    models::{delivery, notification, user, Delivery, DeliveryModel, User, UserModel},
    services::{delivery::DeliveryRouter, event::Event},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

pub struct NotificationService {
    db: DatabaseConnection,
    router: DeliveryRouter,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection, router: DeliveryRouter) -> Self {
        Self { db, router }
    }

    /// Publish an event: validate, persist the broadcast record, resolve the
    /// audience from roles, then fan out one delivery per recipient. Zero
    /// recipients is an empty broadcast, not an error.
    pub async fn publish(&self, event: Event) -> AppResult<i32> {
        event.validate()?;
        let roles = effective_roles(&event);
        let notification = self.insert_notification(&event, &roles).await?;
        let recipients = self.resolve_recipients(&event, &roles).await?;
        self.fan_out(&notification, &recipients).await;
        Ok(notification.id)
    }

    /// Targeted variant for callers that already know the audience. The
    /// stock path uses this because each recipient's thresholds decide
    /// whether they are notified at all.
    pub async fn publish_to_users(&self, event: Event, user_ids: &[i32]) -> AppResult<i32> {
        event.validate()?;
        let roles = effective_roles(&event);
        let notification = self.insert_notification(&event, &roles).await?;

        let recipients = User::find()
            .filter(user::Column::Id.is_in(user_ids.to_vec()))
            .filter(user::Column::IsActive.eq(true))
            .all(&self.db)
            .await?;
        self.fan_out(&notification, &recipients).await;
        Ok(notification.id)
    }

    async fn insert_notification(
        &self,
        event: &Event,
        roles: &[String],
    ) -> AppResult<notification::Model> {
        let now = chrono::Utc::now().naive_utc();
        let model = notification::ActiveModel {
            event_type: Set(event.event_type.as_str().to_string()),
            payload: Set(event.payload.clone()),
            related_entity_type: Set(event.related_entity_type.clone()),
            related_entity_id: Set(event.related_entity_id),
            target_roles: Set(serde_json::Value::from(roles.to_vec())),
            priority: Set(event.priority().as_str().to_string()),
            created_by: Set(event.created_by),
            created_at: Set(now),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    async fn resolve_recipients(
        &self,
        event: &Event,
        roles: &[String],
    ) -> AppResult<Vec<UserModel>> {
        let mut query = User::find().filter(user::Column::IsActive.eq(true));
        if !roles.is_empty() {
            query = query.filter(user::Column::Role.is_in(roles.to_vec()));
        }
        let mut users = query.all(&self.db).await?;

        if !event.event_type.notifies_author() {
            if let Some(author_id) = event.created_by {
                users.retain(|u| u.id != author_id);
            }
        }
        Ok(users)
    }

    /// Each recipient completes or fails independently; one bad address or
    /// preference row never blocks the rest of the broadcast.
    async fn fan_out(&self, notification: &notification::Model, recipients: &[UserModel]) {
        for user in recipients {
            if let Err(e) = self.router.deliver(notification, user).await {
                tracing::error!(
                    notification_id = notification.id,
                    user_id = user.id,
                    error = %e,
                    "delivery failed, continuing with remaining recipients"
                );
            }
        }
    }

    /// A user's visible inbox, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<DeliveryModel>, u64)> {
        let paginator = Delivery::find()
            .filter(delivery::Column::UserId.eq(user_id))
            .filter(delivery::Column::IsVisible.eq(true))
            .order_by_desc(delivery::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    pub async fn unread_count(&self, user_id: i32) -> AppResult<u64> {
        let count = Delivery::find()
            .filter(delivery::Column::UserId.eq(user_id))
            .filter(delivery::Column::IsVisible.eq(true))
            .filter(delivery::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn mark_read(&self, id: i32, user_id: i32) -> AppResult<()> {
        let existing = Delivery::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if existing.is_read {
            return Ok(());
        }

        let mut active: delivery::ActiveModel = existing.into();
        active.is_read = Set(true);
        active.read_at = Set(Some(chrono::Utc::now().naive_utc()));
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: i32) -> AppResult<u64> {
        use sea_orm::sea_query::Expr;
        let now = chrono::Utc::now().naive_utc();
        let result = Delivery::update_many()
            .col_expr(delivery::Column::IsRead, Expr::value(true))
            .col_expr(delivery::Column::ReadAt, Expr::value(now))
            .filter(delivery::Column::UserId.eq(user_id))
            .filter(delivery::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Soft-hide: the row survives for audit, it just leaves the inbox.
    pub async fn hide(&self, id: i32, user_id: i32) -> AppResult<()> {
        let existing = Delivery::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if !existing.is_visible {
            return Ok(());
        }

        let mut active: delivery::ActiveModel = existing.into();
        active.is_visible = Set(false);
        active.hidden_at = Set(Some(chrono::Utc::now().naive_utc()));
        active.update(&self.db).await?;
        Ok(())
    }
}

/// The roles an event addresses. Explicit roles win; "all" or an empty
/// default means every active user.
fn effective_roles(event: &Event) -> Vec<String> {
    let roles: Vec<String> = if event.target_roles.is_empty() {
        event
            .event_type
            .default_target_roles()
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        event.target_roles.clone()
    };

    if roles.iter().any(|r| r == "all") {
        Vec::new()
    } else {
        roles
    }
}
