use crate::{
    error::{AppError, AppResult},
    models::{product, user, Product, ProductModel, User, UserModel},
    services::{
        event::{Event, EventType},
        notification::NotificationService,
        preference::{PreferenceService, Thresholds},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use serde_json::json;
use std::collections::BTreeMap;

/// Stock severity band. Ordering is by badness: `None < Medium < Low < Out`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    None,
    Medium,
    Low,
    Out,
}

impl Severity {
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            Severity::None => None,
            Severity::Medium => Some(EventType::StockMedium),
            Severity::Low => Some(EventType::StockLow),
            Severity::Out => Some(EventType::StockOut),
        }
    }
}

/// The band a quantity falls into under the given thresholds.
pub fn bucket(qty: i32, thresholds: &Thresholds) -> Severity {
    if qty <= 0 {
        Severity::Out
    } else if qty <= thresholds.low {
        Severity::Low
    } else if qty <= thresholds.medium {
        Severity::Medium
    } else {
        Severity::None
    }
}

/// Decide whether a stock transition warrants an alert for one user.
///
/// The last-notified band is derived from the previous quantity; that is
/// sound because transitions are committed atomically per product and are
/// therefore totally ordered. An alert fires only when the new band is
/// strictly worse than the previous one, which both suppresses oscillation
/// inside a band and re-arms automatically after a recovery.
pub fn evaluate(previous_qty: i32, new_qty: i32, thresholds: &Thresholds) -> (Severity, bool) {
    let previous = bucket(previous_qty, thresholds);
    let current = bucket(new_qty, thresholds);
    (current, current != Severity::None && current > previous)
}

/// One committed stock transition, observed under the product row lock.
#[derive(Clone, Debug)]
pub struct StockTransition {
    pub product: ProductModel,
    pub previous_qty: i32,
    pub new_qty: i32,
}

/// Applies stock mutations and turns the resulting transitions into per-user
/// stock alerts. The mutation is the only critical section; evaluation per
/// user runs after the lock is released.
pub struct StockAlertService {
    db: DatabaseConnection,
    notifications: NotificationService,
    preferences: PreferenceService,
}

impl StockAlertService {
    pub fn new(
        db: DatabaseConnection,
        notifications: NotificationService,
        preferences: PreferenceService,
    ) -> Self {
        Self {
            db,
            notifications,
            preferences,
        }
    }

    /// Apply a stock write and alert affected users. The write itself is the
    /// caller's source-of-truth mutation and its errors propagate; alerting
    /// is best-effort and never fails the stock change.
    pub async fn record_stock_change(&self, product_id: i32, new_qty: i32) -> AppResult<()> {
        let transition = self.update_stock(product_id, new_qty).await?;
        if let Err(e) = self.alert(&transition).await {
            tracing::warn!(
                product_id,
                error = %e,
                "stock alert fan-out failed, stock change is committed"
            );
        }
        Ok(())
    }

    /// Read previous quantity, write the new one, commit — as one atomic
    /// unit under a row-level exclusive lock, so concurrent writers observe
    /// bucket transitions in a total order per product.
    pub async fn update_stock(&self, product_id: i32, new_qty: i32) -> AppResult<StockTransition> {
        let txn = self.db.begin().await?;

        let found = Product::find_by_id(product_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
        let previous_qty = found.stock_quantity;

        let mut active: product::ActiveModel = found.into();
        active.stock_quantity = Set(new_qty);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        Ok(StockTransition {
            product: updated,
            previous_qty,
            new_qty,
        })
    }

    /// Evaluate the transition against each staff user's own thresholds and
    /// publish one targeted event per severity group. The same write can put
    /// different users into different bands, or into none at all.
    async fn alert(&self, transition: &StockTransition) -> AppResult<()> {
        let audience = self.stock_audience().await?;
        let mut groups: BTreeMap<Severity, Vec<i32>> = BTreeMap::new();

        for user in &audience {
            let thresholds = match self.preferences.stock_thresholds(user).await {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(
                        user_id = user.id,
                        error = %e,
                        "failed to load thresholds, using defaults"
                    );
                    Thresholds::default()
                }
            };

            let (severity, should_notify) =
                evaluate(transition.previous_qty, transition.new_qty, &thresholds);
            if should_notify {
                groups.entry(severity).or_default().push(user.id);
            }
        }

        for (severity, user_ids) in groups {
            let Some(event_type) = severity.event_type() else {
                continue;
            };
            let event = Event::new(
                event_type,
                json!({
                    "productName": transition.product.name,
                    "sku": transition.product.sku,
                    "category": transition.product.category,
                    "currentStock": transition.new_qty,
                    "previousStock": transition.previous_qty,
                }),
            )
            .related("product", transition.product.id);

            if let Err(e) = self.notifications.publish_to_users(event, &user_ids).await {
                tracing::error!(
                    product_id = transition.product.id,
                    severity = ?severity,
                    error = %e,
                    "failed to publish stock alert group"
                );
            }
        }
        Ok(())
    }

    async fn stock_audience(&self) -> AppResult<Vec<UserModel>> {
        let roles: Vec<String> = EventType::StockLow
            .default_target_roles()
            .iter()
            .map(|s| s.to_string())
            .collect();
        Ok(User::find()
            .filter(user::Column::IsActive.eq(true))
            .filter(user::Column::Role.is_in(roles))
            .all(&self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(low: i32, medium: i32) -> Thresholds {
        Thresholds::new(low, medium)
    }

    #[test]
    fn test_bucket_boundaries() {
        let th = t(5, 10);
        assert_eq!(bucket(0, &th), Severity::Out);
        assert_eq!(bucket(1, &th), Severity::Low);
        assert_eq!(bucket(5, &th), Severity::Low);
        assert_eq!(bucket(6, &th), Severity::Medium);
        assert_eq!(bucket(10, &th), Severity::Medium);
        assert_eq!(bucket(11, &th), Severity::None);
    }

    #[test]
    fn test_negative_quantity_is_out() {
        assert_eq!(bucket(-3, &t(5, 10)), Severity::Out);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::None < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
        assert!(Severity::Low < Severity::Out);
    }

    #[test]
    fn test_descent_notifies_each_new_band() {
        let th = t(5, 10);
        assert_eq!(evaluate(20, 8, &th), (Severity::Medium, true));
        assert_eq!(evaluate(8, 4, &th), (Severity::Low, true));
        assert_eq!(evaluate(4, 0, &th), (Severity::Out, true));
    }

    #[test]
    fn test_same_band_is_suppressed() {
        let th = t(5, 10);
        // 7 is still in the medium band, only the final drop to zero fires.
        assert_eq!(evaluate(8, 7, &th), (Severity::Medium, false));
        assert_eq!(evaluate(7, 0, &th), (Severity::Out, true));
    }

    #[test]
    fn test_oscillation_does_not_spam() {
        let th = t(5, 10);
        assert_eq!(evaluate(6, 7, &th), (Severity::Medium, false));
        assert_eq!(evaluate(7, 6, &th), (Severity::Medium, false));
    }

    #[test]
    fn test_recovery_rearms() {
        let th = t(5, 10);
        assert_eq!(evaluate(4, 50, &th), (Severity::None, false));
        assert_eq!(evaluate(50, 3, &th), (Severity::Low, true));
    }

    #[test]
    fn test_improvement_within_alert_bands_is_silent() {
        let th = t(5, 10);
        // out -> low is better, not worse; no alert.
        assert_eq!(evaluate(0, 3, &th), (Severity::Low, false));
    }
}
