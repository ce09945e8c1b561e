use crate::{
    error::AppResult,
    models::{preference, Preference, UserModel},
    services::event::EventType,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub const DEFAULT_THRESHOLD_LOW: i32 = 5;
pub const DEFAULT_THRESHOLD_MEDIUM: i32 = 10;

/// Validated stock thresholds. Invariant: 0 < low < medium. Invalid stored
/// values are repaired back to the system defaults so a stock write is never
/// blocked by a preference data error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    pub low: i32,
    pub medium: i32,
}

impl Thresholds {
    pub fn new(low: i32, medium: i32) -> Self {
        if low > 0 && low < medium {
            Self { low, medium }
        } else {
            tracing::warn!(low, medium, "malformed stock thresholds, using defaults");
            Self::default()
        }
    }

    fn from_columns(low: Option<i32>, medium: Option<i32>) -> Self {
        match (low, medium) {
            (Some(low), Some(medium)) => Self::new(low, medium),
            (None, None) => Self::default(),
            (low, medium) => {
                tracing::warn!(?low, ?medium, "partial stock thresholds, using defaults");
                Self::default()
            }
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_THRESHOLD_LOW,
            medium: DEFAULT_THRESHOLD_MEDIUM,
        }
    }
}

/// A user's effective settings for one event type, defaults already applied.
#[derive(Clone, Debug)]
pub struct ResolvedPreference {
    pub in_app_enabled: bool,
    pub email_enabled: bool,
    pub language: String,
    pub thresholds: Thresholds,
}

pub struct PreferenceService {
    db: DatabaseConnection,
}

impl PreferenceService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolve the effective preference for (user, event type). A missing row
    /// means system defaults: both channels on, account language, default
    /// thresholds.
    pub async fn resolve(
        &self,
        user: &UserModel,
        event_type: EventType,
    ) -> AppResult<ResolvedPreference> {
        let row = Preference::find()
            .filter(preference::Column::UserId.eq(user.id))
            .filter(preference::Column::NotificationType.eq(event_type.as_str()))
            .one(&self.db)
            .await?;

        Ok(match row {
            Some(p) => ResolvedPreference {
                in_app_enabled: p.in_app_enabled,
                email_enabled: p.email_enabled,
                language: p.language.unwrap_or_else(|| user.language.clone()),
                // Threshold columns only mean anything on the stock types;
                // stray values on other rows are ignored, not warned about.
                thresholds: if event_type.is_stock() {
                    Thresholds::from_columns(p.threshold_low, p.threshold_medium)
                } else {
                    Thresholds::default()
                },
            },
            None => ResolvedPreference {
                in_app_enabled: true,
                email_enabled: true,
                language: user.language.clone(),
                thresholds: Thresholds::default(),
            },
        })
    }

    /// Thresholds used when evaluating a stock transition for this user.
    /// The `stock_low` row is the canonical holder of the threshold pair;
    /// the severity-specific rows only toggle channels.
    pub async fn stock_thresholds(&self, user: &UserModel) -> AppResult<Thresholds> {
        let prefs = self.resolve(user, EventType::StockLow).await?;
        Ok(prefs.thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn staff(id: i32, language: &str) -> UserModel {
        UserModel {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            role: "manager".to_string(),
            language: language.to_string(),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn pref_row(
        notification_type: &str,
        low: Option<i32>,
        medium: Option<i32>,
    ) -> preference::Model {
        let now = chrono::Utc::now().naive_utc();
        preference::Model {
            id: 1,
            user_id: 1,
            notification_type: notification_type.to_string(),
            in_app_enabled: true,
            email_enabled: false,
            language: Some("de".to_string()),
            threshold_low: low,
            threshold_medium: medium,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_resolve_parses_stock_thresholds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pref_row("stock_low", Some(2), Some(6))]])
            .into_connection();
        let svc = PreferenceService::new(db);

        let prefs = svc
            .resolve(&staff(1, "en"), EventType::StockLow)
            .await
            .unwrap();
        assert_eq!(prefs.thresholds, Thresholds { low: 2, medium: 6 });
        assert_eq!(prefs.language, "de");
        assert!(!prefs.email_enabled);
    }

    #[tokio::test]
    async fn test_non_stock_rows_ignore_threshold_columns() {
        // An order preference carrying (inverted) threshold values must not
        // trip the repair path; thresholds stay at defaults.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pref_row("order_created", Some(9), Some(3))]])
            .into_connection();
        let svc = PreferenceService::new(db);

        let prefs = svc
            .resolve(&staff(1, "en"), EventType::OrderCreated)
            .await
            .unwrap();
        assert_eq!(prefs.thresholds, Thresholds::default());
    }

    #[tokio::test]
    async fn test_missing_row_means_system_defaults() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<preference::Model>::new()])
            .into_connection();
        let svc = PreferenceService::new(db);

        let prefs = svc
            .resolve(&staff(3, "fr"), EventType::StockOut)
            .await
            .unwrap();
        assert!(prefs.in_app_enabled);
        assert!(prefs.email_enabled);
        assert_eq!(prefs.language, "fr");
        assert_eq!(prefs.thresholds, Thresholds::default());
    }

    #[test]
    fn test_valid_thresholds_kept() {
        let t = Thresholds::new(3, 8);
        assert_eq!(t, Thresholds { low: 3, medium: 8 });
    }

    #[test]
    fn test_inverted_thresholds_repaired() {
        assert_eq!(Thresholds::new(10, 5), Thresholds::default());
        assert_eq!(Thresholds::new(5, 5), Thresholds::default());
    }

    #[test]
    fn test_non_positive_thresholds_repaired() {
        assert_eq!(Thresholds::new(0, 10), Thresholds::default());
        assert_eq!(Thresholds::new(-4, 10), Thresholds::default());
    }

    #[test]
    fn test_partial_columns_fall_back() {
        assert_eq!(Thresholds::from_columns(Some(3), None), Thresholds::default());
        assert_eq!(Thresholds::from_columns(None, None), Thresholds::default());
        assert_eq!(
            Thresholds::from_columns(Some(3), Some(8)),
            Thresholds { low: 3, medium: 8 }
        );
    }
}
