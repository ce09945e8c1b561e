use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Business event kinds the engine accepts. Stored as strings on the
/// notification row; everything else works with the typed enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    OrderCreated,
    OrderUpdated,
    StockMedium,
    StockLow,
    StockOut,
    CustomerRegistered,
    SystemAlert,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OrderCreated => "order_created",
            EventType::OrderUpdated => "order_updated",
            EventType::StockMedium => "stock_medium",
            EventType::StockLow => "stock_low",
            EventType::StockOut => "stock_out",
            EventType::CustomerRegistered => "customer_registered",
            EventType::SystemAlert => "system_alert",
        }
    }

    /// Unknown types are a caller error and are rejected before fan-out.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "order_created" => Ok(EventType::OrderCreated),
            "order_updated" => Ok(EventType::OrderUpdated),
            "stock_medium" => Ok(EventType::StockMedium),
            "stock_low" => Ok(EventType::StockLow),
            "stock_out" => Ok(EventType::StockOut),
            "customer_registered" => Ok(EventType::CustomerRegistered),
            "system_alert" => Ok(EventType::SystemAlert),
            other => Err(AppError::InvalidEvent(format!(
                "unknown event type '{other}'"
            ))),
        }
    }

    /// Payload fields every template for this type may reference and the
    /// engine therefore requires at publish time.
    pub fn required_payload_fields(&self) -> &'static [&'static str] {
        match self {
            EventType::OrderCreated => &["orderId", "customerName", "totalAmount"],
            EventType::OrderUpdated => &["orderId"],
            EventType::StockMedium | EventType::StockLow | EventType::StockOut => {
                &["productName", "currentStock"]
            }
            EventType::CustomerRegistered => &["customerName"],
            EventType::SystemAlert => &["message"],
        }
    }

    /// Whether the event author is also notified when their role matches.
    /// User-authored actions skip the author; system-generated events have
    /// no author to skip.
    pub fn notifies_author(&self) -> bool {
        match self {
            EventType::OrderCreated
            | EventType::OrderUpdated
            | EventType::CustomerRegistered => false,
            EventType::StockMedium
            | EventType::StockLow
            | EventType::StockOut
            | EventType::SystemAlert => true,
        }
    }

    /// Roles addressed when the event names none. Empty means every active
    /// user.
    pub fn default_target_roles(&self) -> &'static [&'static str] {
        match self {
            EventType::SystemAlert => &[],
            _ => &["admin", "manager"],
        }
    }

    pub fn default_priority(&self) -> Priority {
        match self {
            EventType::StockOut => Priority::Critical,
            EventType::StockLow | EventType::SystemAlert => Priority::High,
            EventType::OrderCreated | EventType::StockMedium => Priority::Medium,
            EventType::OrderUpdated | EventType::CustomerRegistered => Priority::Low,
        }
    }

    pub fn is_stock(&self) -> bool {
        matches!(
            self,
            EventType::StockMedium | EventType::StockLow | EventType::StockOut
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

/// Delivery medium. A template key component and a per-user enablement flag,
/// nothing more.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    InApp,
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::InApp => "in_app",
            Channel::Email => "email",
        }
    }
}

/// A business occurrence handed to `NotificationService::publish`. Ephemeral;
/// only the notification row it produces is persisted.
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    pub payload: serde_json::Value,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<i32>,
    /// Empty means the type's default audience.
    pub target_roles: Vec<String>,
    /// None means the type's default priority.
    pub priority: Option<Priority>,
    pub created_by: Option<i32>,
}

impl Event {
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            payload,
            related_entity_type: None,
            related_entity_id: None,
            target_roles: Vec::new(),
            priority: None,
            created_by: None,
        }
    }

    pub fn related(mut self, entity_type: &str, entity_id: i32) -> Self {
        self.related_entity_type = Some(entity_type.to_string());
        self.related_entity_id = Some(entity_id);
        self
    }

    pub fn created_by(mut self, user_id: i32) -> Self {
        self.created_by = Some(user_id);
        self
    }

    pub fn priority(&self) -> Priority {
        self.priority.unwrap_or(self.event_type.default_priority())
    }

    /// Reject caller errors before any row is written: the payload must
    /// carry every field this event type's templates reference.
    pub fn validate(&self) -> AppResult<()> {
        for field in self.event_type.required_payload_fields() {
            if self.payload.get(field).map_or(true, |v| v.is_null()) {
                return Err(AppError::InvalidEvent(format!(
                    "missing payload field '{}' for event type '{}'",
                    field,
                    self.event_type.as_str()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_roundtrip() {
        for t in [
            EventType::OrderCreated,
            EventType::OrderUpdated,
            EventType::StockMedium,
            EventType::StockLow,
            EventType::StockOut,
            EventType::CustomerRegistered,
            EventType::SystemAlert,
        ] {
            assert_eq!(EventType::parse(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(EventType::parse("invoice_exploded").is_err());
    }

    #[test]
    fn test_validate_missing_field() {
        let event = Event::new(EventType::OrderCreated, json!({"orderId": "A-1"}));
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_validate_complete_payload() {
        let event = Event::new(
            EventType::OrderCreated,
            json!({"orderId": "A-1", "customerName": "Iris", "totalAmount": 42.0}),
        );
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_author_policy() {
        assert!(!EventType::OrderCreated.notifies_author());
        assert!(EventType::SystemAlert.notifies_author());
    }
}
