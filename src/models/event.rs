use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain an activity event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Like,
    Friend,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Like => "LIKE",
            EventType::Friend => "FRIEND",
            EventType::Review => "REVIEW",
        }
    }
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "ADD",
            Operation::Remove => "REMOVE",
            Operation::Update => "UPDATE",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIKE" => Ok(EventType::Like),
            "FRIEND" => Ok(EventType::Friend),
            "REVIEW" => Ok(EventType::Review),
            other => Err(format!("Unknown event type {}", other)),
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Operation::Add),
            "REMOVE" => Ok(Operation::Remove),
            "UPDATE" => Ok(Operation::Update),
            other => Err(format!("Unknown operation {}", other)),
        }
    }
}

/// An immutable entry of the activity log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "eventId")]
    pub id: i64,
    /// Acting user
    pub user_id: i64,
    /// Subject of the action (film, friend or review id)
    pub entity_id: i64,
    pub event_type: EventType,
    pub operation: Operation,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// An event waiting for the store to assign its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub user_id: i64,
    pub entity_id: i64,
    pub event_type: EventType,
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
}

impl NewEvent {
    /// Creates an event stamped with the current time
    pub fn now(user_id: i64, entity_id: i64, event_type: EventType, operation: Operation) -> Self {
        Self {
            user_id,
            entity_id,
            event_type,
            operation,
            timestamp: Utc::now(),
        }
    }

    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            user_id: self.user_id,
            entity_id: self.entity_id,
            event_type: self.event_type,
            operation: self.operation,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_serializes_timestamp_as_millis() {
        let event = Event {
            id: 1,
            user_id: 2,
            entity_id: 3,
            event_type: EventType::Like,
            operation: Operation::Add,
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["timestamp"], 1_700_000_000_123i64);
        assert_eq!(json["eventId"], 1);
        assert_eq!(json["userId"], 2);
        assert_eq!(json["eventType"], "LIKE");
        assert_eq!(json["operation"], "ADD");
    }

    #[test]
    fn test_string_forms_parse_back() {
        for event_type in [EventType::Like, EventType::Friend, EventType::Review] {
            assert_eq!(event_type.as_str().parse::<EventType>(), Ok(event_type));
        }
        for operation in [Operation::Add, Operation::Remove, Operation::Update] {
            assert_eq!(operation.as_str().parse::<Operation>(), Ok(operation));
        }
        assert!("POKE".parse::<EventType>().is_err());
    }
}
