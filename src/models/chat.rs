use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
    System,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
            Sender::System => "system",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a chat log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chat {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub account_id: i32,
    pub messages: Vec<Message>,
    pub unread: bool,
}

/// Decodes the stored JSONB log. A missing payload is an empty log, anything that
/// is not an array of messages is corruption.
pub fn parse_messages(stored: Option<Value>) -> Result<Vec<Message>, serde_json::Error> {
    match stored {
        None | Some(Value::Null) => Ok(vec![]),
        Some(value) => serde_json::from_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sender_rejects_unknown_roles() {
        assert_eq!(
            serde_json::from_value::<Sender>(json!("assistant")).unwrap(),
            Sender::Assistant
        );
        assert!(serde_json::from_value::<Sender>(json!("moderator")).is_err());
        assert!(serde_json::from_value::<Sender>(json!("User")).is_err());
    }

    #[test]
    fn missing_log_is_empty() {
        assert!(parse_messages(None).unwrap().is_empty());
        assert!(parse_messages(Some(Value::Null)).unwrap().is_empty());
        assert!(parse_messages(Some(json!([]))).unwrap().is_empty());
    }

    #[test]
    fn stored_log_keeps_order() {
        let stored = json!([
            {"id": "msg0", "timestamp": "2024-03-01T10:00:00.000001+00:00", "sender": "user", "text": "hi"},
            {"id": "msg1", "timestamp": "2024-03-01T10:00:02Z", "sender": "assistant", "text": "hello"}
        ]);
        let messages = parse_messages(Some(stored)).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "msg0");
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert!(messages[0].timestamp < messages[1].timestamp);
    }

    #[test]
    fn malformed_log_is_an_error() {
        assert!(parse_messages(Some(json!({"id": "msg0"}))).is_err());
        assert!(parse_messages(Some(json!([{"id": "msg0", "sender": "bot"}]))).is_err());
    }

    #[test]
    fn message_serializes_rfc3339_timestamp() {
        let message = Message {
            id: "msg0".to_string(),
            timestamp: "2024-03-01T10:00:00Z".parse().unwrap(),
            sender: Sender::User,
            text: "hi".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["timestamp"], "2024-03-01T10:00:00Z");
        assert_eq!(json["sender"], "user");
    }
}
