use crate::models::Message;
use serde::Serialize;

/// Destination of an ingestion event. Each one maps to its own durable
/// exchange and the queue bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventChannel {
    DocumentIndexing,
    ChatAssistant,
}

impl EventChannel {
    pub const ALL: [EventChannel; 2] = [EventChannel::DocumentIndexing, EventChannel::ChatAssistant];

    pub fn exchange(&self) -> &'static str {
        match self {
            EventChannel::DocumentIndexing => "document-indexing-exchange",
            EventChannel::ChatAssistant => "ai-assistant-exchange",
        }
    }

    pub fn queue(&self) -> &'static str {
        match self {
            EventChannel::DocumentIndexing => "document-indexing-queue",
            EventChannel::ChatAssistant => "ai-assistant-queue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentIndexingEvent {
    pub document_id: i32,
    pub document_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatAssistantEvent {
    pub chat_id: i32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestionEvent {
    DocumentIndexing(DocumentIndexingEvent),
    ChatAssistant(ChatAssistantEvent),
}

impl IngestionEvent {
    pub fn channel(&self) -> EventChannel {
        match self {
            IngestionEvent::DocumentIndexing(_) => EventChannel::DocumentIndexing,
            IngestionEvent::ChatAssistant(_) => EventChannel::ChatAssistant,
        }
    }

    /// Wire body read by the downstream workers.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            IngestionEvent::DocumentIndexing(event) => serde_json::to_vec(event),
            IngestionEvent::ChatAssistant(event) => serde_json::to_vec(event),
        }
    }
}

impl From<DocumentIndexingEvent> for IngestionEvent {
    fn from(event: DocumentIndexingEvent) -> Self {
        IngestionEvent::DocumentIndexing(event)
    }
}

impl From<ChatAssistantEvent> for IngestionEvent {
    fn from(event: ChatAssistantEvent) -> Self {
        IngestionEvent::ChatAssistant(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;
    use serde_json::{json, Value};

    #[test]
    fn document_indexing_payload_shape() {
        let event = IngestionEvent::from(DocumentIndexingEvent {
            document_id: 7,
            document_text: "hello world".to_string(),
        });
        let payload: Value = serde_json::from_slice(&event.to_payload().unwrap()).unwrap();

        assert_eq!(event.channel(), EventChannel::DocumentIndexing);
        assert_eq!(payload, json!({"document_id": 7, "document_text": "hello world"}));
    }

    #[test]
    fn chat_assistant_payload_shape() {
        let event = IngestionEvent::from(ChatAssistantEvent {
            chat_id: 3,
            messages: vec![Message {
                id: "msg0".to_string(),
                timestamp: "2024-03-01T10:00:00Z".parse().unwrap(),
                sender: Sender::User,
                text: "hi".to_string(),
            }],
        });
        let payload: Value = serde_json::from_slice(&event.to_payload().unwrap()).unwrap();

        assert_eq!(event.channel(), EventChannel::ChatAssistant);
        assert_eq!(
            payload,
            json!({
                "chat_id": 3,
                "messages": [
                    {"id": "msg0", "timestamp": "2024-03-01T10:00:00Z", "sender": "user", "text": "hi"}
                ]
            })
        );
    }

    #[test]
    fn channels_do_not_share_exchanges() {
        assert_ne!(
            EventChannel::DocumentIndexing.exchange(),
            EventChannel::ChatAssistant.exchange()
        );
        assert_ne!(
            EventChannel::DocumentIndexing.queue(),
            EventChannel::ChatAssistant.queue()
        );
    }
}
