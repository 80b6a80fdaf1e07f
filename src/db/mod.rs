pub mod account;
pub mod chat;
pub mod document;

/// Failures of the chat log store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("chat {0} not found")]
    NotFound(i32),
    #[error("stored message log of chat {chat_id} is corrupt: {source}")]
    Corrupt {
        chat_id: i32,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Offset/limit window used by the listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            offset: offset.unwrap_or(0).max(0),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(None, None)
    }
}
