use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Document {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub text: Option<String>,
    pub file_path: Option<String>,
    // reserved for the indexing worker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub account_id: i32,
}

impl Document {
    pub fn new(
        account_id: i32,
        name: String,
        text: Option<String>,
        file_path: Option<String>,
    ) -> Self {
        Self {
            id: 0,
            created_at: Utc::now(),
            name,
            text,
            file_path,
            embedding: None,
            account_id,
        }
    }
}
