use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Account {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: 0,
            created_at: Utc::now(),
            username,
            email,
            password_hash,
        }
    }
}
