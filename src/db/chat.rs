//! Append-only chat log store.
//!
//! A chat's messages live in one JSONB array. Every write goes through a single
//! statement so concurrent appends to the same chat are serialized by the row lock.

use crate::db::{Page, StoreError};
use crate::models;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::Instrument;

const CHAT_COLUMNS: &str = "id, created_at, account_id, messages, unread_messages";

#[derive(Debug, sqlx::FromRow)]
struct ChatRecord {
    id: i32,
    created_at: DateTime<Utc>,
    account_id: i32,
    messages: Option<Value>,
    unread_messages: Option<bool>,
}

impl TryFrom<ChatRecord> for models::Chat {
    type Error = StoreError;

    fn try_from(record: ChatRecord) -> Result<Self, Self::Error> {
        let messages =
            models::parse_messages(record.messages).map_err(|source| StoreError::Corrupt {
                chat_id: record.id,
                source,
            })?;

        Ok(models::Chat {
            id: record.id,
            created_at: record.created_at,
            account_id: record.account_id,
            messages,
            unread: record.unread_messages.unwrap_or(false),
        })
    }
}

pub async fn create(pool: &PgPool, account_id: i32) -> Result<models::Chat, StoreError> {
    let query_span = tracing::info_span!("Saving new chat into the database");
    let record = sqlx::query_as::<_, ChatRecord>(&format!(
        r#"
        INSERT INTO chats (messages, account_id)
        VALUES ('[]'::jsonb, $1)
        RETURNING {CHAT_COLUMNS}
        "#
    ))
    .bind(account_id)
    .fetch_one(pool)
    .instrument(query_span)
    .await?;

    record.try_into()
}

pub async fn fetch(pool: &PgPool, id: i32) -> Result<models::Chat, StoreError> {
    let query_span = tracing::info_span!("Fetch chat by id.");
    sqlx::query_as::<_, ChatRecord>(&format!(
        r#"
        SELECT {CHAT_COLUMNS}
        FROM chats
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await?
    .ok_or(StoreError::NotFound(id))
    .and_then(models::Chat::try_from)
}

pub async fn read_log(pool: &PgPool, id: i32) -> Result<Vec<models::Message>, StoreError> {
    fetch(pool, id).await.map(|chat| chat.messages)
}

/// Appends one message and returns the chat with its full updated log.
///
/// The message id (`msg<N>`) comes from the per-chat counter and the timestamp from the
/// database clock, both evaluated while the row is locked, so ids are unique and
/// timestamps non-decreasing in append order.
///
/// A stored log that is not an array of messages is left untouched and reported as
/// [`StoreError::Corrupt`].
pub async fn append_message(
    pool: &PgPool,
    id: i32,
    sender: models::Sender,
    text: &str,
) -> Result<models::Chat, StoreError> {
    let query_span = tracing::info_span!("Appending message to chat", chat_id = id, %sender);
    let mut tx = pool.begin().await?;

    let record = sqlx::query_as::<_, ChatRecord>(&format!(
        r#"
        UPDATE chats
        SET messages = COALESCE(NULLIF(messages, 'null'::jsonb), '[]'::jsonb)
                || jsonb_build_array(jsonb_build_object(
                    'id', 'msg' || next_message_seq::text,
                    'timestamp', clock_timestamp(),
                    'sender', $2::text,
                    'text', $3::text
                )),
            next_message_seq = next_message_seq + 1
        WHERE id = $1
          AND jsonb_typeof(COALESCE(NULLIF(messages, 'null'::jsonb), '[]'::jsonb)) = 'array'
        RETURNING {CHAT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(sender.as_str())
    .bind(text)
    .fetch_optional(&mut *tx)
    .instrument(query_span)
    .await?;

    let chat = match record {
        Some(record) => models::Chat::try_from(record)?,
        None => {
            tx.rollback().await?;
            // no row is either a missing chat or a non-array log; fetch tells them apart
            return fetch(pool, id)
                .await
                .and_then(|_| Err(StoreError::NotFound(id)));
        }
    };
    // an array holding malformed entries fails the conversion above and rolls back on drop
    tx.commit().await?;

    Ok(chat)
}

pub async fn fetch_by_account(
    pool: &PgPool,
    account_id: i32,
    page: Page,
) -> Result<Vec<models::Chat>, StoreError> {
    let query_span = tracing::info_span!("Fetch chats by account id.");
    sqlx::query_as::<_, ChatRecord>(&format!(
        r#"
        SELECT {CHAT_COLUMNS}
        FROM chats
        WHERE account_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(account_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .instrument(query_span)
    .await?
    .into_iter()
    .map(models::Chat::try_from)
    .collect()
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<(), StoreError> {
    let query_span = tracing::info_span!("Deleting chat from the database");
    let result = sqlx::query(r#"DELETE FROM chats WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await?;

    match result.rows_affected() {
        0 => Err(StoreError::NotFound(id)),
        _ => Ok(()),
    }
}

pub async fn is_unread(pool: &PgPool, id: i32) -> Result<bool, StoreError> {
    sqlx::query_scalar::<_, Option<bool>>(r#"SELECT unread_messages FROM chats WHERE id = $1"#)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(|unread| unread.unwrap_or(false))
        .ok_or(StoreError::NotFound(id))
}

pub async fn mark_as_read(pool: &PgPool, id: i32) -> Result<(), StoreError> {
    set_unread(pool, id, false).await
}

pub async fn mark_as_unread(pool: &PgPool, id: i32) -> Result<(), StoreError> {
    set_unread(pool, id, true).await
}

async fn set_unread(pool: &PgPool, id: i32, unread: bool) -> Result<(), StoreError> {
    let result = sqlx::query(r#"UPDATE chats SET unread_messages = $2 WHERE id = $1"#)
        .bind(id)
        .bind(unread)
        .execute(pool)
        .await?;

    match result.rows_affected() {
        0 => Err(StoreError::NotFound(id)),
        _ => Ok(()),
    }
}

pub async fn account_owns(pool: &PgPool, account_id: i32, id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS(SELECT 1 FROM chats WHERE account_id = $1 AND id = $2)"#,
    )
    .bind(account_id)
    .bind(id)
    .fetch_one(pool)
    .await
}
