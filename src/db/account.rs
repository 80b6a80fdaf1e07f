use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn insert(pool: &PgPool, account: models::Account) -> Result<models::Account, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new account into the database");
    sqlx::query_as::<_, models::Account>(
        r#"
        INSERT INTO accounts (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, created_at, username, email, password_hash
        "#,
    )
    .bind(&account.username)
    .bind(&account.email)
    .bind(&account.password_hash)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        if !is_duplicate_username(&err) {
            tracing::error!("Failed to insert account: {:?}", err);
        }
        err
    })
}

pub async fn fetch_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<models::Account>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch account by username.");
    sqlx::query_as::<_, models::Account>(
        r#"
        SELECT id, created_at, username, email, password_hash
        FROM accounts
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
}

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::Account>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch account by id.");
    sqlx::query_as::<_, models::Account>(
        r#"
        SELECT id, created_at, username, email, password_hash
        FROM accounts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
}

/// True when the error is the unique constraint on `accounts.username`.
pub fn is_duplicate_username(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
