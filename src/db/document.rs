use crate::db::Page;
use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn insert(
    pool: &PgPool,
    document: models::Document,
) -> Result<models::Document, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new document into the database");
    sqlx::query_as::<_, models::Document>(
        r#"
        INSERT INTO documents (name, text, file_path, embedding, account_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, created_at, name, text, file_path, embedding, account_id
        "#,
    )
    .bind(&document.name)
    .bind(&document.text)
    .bind(&document.file_path)
    .bind(&document.embedding)
    .bind(document.account_id)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::Document>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch document by id.");
    sqlx::query_as::<_, models::Document>(
        r#"
        SELECT id, created_at, name, text, file_path, embedding, account_id
        FROM documents
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
}

pub async fn fetch_by_account(
    pool: &PgPool,
    account_id: i32,
    page: Page,
) -> Result<Vec<models::Document>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch documents by account id.");
    sqlx::query_as::<_, models::Document>(
        r#"
        SELECT id, created_at, name, text, file_path, embedding, account_id
        FROM documents
        WHERE account_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(account_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let query_span = tracing::info_span!("Deleting document from the database");
    sqlx::query(r#"DELETE FROM documents WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
}

pub async fn account_owns(pool: &PgPool, account_id: i32, id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS(SELECT 1 FROM documents WHERE account_id = $1 AND id = $2)"#,
    )
    .bind(account_id)
    .bind(id)
    .fetch_one(pool)
    .await
}
