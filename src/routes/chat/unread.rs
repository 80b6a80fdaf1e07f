use crate::db;
use crate::errors::ApiError;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{authorize, ResourceKind};
use actix_web::{get, post, web, Responder, Result};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Serialize)]
pub struct UnreadView {
    pub unread: bool,
}

async fn guard(pool: &PgPool, principal: &models::Principal, id: i32) -> Result<(), ApiError> {
    match authorize(pool, principal, ResourceKind::Chat, id).await? {
        true => Ok(()),
        false => Err(ApiError::Forbidden),
    }
}

#[tracing::instrument(name = "Get chat unread flag.", skip(pg_pool))]
#[get("/{id}/unread")]
pub async fn item(
    principal: models::Principal,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ApiError> {
    let id = path.0;
    guard(pg_pool.get_ref(), &principal, id).await?;

    let unread = db::chat::is_unread(pg_pool.get_ref(), id).await?;
    Ok(JsonResponse::build()
        .set_id(id)
        .set_item(UnreadView { unread })
        .ok("OK"))
}

#[tracing::instrument(name = "Mark chat as read.", skip(pg_pool))]
#[post("/{id}/mark-as-read")]
pub async fn mark_as_read(
    principal: models::Principal,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ApiError> {
    let id = path.0;
    guard(pg_pool.get_ref(), &principal, id).await?;

    db::chat::mark_as_read(pg_pool.get_ref(), id).await?;
    Ok(JsonResponse::build()
        .set_id(id)
        .set_item(UnreadView { unread: false })
        .ok("Chat marked as read"))
}
