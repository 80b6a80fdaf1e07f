use crate::db;
use crate::errors::ApiError;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{authorize, ResourceKind};
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Get chat.", skip(pg_pool))]
#[get("/{id}")]
pub async fn item(
    principal: models::Principal,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ApiError> {
    let id = path.0;
    if !authorize(pg_pool.get_ref(), &principal, ResourceKind::Chat, id).await? {
        return Err(ApiError::Forbidden);
    }

    let chat = db::chat::fetch(pg_pool.get_ref(), id).await?;
    Ok(JsonResponse::build().set_id(chat.id).set_item(chat).ok("OK"))
}
