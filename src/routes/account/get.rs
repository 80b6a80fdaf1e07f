use crate::db;
use crate::errors::ApiError;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Get account.", skip(pg_pool))]
#[get("")]
pub async fn item(
    principal: models::Principal,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ApiError> {
    // a valid token for a vanished account is still a failed authentication
    db::account::fetch(pg_pool.get_ref(), principal.account_id)
        .await?
        .ok_or(ApiError::Unauthorized)
        .map(|account| JsonResponse::build().set_item(account).ok("OK"))
}

#[tracing::instrument(name = "List account documents.", skip(pg_pool))]
#[get("/documents")]
pub async fn documents(
    principal: models::Principal,
    query: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ApiError> {
    let page = query.into_inner().into();
    db::document::fetch_by_account(pg_pool.get_ref(), principal.account_id, page)
        .await
        .map(|documents| JsonResponse::build().set_list(documents).ok("OK"))
        .map_err(ApiError::from)
}

#[tracing::instrument(name = "List account chats.", skip(pg_pool))]
#[get("/chats")]
pub async fn chats(
    principal: models::Principal,
    query: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder, ApiError> {
    let page = query.into_inner().into();
    db::chat::fetch_by_account(pg_pool.get_ref(), principal.account_id, page)
        .await
        .map(|chats| JsonResponse::build().set_list(chats).ok("OK"))
        .map_err(ApiError::from)
}
