use crate::configuration::Settings;
use crate::db;
use crate::errors::ApiError;
use crate::forms;
use crate::helpers::{jwt, password, JsonResponse};
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;

/// Unknown usernames and wrong passwords get the same 401.
#[tracing::instrument(name = "Log in.", skip(form, pg_pool, settings), fields(username = %form.username))]
#[post("/login")]
pub async fn login(
    form: web::Form<forms::LoginForm>,
    pg_pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<impl Responder, ApiError> {
    let form = form.into_inner();
    // Postgres rejects NUL in text parameters, no account can carry one
    let account = match form.username.contains('\0') {
        true => None,
        false => db::account::fetch_by_username(pg_pool.get_ref(), &form.username).await?,
    };
    let Some(account) = account else {
        web::block(move || password::verify_placeholder(&form.password))
            .await
            .map_err(ApiError::internal)?;
        return Err(ApiError::Unauthorized);
    };

    let stored_hash = account.password_hash.clone();
    let verified = web::block(move || password::verify_password(&form.password, &stored_hash))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;
    if !verified {
        tracing::info!("wrong password for account {}", account.id);
        return Err(ApiError::Unauthorized);
    }

    let claims = jwt::Claims::new(account.id, account.username, settings.auth.token_ttl_hours);
    let token = jwt::issue_token(&claims, settings.auth.secret.as_bytes())
        .map_err(ApiError::internal)?;

    Ok(JsonResponse::build()
        .set_id(account.id)
        .set_item(forms::TokenView { token })
        .ok("Logged in"))
}
