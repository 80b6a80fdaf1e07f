use crate::db;
use crate::errors::ApiError;
use crate::forms;
use crate::helpers::{password, JsonResponse};
use crate::models;
use actix_web::{post, web, web::Bytes, HttpResponse, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Sign up.", skip(body, pg_pool))]
#[post("")]
pub async fn add(body: Bytes, pg_pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let form: forms::SignupForm = forms::from_json_body(&body)?;

    let plain = form.password;
    let password_hash = web::block(move || password::hash_password(&plain))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;

    let account = models::Account::new(form.username, form.email, password_hash);
    db::account::insert(pg_pool.get_ref(), account)
        .await
        .map(|account| {
            JsonResponse::build()
                .set_id(account.id)
                .set_item(account)
                .created("Account created")
        })
        .map_err(|err| match db::account::is_duplicate_username(&err) {
            true => ApiError::bad_request("Username is already taken"),
            false => err.into(),
        })
}
