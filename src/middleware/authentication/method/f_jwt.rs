use crate::configuration::Settings;
use crate::helpers::jwt::{extract_bearer_token, verify_token};
use crate::middleware::authentication::get_header;
use crate::models::Principal;
use actix_web::dev::ServiceRequest;
use actix_web::{web, HttpMessage};
use std::sync::Arc;

/// Stores the principal in the request extensions when a valid bearer token is present.
#[tracing::instrument(name = "Authenticate with JWT", skip(req))]
pub fn try_jwt(req: &mut ServiceRequest) -> bool {
    let authorization = match get_header::<String>(req, "authorization") {
        Ok(Some(authorization)) => authorization,
        Ok(None) => return false,
        Err(err) => {
            tracing::debug!("{}", err);
            return false;
        }
    };

    let token = match extract_bearer_token(&authorization) {
        Ok(token) => token,
        Err(err) => {
            tracing::debug!("{}", err);
            return false;
        }
    };

    let settings = match req.app_data::<web::Data<Settings>>() {
        Some(settings) => settings,
        None => {
            tracing::error!("settings are not registered as app data");
            return false;
        }
    };

    let now = chrono::Utc::now().timestamp();
    let claims = match verify_token(token, settings.auth.secret.as_bytes(), now) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::info!("bearer token rejected: {}", err);
            return false;
        }
    };

    let principal = Principal::from(claims);
    tracing::debug!("authenticated account {}", principal.account_id);
    req.extensions_mut().insert(Arc::new(principal));
    true
}
