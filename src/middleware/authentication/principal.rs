use crate::errors::ApiError;
use crate::models::Principal;
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::sync::Arc;

/// Handlers taking a `Principal` answer 401 unless the request was authenticated.
impl FromRequest for Principal {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Arc<Principal>>()
                .map(|principal| principal.as_ref().clone())
                .ok_or(ApiError::Unauthorized),
        )
    }
}
