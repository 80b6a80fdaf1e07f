use crate::middleware::authentication::*;

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};

/// Resolves the request principal. Never rejects on its own: handlers that need a
/// principal ask for one and get 401 when none was resolved.
#[derive(Default)]
pub struct Manager {}

impl Manager {
    pub fn new() -> Self {
        Self {}
    }
}

impl<S, B> Transform<S, ServiceRequest> for Manager
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ManagerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ManagerMiddleware {
            service: Rc::new(service),
        }))
    }
}
