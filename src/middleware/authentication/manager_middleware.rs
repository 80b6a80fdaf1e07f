use crate::middleware::authentication::method;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse},
    Error,
};
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;

pub struct ManagerMiddleware<S> {
    pub service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ManagerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        async move {
            if !method::try_jwt(&mut req) {
                tracing::debug!("anonymous request to {}", req.path());
            }
            service.call(req).await
        }
        .boxed_local()
    }
}
