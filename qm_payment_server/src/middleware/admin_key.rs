//! Admin key middleware for Actix Web.
//!
//! Routes under `/admin` are protected by a shared API key, sent in the `x-qmp-admin-key` header.
//! When no key is configured the routes refuse all requests rather than falling open.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorInternalServerError},
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use qm_common::Secret;

pub struct AdminKeyMiddlewareFactory {
    key_header: String,
    key: Secret<String>,
}

impl AdminKeyMiddlewareFactory {
    pub fn new(key_header: &str, key: Secret<String>) -> Self {
        AdminKeyMiddlewareFactory { key_header: key_header.into(), key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AdminKeyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminKeyMiddlewareService {
            key_header: self.key_header.clone(),
            key: self.key.clone(),
            service: Rc::new(service),
        }))
    }
}

pub struct AdminKeyMiddlewareService<S> {
    key_header: String,
    key: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let key = self.key.reveal().clone();
        let key_header = self.key_header.clone();
        Box::pin(async move {
            if key.is_empty() {
                warn!("🔑️ No admin API key is configured. Denying admin request.");
                return Err(ErrorInternalServerError("Admin API key is not configured."));
            }
            let provided = req.headers().get(&key_header).and_then(|v| v.to_str().ok()).ok_or_else(|| {
                warn!("🔑️ No admin key found in request. Denying access.");
                ErrorForbidden("No admin key found.")
            })?;
            if provided == key {
                trace!("🔑️ Admin key check for request ✅️");
                service.call(req).await
            } else {
                warn!("🔑️ Invalid admin key found in request. Denying access.");
                Err(ErrorForbidden("Invalid admin key."))
            }
        })
    }
}
