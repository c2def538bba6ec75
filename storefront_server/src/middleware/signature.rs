//! Webhook signature middleware for Actix Web.
//!
//! Stripe signs each webhook delivery with the endpoint's signing secret and sends the result in the
//! `Stripe-Signature` header. The signature covers the raw request body, so it has to be checked before anything
//! parses the body. This middleware reads the body, verifies it, and then puts the bytes back so that the handler can
//! extract them as usual.
//!
//! Requests with no signature, an invalid signature or a stale timestamp are rejected with 401 and never reach the
//! handler. Oversized bodies are rejected with 413.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::CONTENT_LENGTH,
    Error, HttpMessage,
};
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures::{future::LocalBoxFuture, StreamExt};
use log::{trace, warn};
use storefront_common::Secret;
use stripe_tools::webhook::{verify_signature, SIGNATURE_HEADER};

use crate::{config::WebhookConfig, errors::ServerError};

pub struct SignatureMiddlewareFactory {
    secret: Secret<String>,
    tolerance_secs: i64,
    max_body_size: usize,
}

impl SignatureMiddlewareFactory {
    pub fn new(config: &WebhookConfig) -> Self {
        Self {
            secret: config.signing_secret.clone(),
            tolerance_secs: config.tolerance_secs,
            max_body_size: config.max_body_size,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService {
            secret: self.secret.clone(),
            tolerance_secs: self.tolerance_secs,
            max_body_size: self.max_body_size,
            service: Rc::new(service),
        }))
    }
}

pub struct SignatureMiddlewareService<S> {
    secret: Secret<String>,
    tolerance_secs: i64,
    max_body_size: usize,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.secret.reveal().clone();
        let tolerance_secs = self.tolerance_secs;
        let max_body_size = self.max_body_size;
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature");
            let declared_len = req
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or_default();
            if declared_len > max_body_size {
                warn!("🔐️ Webhook body of {declared_len} bytes exceeds the limit. Denying access.");
                return Err(ServerError::PayloadTooLarge(max_body_size).into());
            }
            let header = req
                .headers()
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
                .ok_or_else(|| {
                    warn!("🔐️ No signature found in webhook request. Denying access.");
                    ServerError::InvalidSignature("No signature found.".into())
                })?;
            let data = read_body(&mut req.take_payload(), max_body_size).await?;
            match verify_signature(data.as_ref(), &header, &secret, tolerance_secs, Utc::now().timestamp()) {
                Ok(()) => {
                    trace!("🔐️ Webhook signature check ✅️");
                    req.set_payload(bytes_to_payload(data));
                    service.call(req).await
                },
                Err(e) => {
                    warn!("🔐️ Invalid webhook signature. {e}. Denying access.");
                    Err(ServerError::InvalidSignature(e.to_string()).into())
                },
            }
        })
    }
}

/// Buffers the request body, giving up as soon as it grows past `max_body_size`. Chunked bodies carry no
/// `Content-Length`, so the limit is enforced here as the chunks arrive.
async fn read_body(payload: &mut Payload, max_body_size: usize) -> Result<Bytes, ServerError> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            warn!("🔐️ Failed to read webhook body: {e}");
            ServerError::InvalidRequestBody("Failed to extract request data.".into())
        })?;
        if body.len() + chunk.len() > max_body_size {
            warn!("🔐️ Webhook body exceeds {max_body_size} bytes. Denying access.");
            return Err(ServerError::PayloadTooLarge(max_body_size));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

fn bytes_to_payload(buf: Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
