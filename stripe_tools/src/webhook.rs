//! Stripe webhook authentication and decoding.
//!
//! Stripe signs every webhook with the endpoint's shared secret. The `Stripe-Signature` header looks like
//! `t=1492774577,v1=5257a869...,v1=...`: `t` is the unix time of signing and each `v1` is a hex encoded
//! HMAC-SHA256 of `"{t}.{raw body}"`. More than one `v1` can be present while a secret is being rolled.
//!
//! Authentication must happen on the raw bytes, before the body is parsed.
use hmac::{Hmac, Mac};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

use crate::{CheckoutSession, StripeApiError};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("The signature header is malformed: {0}")]
    MalformedHeader(String),
    #[error("The signature timestamp is outside the tolerance window")]
    TimestampOutOfTolerance,
    #[error("No signature matches the payload")]
    NoMatchingSignature,
    #[error("The webhook secret is not configured")]
    MissingSecret,
}

/// The parsed contents of a `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", ts)) => {
                    let ts = ts.parse::<i64>().map_err(|_| SignatureError::MalformedHeader("bad timestamp".into()))?;
                    timestamp = Some(ts);
                },
                // Undecodable signatures can never match, so they are skipped rather than rejected
                Some(("v1", sig)) => signatures.extend(hex::decode(sig).ok()),
                _ => {},
            }
        }
        let timestamp = timestamp.ok_or_else(|| SignatureError::MalformedHeader("missing timestamp".into()))?;
        if signatures.is_empty() {
            return Err(SignatureError::MalformedHeader("no v1 signature".into()));
        }
        Ok(Self { timestamp, signatures })
    }
}

fn signed_payload_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::MissingSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Computes the hex `v1` signature for `payload` signed at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mac = signed_payload_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Builds a complete `Stripe-Signature` header value. Useful for tests and for replaying events locally.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    Ok(format!("t={timestamp},v1={}", compute_signature(secret, timestamp, payload)?))
}

/// Checks `header` against `payload`. `now` is the current unix time and `tolerance_secs` the maximum allowed distance
/// between it and the signing time, in either direction.
///
/// Comparison is constant time.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::MissingSecret);
    }
    let header = SignatureHeader::parse(header)?;
    if now.abs_diff(header.timestamp) > tolerance_secs.unsigned_abs() {
        debug!("🔐️ Signature timestamp {} is too far from now ({now})", header.timestamp);
        return Err(SignatureError::TimestampOutOfTolerance);
    }
    let matched = header.signatures.iter().any(|sig| {
        signed_payload_mac(secret, header.timestamp, payload).map(|mac| mac.verify_slice(sig).is_ok()).unwrap_or(false)
    });
    if matched {
        Ok(())
    } else {
        Err(SignatureError::NoMatchingSignature)
    }
}

//--------------------------------------      Events        ---------------------------------------------------------

/// A decoded webhook event. Only the kinds we act on are modelled; everything else is [`StripeEventKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    pub kind: StripeEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StripeEventKind {
    CheckoutSessionCompleted(CheckoutSession),
    Other(String),
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: Value,
}

impl StripeEvent {
    /// Decodes the event envelope. The type is read first, and the payload object is only interpreted for kinds we
    /// know, so that new Stripe event types never cause a decoding failure.
    pub fn from_slice(body: &[u8]) -> Result<Self, StripeApiError> {
        let raw: RawEvent = serde_json::from_slice(body).map_err(|e| StripeApiError::JsonError(e.to_string()))?;
        let kind = match raw.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => {
                let session = serde_json::from_value::<CheckoutSession>(raw.data.object)
                    .map_err(|e| StripeApiError::JsonError(e.to_string()))?;
                StripeEventKind::CheckoutSessionCompleted(session)
            },
            _ => StripeEventKind::Other(raw.event_type),
        };
        Ok(Self { id: raw.id, kind })
    }

    pub fn event_type(&self) -> &str {
        match &self.kind {
            StripeEventKind::CheckoutSessionCompleted(_) => CHECKOUT_SESSION_COMPLETED,
            StripeEventKind::Other(t) => t,
        }
    }
}
