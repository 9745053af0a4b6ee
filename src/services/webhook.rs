//! HMAC-SHA256 verification of inbound webhook payloads.
//!
//! The sender signs the raw request body with the shared webhook secret and
//! sends the lowercase hex digest in the `x-stream-signature` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Event types the platform can deliver.
pub const WEBHOOK_EVENTS: &[&str] = &[
    "consumer.created",
    "consumer.updated",
    "consumer.deleted",
    "subscription.created",
    "subscription.updated",
    "subscription.canceled",
    "subscription.frozen",
    "subscription.unfrozen",
    "payment.succeeded",
    "payment.failed",
    "payment.refunded",
    "payment.pending",
    "invoice.created",
    "invoice.updated",
    "invoice.paid",
    "invoice.voided",
    "product.created",
    "product.updated",
    "product.deleted",
    "coupon.created",
    "coupon.updated",
    "coupon.deleted",
    "payment_link.created",
    "payment_link.completed",
];

/// Lowercase hex HMAC-SHA256 of `body` keyed by `secret`.
///
/// HMAC accepts keys of any length, so this is `None` only if the MAC
/// cannot be keyed at all.
pub fn sign_payload(body: &[u8], secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Check `provided` against the signature of `body` under `secret`.
///
/// The digest is always computed. A length mismatch returns early, which
/// only reveals the (constant) digest length; equal-length values are
/// compared in constant time. `provided` is compared exactly as given.
pub fn verify_signature(body: &[u8], provided: &str, secret: &str) -> bool {
    let Some(expected) = sign_payload(body, secret) else {
        return false;
    };
    if provided.len() != expected.len() {
        return false;
    }
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
