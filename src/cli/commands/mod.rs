pub mod checkout;
pub mod config;
pub mod consumers;
pub mod coupons;
pub mod invoices;
pub mod me;
pub mod payments;
pub mod products;
pub mod subscriptions;
pub mod webhook;

use crate::utils::parse::{InputError, parse_json};
use serde_json::Value;

/// Use the raw `--data` body when given, otherwise build one from flags.
fn raw_or(
    data: Option<&str>,
    build: impl FnOnce() -> Result<Value, InputError>,
) -> Result<Value, InputError> {
    match data {
        Some(raw) => parse_json(raw),
        None => build(),
    }
}

fn require<'a, T>(value: &'a Option<T>, flag: &'static str) -> Result<&'a T, InputError> {
    value.as_ref().ok_or(InputError::MissingFlag(flag))
}
