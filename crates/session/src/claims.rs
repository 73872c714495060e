// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local expiry evaluation for access credentials.
//!
//! The access credential is a signed JWT; its middle segment carries an `exp`
//! claim in epoch seconds. Validity is decided here without network I/O, so
//! the check is safe on every request. The signature is not verified — the
//! server is the authority; this is only a cheap local expiry gate.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;

use crate::store::{CredentialStore, ACCESS_TOKEN, REFRESH_TOKEN};

#[derive(Debug, Deserialize)]
struct Claims {
    exp: u64,
}

pub(crate) fn epoch_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// `true` iff the credential is present, structurally sound, and its `exp`
/// claim is strictly in the future. No clock-skew tolerance. Malformed input
/// fails closed.
pub fn is_valid(token: Option<&str>) -> bool {
    let Some(token) = token else {
        return false;
    };
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return false,
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload) else {
        return false;
    };
    let Ok(claims) = serde_json::from_slice::<Claims>(&bytes) else {
        return false;
    };
    claims.exp > epoch_secs()
}

/// Session-level authentication policy: a caller counts as authenticated if
/// the access credential is currently valid, or if a refresh credential is
/// still on hand (optimistic — the server judges it at renewal time).
pub fn is_authenticated(store: &CredentialStore) -> bool {
    is_valid(store.get(ACCESS_TOKEN).as_deref()) || store.get(REFRESH_TOKEN).is_some()
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod tests;
