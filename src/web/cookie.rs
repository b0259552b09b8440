//! Signed session cookie.
//!
//! The session identifier is opaque and client-carried: a UUID signed with
//! HMAC-SHA-256 under the configured session secret, serialized as
//! `<id>.<hex tag>`. Tampered or malformed cookies are treated as absent and
//! a fresh identifier is minted.

use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "sid";

/// Sign a session id into a cookie value.
pub fn sign(secret: &str, sid: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(sid.as_bytes());
    format!("{sid}.{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a cookie value, returning the embedded session id.
pub fn verify(secret: &str, value: &str) -> Option<String> {
    let (sid, tag) = value.rsplit_once('.')?;
    let tag = hex::decode(tag).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(sid.as_bytes());
    mac.verify_slice(&tag).ok()?;
    Some(sid.to_string())
}

/// Extract the session id from request headers, if a valid cookie is present.
pub fn session_from_headers(headers: &HeaderMap, secret: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name != COOKIE_NAME {
            return None;
        }
        verify(secret, value)
    })
}

/// Mint a fresh session id.
pub fn mint() -> String {
    Uuid::new_v4().to_string()
}

/// Resolve the request's session id, minting one when absent or invalid.
///
/// The boolean is true when the id is fresh and the response must carry a
/// `Set-Cookie` header.
pub fn resolve(headers: &HeaderMap, secret: &str) -> (String, bool) {
    match session_from_headers(headers, secret) {
        Some(sid) => (sid, false),
        None => (mint(), true),
    }
}

/// `Set-Cookie` value binding a session id to the browser.
pub fn set_cookie(secret: &str, sid: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        COOKIE_NAME,
        sign(secret, sid),
        max_age_secs
    )
}
