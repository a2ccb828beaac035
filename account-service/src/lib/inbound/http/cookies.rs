use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;
use chrono::Utc;

use crate::account::models::Credential;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Pre-rework clients cached a serialized user under this name; logout
/// still clears it.
pub const LEGACY_USER_COOKIE: &str = "user";

/// Build a `Set-Cookie` value carrying a session credential.
///
/// HttpOnly keeps scripts out, Secure keeps it on TLS, and SameSite=Lax
/// blunts cross-site request forgery. Max-Age tracks the credential's own
/// expiry.
pub fn session_cookie(
    name: &str,
    credential: &Credential,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = (credential.expires_at - Utc::now()).num_seconds().max(0);

    HeaderValue::from_str(&format!(
        "{name}={}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={max_age}",
        credential.token
    ))
}

/// Build a `Set-Cookie` value that clears a carrier.
pub fn clear_cookie(name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0"
    ))
}
