use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::cookies;
use crate::inbound::http::cookies::ACCESS_COOKIE;
use crate::inbound::http::cookies::LEGACY_USER_COOKIE;
use crate::inbound::http::cookies::REFRESH_COOKIE;

/// Clear every session carrier, valid session or not. Idempotent.
pub async fn logout() -> Response {
    let mut response = ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            message: "Logged out".to_string(),
        },
    )
    .into_response();

    for name in [ACCESS_COOKIE, REFRESH_COOKIE, LEGACY_USER_COOKIE] {
        if let Ok(value) = cookies::clear_cookie(name) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
