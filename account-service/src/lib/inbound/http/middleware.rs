use axum::extract::Request;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::account::models::Credential;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::cookies;
use crate::inbound::http::cookies::ACCESS_COOKIE;
use crate::inbound::http::cookies::REFRESH_COOKIE;
use crate::inbound::http::router::AppState;

/// Extension type carrying the authenticated user through the request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Session guard for protected routes.
///
/// Resolves the access credential, falling back to a transparent renewal
/// from the refresh credential, then attaches the full user record to the
/// request. Every failure mode collapses into the same 401.
///
/// A renewal produces a fresh access credential; it is emitted on the
/// outgoing response here, so the core never mutates a response itself.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let access = jar.get(ACCESS_COOKIE).map(|c| c.value().to_string());
    let refresh = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());

    let (user_id, renewed) =
        resolve_identity(&state, access.as_deref(), refresh.as_deref()).ok_or_else(unauthorized)?;

    let user = state.account_service.get_user(&user_id).await.map_err(|e| {
        tracing::warn!("Session user lookup failed: {}", e);
        unauthorized()
    })?;

    req.extensions_mut().insert(CurrentUser(user));

    let mut response = next.run(req).await;

    if let Some(credential) = renewed {
        if let Ok(value) = cookies::session_cookie(ACCESS_COOKIE, &credential) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    Ok(response)
}

/// Resolve the caller's identity from the carried credentials.
///
/// A valid access credential answers directly. Otherwise a valid refresh
/// credential mints a replacement access credential, returned so the
/// caller can emit it.
fn resolve_identity(
    state: &AppState,
    access: Option<&str>,
    refresh: Option<&str>,
) -> Option<(UserId, Option<Credential>)> {
    if let Some(token) = access {
        if let Some(claims) = state.sessions.verify(token) {
            let user_id = UserId::from_string(&claims.sub).ok()?;
            return Some((user_id, None));
        }
    }

    let renewed = state.sessions.renew_access(refresh?).ok()?;

    Some((renewed.user_id, Some(renewed.credential)))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "Unauthorized! You need to sign in."
        })),
    )
        .into_response()
}
