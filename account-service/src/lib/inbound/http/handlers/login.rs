use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::EmailError;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::LoginOutcome;
use crate::account::models::SessionPair;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::cookies;
use crate::inbound::http::cookies::ACCESS_COOKIE;
use crate::inbound::http::cookies::REFRESH_COOKIE;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .account_service
        .login(body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    let response = match outcome {
        // Distinguished outcome, not an error: a fresh verification link
        // went out.
        LoginOutcome::VerificationPending => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "message": "Confirmation email sent!"
            })),
        )
            .into_response(),
        LoginOutcome::TwoFactorRequired => (
            StatusCode::ACCEPTED,
            Json(json!({
                "two_factor": true
            })),
        )
            .into_response(),
        LoginOutcome::LoggedIn(pair) => logged_in_response(&pair),
    };

    Ok(response)
}

fn logged_in_response(pair: &SessionPair) -> Response {
    let mut response = ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            message: "Login successful!".to_string(),
        },
    )
    .into_response();

    for (name, credential) in [(ACCESS_COOKIE, &pair.access), (REFRESH_COOKIE, &pair.refresh)] {
        if let Ok(value) = cookies::session_cookie(name, credential) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

/// HTTP request body for login (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
    code: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseLoginRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Password is required")]
    MissingPassword,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, ParseLoginRequestError> {
        let email = EmailAddress::new(self.email)?;

        if self.password.is_empty() {
            return Err(ParseLoginRequestError::MissingPassword);
        }

        Ok(LoginCommand {
            email,
            password: self.password,
            code: self.code,
        })
    }
}

impl From<ParseLoginRequestError> for ApiError {
    fn from(err: ParseLoginRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub message: String,
}
