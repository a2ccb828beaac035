use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::Password;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn new_password(
    State(state): State<AppState>,
    Json(body): Json<NewPasswordRequest>,
) -> Result<ApiSuccess<NewPasswordResponseData>, ApiError> {
    let password = Password::new(body.password).map_err(AccountError::from)?;

    state
        .account_service
        .reset_password(&body.token, password)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                NewPasswordResponseData {
                    message: "Password has been reset".to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPasswordRequest {
    token: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPasswordResponseData {
    pub message: String,
}
