use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;

pub async fn new_email(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<NewEmailRequest>,
) -> Result<ApiSuccess<NewEmailResponseData>, ApiError> {
    state
        .account_service
        .confirm_email_change(&user, &body.token)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                NewEmailResponseData {
                    message: "Email has been changed".to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEmailRequest {
    token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEmailResponseData {
    pub message: String,
}
