use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::ApiError;
use crate::account::errors::DisplayNameError;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::RoleError;
use crate::account::errors::SettingsError;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::Password;
use crate::account::models::Role;
use crate::account::models::SettingsOutcome;
use crate::account::models::UpdateSettingsCommand;
use crate::account::ports::AccountServicePort;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Response, ApiError> {
    let command = body.try_into_command()?;

    let outcome = state
        .account_service
        .update_settings(&user, command)
        .await
        .map_err(ApiError::from)?;

    let response = match outcome {
        SettingsOutcome::EmailChangePending => (
            StatusCode::ACCEPTED,
            Json(json!({
                "message": "Verification email sent!"
            })),
        )
            .into_response(),
        SettingsOutcome::Updated(_) => (
            StatusCode::OK,
            Json(json!({
                "message": "Settings updated!"
            })),
        )
            .into_response(),
    };

    Ok(response)
}

/// HTTP request body for a settings update (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateSettingsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub new_password: Option<String>,
    pub role: Option<String>,
    pub is_two_factor_enabled: Option<bool>,
}

#[derive(Debug, Clone, Error)]
enum ParseUpdateSettingsRequestError {
    #[error("Invalid name: {0}")]
    Name(#[from] DisplayNameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),

    #[error("Invalid role: {0}")]
    Role(#[from] RoleError),

    #[error("Invalid settings update: {0}")]
    Settings(#[from] SettingsError),
}

impl UpdateSettingsRequest {
    fn try_into_command(
        self,
    ) -> Result<UpdateSettingsCommand, ParseUpdateSettingsRequestError> {
        let name = self.name.map(DisplayName::new).transpose()?;
        let email = self.email.map(EmailAddress::new).transpose()?;
        let new_password = self.new_password.map(Password::new).transpose()?;
        let role = self.role.map(|r| r.parse::<Role>()).transpose()?;

        Ok(UpdateSettingsCommand::new(
            name,
            email,
            self.password,
            new_password,
            role,
            self.is_two_factor_enabled,
        )?)
    }
}

impl From<ParseUpdateSettingsRequestError> for ApiError {
    fn from(err: ParseUpdateSettingsRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
