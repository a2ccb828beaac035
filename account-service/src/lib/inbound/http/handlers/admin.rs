use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::Role;
use crate::inbound::http::middleware::CurrentUser;

pub async fn admin_only(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<ApiSuccess<AdminResponseData>, ApiError> {
    if user.role != Role::Admin {
        return Err(ApiError::Unauthorized(
            "You don't have the permission to access this.".to_string(),
        ));
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AdminResponseData {
            message: "Hello, Admin".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminResponseData {
    pub message: String,
}
