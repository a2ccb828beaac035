use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiSuccess;
use crate::account::models::User;
use crate::inbound::http::middleware::CurrentUser;

pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiSuccess<UserData> {
    ApiSuccess::new(StatusCode::OK, UserData::from(&user))
}

/// User representation returned to clients. The password hash never
/// leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub email_verified: Option<DateTime<Utc>>,
    pub is_two_factor_enabled: bool,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role.to_string(),
            email_verified: user.email_verified,
            is_two_factor_enabled: user.is_two_factor_enabled,
        }
    }
}
