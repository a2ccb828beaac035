use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use super::database_error;
use crate::account::errors::AccountError;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::Role;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::ports::UserRepository;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &PgRow) -> Result<User, AccountError> {
    let role: String = row.try_get("role").map_err(database_error)?;

    Ok(User {
        id: UserId(row.try_get("id").map_err(database_error)?),
        name: DisplayName::new(row.try_get("name").map_err(database_error)?)?,
        email: EmailAddress::new(row.try_get("email").map_err(database_error)?)?,
        password_hash: row.try_get("password_hash").map_err(database_error)?,
        role: role.parse::<Role>()?,
        email_verified: row.try_get("email_verified").map_err(database_error)?,
        is_two_factor_enabled: row
            .try_get("is_two_factor_enabled")
            .map_err(database_error)?,
    })
}

fn map_unique_violation(e: sqlx::Error, email: &str) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return AccountError::EmailTaken(email.to_string());
        }
    }
    database_error(e)
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, AccountError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, email_verified, is_two_factor_enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.email_verified)
        .bind(user.is_two_factor_enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, user.email.as_str()))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, email_verified, is_two_factor_enabled
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, email_verified, is_two_factor_enabled
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn update(&self, user: User) -> Result<User, AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, role = $5,
                email_verified = $6, is_two_factor_enabled = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.email_verified)
        .bind(user.is_two_factor_enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, user.email.as_str()))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }
}
