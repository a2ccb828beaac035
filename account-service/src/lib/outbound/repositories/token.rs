use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use super::database_error;
use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::TokenId;
use crate::account::models::TokenPurpose;
use crate::account::models::TokenSubject;
use crate::account::models::VerificationToken;
use crate::account::ports::TokenRepository;

pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_token(row: &PgRow) -> Result<VerificationToken, AccountError> {
    let purpose: String = row.try_get("purpose").map_err(database_error)?;
    let email: String = row.try_get("email").map_err(database_error)?;
    let new_email: Option<String> = row.try_get("new_email").map_err(database_error)?;

    let subject = match new_email {
        Some(new_email) => TokenSubject::EmailChange {
            old_email: EmailAddress::new(email)?,
            new_email: EmailAddress::new(new_email)?,
        },
        None => TokenSubject::Email(EmailAddress::new(email)?),
    };

    Ok(VerificationToken {
        id: TokenId(row.try_get("id").map_err(database_error)?),
        purpose: purpose
            .parse::<TokenPurpose>()
            .map_err(AccountError::DatabaseError)?,
        subject,
        value: row.try_get("token").map_err(database_error)?,
        expires_at: row.try_get("expires_at").map_err(database_error)?,
    })
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn upsert(&self, token: VerificationToken) -> Result<VerificationToken, AccountError> {
        let (email, new_email) = match &token.subject {
            TokenSubject::Email(email) => (email.as_str(), None),
            TokenSubject::EmailChange {
                old_email,
                new_email,
            } => (old_email.as_str(), Some(new_email.as_str())),
        };

        // One statement against the (purpose, subject_key) constraint;
        // concurrent issues for the same subject can never leave two live
        // rows.
        sqlx::query(
            r#"
            INSERT INTO verification_tokens (id, purpose, subject_key, email, new_email, token, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (purpose, subject_key)
            DO UPDATE SET id = EXCLUDED.id, email = EXCLUDED.email,
                          new_email = EXCLUDED.new_email, token = EXCLUDED.token,
                          expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token.id.0)
        .bind(token.purpose.as_str())
        .bind(token.subject.key())
        .bind(email)
        .bind(new_email)
        .bind(&token.value)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(token)
    }

    async fn find_by_value(
        &self,
        purpose: TokenPurpose,
        value: &str,
    ) -> Result<Option<VerificationToken>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT id, purpose, email, new_email, token, expires_at
            FROM verification_tokens
            WHERE purpose = $1 AND token = $2
            LIMIT 1
            "#,
        )
        .bind(purpose.as_str())
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(row_to_token).transpose()
    }

    async fn delete(&self, id: &TokenId) -> Result<bool, AccountError> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_tokens
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}
