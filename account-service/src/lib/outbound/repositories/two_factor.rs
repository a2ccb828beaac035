use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use super::database_error;
use crate::account::errors::AccountError;
use crate::account::models::TwoFactorConfirmation;
use crate::account::models::UserId;
use crate::account::ports::TwoFactorRepository;

pub struct PostgresTwoFactorRepository {
    pool: PgPool,
}

impl PostgresTwoFactorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TwoFactorRepository for PostgresTwoFactorRepository {
    async fn replace_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<TwoFactorConfirmation, AccountError> {
        let confirmation = TwoFactorConfirmation {
            id: Uuid::new_v4(),
            user_id: *user_id,
        };

        // Delete-then-insert inside one transaction so the UNIQUE (user_id)
        // constraint can never observe two markers.
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            r#"
            DELETE FROM two_factor_confirmations
            WHERE user_id = $1
            "#,
        )
        .bind(confirmation.user_id.0)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO two_factor_confirmations (id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(confirmation.id)
        .bind(confirmation.user_id.0)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(confirmation)
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<TwoFactorConfirmation>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id
            FROM two_factor_confirmations
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        match row {
            Some(row) => Ok(Some(TwoFactorConfirmation {
                id: row.try_get("id").map_err(database_error)?,
                user_id: UserId(row.try_get("user_id").map_err(database_error)?),
            })),
            None => Ok(None),
        }
    }
}
