use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::TokenId;
use crate::account::models::TokenPurpose;
use crate::account::models::TokenSubject;
use crate::account::models::VerificationToken;
use crate::account::ports::TokenRepository;

/// Mints and consumes single-use verification tokens.
///
/// Issuing supersedes any live token for the same `(purpose, subject)`
/// through the repository's atomic upsert. Consuming deletes the token on
/// success and on the expired path, so an expired value cannot be probed
/// repeatedly.
pub struct TokenIssuer<TR>
where
    TR: TokenRepository,
{
    repository: Arc<TR>,
}

impl<TR> TokenIssuer<TR>
where
    TR: TokenRepository,
{
    pub fn new(repository: Arc<TR>) -> Self {
        Self { repository }
    }

    /// Mint a token for `subject`, replacing any live one.
    ///
    /// Link purposes get a random UUID value; two-factor gets a uniformly
    /// random 6-digit decimal code. Expiry is the purpose's fixed TTL from
    /// now.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    pub async fn issue(
        &self,
        purpose: TokenPurpose,
        subject: TokenSubject,
    ) -> Result<VerificationToken, AccountError> {
        let value = match purpose {
            TokenPurpose::TwoFactor => {
                rand::thread_rng().gen_range(100_000..1_000_000).to_string()
            }
            _ => Uuid::new_v4().to_string(),
        };

        let token = VerificationToken {
            id: TokenId::new(),
            purpose,
            subject,
            value,
            expires_at: Utc::now() + purpose.ttl(),
        };

        self.repository.upsert(token).await
    }

    /// Validate and delete a token, returning its subject.
    ///
    /// # Errors
    /// * `TokenNotFound` - No live token with this value
    /// * `TokenExpired` - Token matched but is past its TTL; it is still
    ///   deleted on this path
    /// * `DatabaseError` - Store operation failed
    pub async fn consume(
        &self,
        purpose: TokenPurpose,
        value: &str,
    ) -> Result<TokenSubject, AccountError> {
        let token = self
            .repository
            .find_by_value(purpose, value)
            .await?
            .ok_or(AccountError::TokenNotFound)?;

        if token.expires_at < Utc::now() {
            self.repository.delete(&token.id).await?;
            return Err(AccountError::TokenExpired);
        }

        if !self.repository.delete(&token.id).await? {
            // Lost a concurrent consume of the same value.
            return Err(AccountError::TokenNotFound);
        }

        Ok(token.subject)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::account::models::EmailAddress;

    /// Map keyed the way the store's uniqueness constraint is.
    #[derive(Default)]
    struct InMemoryTokens {
        rows: Mutex<HashMap<(TokenPurpose, String), VerificationToken>>,
    }

    #[async_trait]
    impl TokenRepository for InMemoryTokens {
        async fn upsert(
            &self,
            token: VerificationToken,
        ) -> Result<VerificationToken, AccountError> {
            self.rows
                .lock()
                .unwrap()
                .insert((token.purpose, token.subject.key()), token.clone());
            Ok(token)
        }

        async fn find_by_value(
            &self,
            purpose: TokenPurpose,
            value: &str,
        ) -> Result<Option<VerificationToken>, AccountError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|t| t.purpose == purpose && t.value == value)
                .cloned())
        }

        async fn delete(&self, id: &TokenId) -> Result<bool, AccountError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|_, t| t.id != *id);
            Ok(rows.len() < before)
        }
    }

    fn subject(email: &str) -> TokenSubject {
        TokenSubject::Email(EmailAddress::new(email.to_string()).unwrap())
    }

    #[tokio::test]
    async fn test_issue_supersedes_previous_token() {
        let repository = Arc::new(InMemoryTokens::default());
        let issuer = TokenIssuer::new(Arc::clone(&repository));

        let first = issuer
            .issue(TokenPurpose::EmailVerify, subject("jane@x.com"))
            .await
            .unwrap();
        let second = issuer
            .issue(TokenPurpose::EmailVerify, subject("jane@x.com"))
            .await
            .unwrap();

        assert_ne!(first.value, second.value);
        assert_eq!(repository.rows.lock().unwrap().len(), 1);

        // The first value is dead, the second consumes.
        assert!(matches!(
            issuer
                .consume(TokenPurpose::EmailVerify, &first.value)
                .await,
            Err(AccountError::TokenNotFound)
        ));
        assert_eq!(
            issuer
                .consume(TokenPurpose::EmailVerify, &second.value)
                .await
                .unwrap(),
            subject("jane@x.com")
        );
    }

    #[tokio::test]
    async fn test_issue_keeps_distinct_subjects_live() {
        let repository = Arc::new(InMemoryTokens::default());
        let issuer = TokenIssuer::new(Arc::clone(&repository));

        issuer
            .issue(TokenPurpose::EmailVerify, subject("jane@x.com"))
            .await
            .unwrap();
        issuer
            .issue(TokenPurpose::EmailVerify, subject("joe@x.com"))
            .await
            .unwrap();
        issuer
            .issue(TokenPurpose::PasswordReset, subject("jane@x.com"))
            .await
            .unwrap();

        assert_eq!(repository.rows.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let repository = Arc::new(InMemoryTokens::default());
        let issuer = TokenIssuer::new(repository);

        let token = issuer
            .issue(TokenPurpose::PasswordReset, subject("jane@x.com"))
            .await
            .unwrap();

        assert!(issuer
            .consume(TokenPurpose::PasswordReset, &token.value)
            .await
            .is_ok());
        assert!(matches!(
            issuer
                .consume(TokenPurpose::PasswordReset, &token.value)
                .await,
            Err(AccountError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_consume_requires_matching_purpose() {
        let repository = Arc::new(InMemoryTokens::default());
        let issuer = TokenIssuer::new(repository);

        let token = issuer
            .issue(TokenPurpose::EmailVerify, subject("jane@x.com"))
            .await
            .unwrap();

        assert!(matches!(
            issuer
                .consume(TokenPurpose::PasswordReset, &token.value)
                .await,
            Err(AccountError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_consume_deletes_expired_token() {
        let repository = Arc::new(InMemoryTokens::default());
        let issuer = TokenIssuer::new(Arc::clone(&repository));

        let mut token = issuer
            .issue(TokenPurpose::TwoFactor, subject("jane@x.com"))
            .await
            .unwrap();
        token.expires_at = Utc::now() - Duration::seconds(1);
        repository.upsert(token.clone()).await.unwrap();

        assert!(matches!(
            issuer.consume(TokenPurpose::TwoFactor, &token.value).await,
            Err(AccountError::TokenExpired)
        ));
        // Burned: the expired failure removed the row.
        assert!(repository.rows.lock().unwrap().is_empty());
        assert!(matches!(
            issuer.consume(TokenPurpose::TwoFactor, &token.value).await,
            Err(AccountError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_consume_accepts_token_before_expiry() {
        let repository = Arc::new(InMemoryTokens::default());
        let issuer = TokenIssuer::new(Arc::clone(&repository));

        let mut token = issuer
            .issue(TokenPurpose::TwoFactor, subject("jane@x.com"))
            .await
            .unwrap();
        // Nearly expired but still inside its TTL.
        token.expires_at = Utc::now() + Duration::milliseconds(500);
        repository.upsert(token.clone()).await.unwrap();

        assert!(issuer
            .consume(TokenPurpose::TwoFactor, &token.value)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_two_factor_value_is_six_digit_code() {
        let repository = Arc::new(InMemoryTokens::default());
        let issuer = TokenIssuer::new(repository);

        for _ in 0..32 {
            let token = issuer
                .issue(TokenPurpose::TwoFactor, subject("jane@x.com"))
                .await
                .unwrap();

            assert_eq!(token.value.len(), 6);
            assert!(token.value.chars().all(|c| c.is_ascii_digit()));
            assert!(!token.value.starts_with('0'));
        }
    }

    #[tokio::test]
    async fn test_link_token_value_is_uuid() {
        let repository = Arc::new(InMemoryTokens::default());
        let issuer = TokenIssuer::new(repository);

        let token = issuer
            .issue(TokenPurpose::EmailChange, subject("jane@x.com"))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&token.value).is_ok());
    }
}
