use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::account::errors::AccountError;
use account_service::account::errors::MailerError;
use account_service::account::models::DisplayName;
use account_service::account::models::EmailAddress;
use account_service::account::models::Role;
use account_service::account::models::TokenId;
use account_service::account::models::TokenPurpose;
use account_service::account::models::TwoFactorConfirmation;
use account_service::account::models::User;
use account_service::account::models::UserId;
use account_service::account::models::VerificationToken;
use account_service::account::ports::Mailer;
use account_service::account::ports::TokenRepository;
use account_service::account::ports::TwoFactorRepository;
use account_service::account::ports::UserRepository;
use account_service::account::service::AccountService;
use account_service::account::session::SessionManager;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

pub const TEST_SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

/// In-memory account store.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, user: User) -> Result<User, AccountError> {
        let mut rows = self.rows.lock().unwrap();

        if rows.values().any(|u| u.email == user.email) {
            return Err(AccountError::EmailTaken(user.email.as_str().to_string()));
        }

        rows.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError> {
        Ok(self.rows.lock().unwrap().get(&id.0).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, AccountError> {
        let mut rows = self.rows.lock().unwrap();

        if rows
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AccountError::EmailTaken(user.email.as_str().to_string()));
        }
        if !rows.contains_key(&user.id.0) {
            return Err(AccountError::NotFound(user.id.to_string()));
        }

        rows.insert(user.id.0, user.clone());
        Ok(user)
    }
}

/// In-memory token store keyed the way the real store's uniqueness
/// constraint is, so an insert for a live subject supersedes atomically.
#[derive(Default)]
pub struct InMemoryTokens {
    rows: Mutex<HashMap<(TokenPurpose, String), VerificationToken>>,
}

impl InMemoryTokens {
    pub fn live_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokens {
    async fn upsert(&self, token: VerificationToken) -> Result<VerificationToken, AccountError> {
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

/// In-memory two-factor confirmation store.
#[derive(Default)]
pub struct InMemoryTwoFactor {
    rows: Mutex<Vec<TwoFactorConfirmation>>,
}

impl InMemoryTwoFactor {
    pub fn count_for(&self, user_id: &UserId) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == *user_id)
            .count()
    }
}

#[async_trait]
impl TwoFactorRepository for InMemoryTwoFactor {
    async fn replace_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<TwoFactorConfirmation, AccountError> {
        let confirmation = TwoFactorConfirmation {
            id: Uuid::new_v4(),
            user_id: *user_id,
        };

        let mut rows = self.rows.lock().unwrap();
        rows.retain(|c| c.user_id != *user_id);
        rows.push(confirmation.clone());

        Ok(confirmation)
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<TwoFactorConfirmation>, AccountError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == *user_id)
            .cloned())
    }
}

/// A notification captured by the recording mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    Verification { to: String, token: String },
    PasswordReset { to: String, token: String },
    EmailChange { to: String, token: String },
    TwoFactorCode { to: String, code: String },
}

/// Mailer double that records every notification instead of sending it,
/// so tests can fish out token values.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<SentMail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentMail::Verification {
            to: email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentMail::PasswordReset {
            to: email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn send_email_change(&self, new_email: &str, token: &str) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentMail::EmailChange {
            to: new_email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn send_two_factor_code(&self, email: &str, code: &str) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentMail::TwoFactorCode {
            to: email.to_string(),
            code: code.to_string(),
        });
        Ok(())
    }
}

/// Account service wired against in-memory adapters, with handles onto
/// every collaborator for assertions.
pub struct TestApp {
    pub service:
        AccountService<InMemoryUsers, InMemoryTokens, InMemoryTwoFactor, RecordingMailer>,
    pub users: Arc<InMemoryUsers>,
    pub tokens: Arc<InMemoryTokens>,
    pub two_factor: Arc<InMemoryTwoFactor>,
    pub mailer: Arc<RecordingMailer>,
    pub sessions: Arc<SessionManager>,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let tokens = Arc::new(InMemoryTokens::default());
        let two_factor = Arc::new(InMemoryTwoFactor::default());
        let mailer = Arc::new(RecordingMailer::default());
        let sessions = Arc::new(SessionManager::new(TEST_SECRET));

        let service = AccountService::new(
            Arc::clone(&users),
            Arc::clone(&tokens),
            Arc::clone(&two_factor),
            Arc::clone(&mailer),
            Arc::clone(&sessions),
        );

        Self {
            service,
            users,
            tokens,
            two_factor,
            mailer,
            sessions,
        }
    }

    /// Seed an account directly into the store, bypassing registration.
    pub async fn seed_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        verified: bool,
        two_factor: bool,
    ) -> User {
        let user = User {
            id: UserId::new(),
            name: DisplayName::new(name.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: auth::PasswordHasher::new().hash(password).unwrap(),
            role: Role::User,
            email_verified: verified.then(Utc::now),
            is_two_factor_enabled: two_factor,
        };

        self.users.create(user).await.unwrap()
    }
}
