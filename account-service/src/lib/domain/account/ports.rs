use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::errors::MailerError;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::LoginOutcome;
use crate::account::models::Password;
use crate::account::models::RegisterCommand;
use crate::account::models::SettingsOutcome;
use crate::account::models::TokenId;
use crate::account::models::TokenPurpose;
use crate::account::models::TwoFactorConfirmation;
use crate::account::models::UpdateSettingsCommand;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::models::VerificationToken;

/// Port for account domain operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account and send its first verification token.
    ///
    /// # Errors
    /// * `EmailTaken` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<(), AccountError>;

    /// Consume an email-verification token and mark the account verified.
    ///
    /// # Errors
    /// * `TokenNotFound` - No live token with this value
    /// * `TokenExpired` - Token matched but is past its TTL
    /// * `NotFound` - The token's account no longer exists
    async fn verify_email(&self, token_value: &str) -> Result<(), AccountError>;

    /// Run the login state machine.
    ///
    /// The checks run in a fixed order: account lookup, verification gate,
    /// two-factor gate, password comparison. The first gate that fires
    /// determines the outcome.
    ///
    /// # Errors
    /// * `NotFound` - No account with this email
    /// * `TokenNotFound` / `TokenExpired` - Supplied two-factor code did
    ///   not match a live token for this account
    /// * `Unauthorized` - Password mismatch
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AccountError>;

    /// Issue a password-reset token and notify the account's address.
    ///
    /// # Errors
    /// * `NotFound` - No account with this email
    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AccountError>;

    /// Consume a password-reset token and store the new password hash.
    ///
    /// # Errors
    /// * `TokenNotFound` / `TokenExpired` - Token outcome
    /// * `NotFound` - The token's account no longer exists
    async fn reset_password(
        &self,
        token_value: &str,
        new_password: Password,
    ) -> Result<(), AccountError>;

    /// Retrieve an account by identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn get_user(&self, id: &UserId) -> Result<User, AccountError>;

    /// Apply a settings update for the authenticated account.
    ///
    /// An email change takes precedence over everything else in the
    /// command and defers until the new address confirms.
    ///
    /// # Errors
    /// * `EmailTaken` - Requested email belongs to another account
    /// * `Unauthorized` - Current password mismatch on a password change
    async fn update_settings(
        &self,
        user: &User,
        command: UpdateSettingsCommand,
    ) -> Result<SettingsOutcome, AccountError>;

    /// Consume an email-change token and commit the new address.
    ///
    /// # Errors
    /// * `TokenNotFound` / `TokenExpired` - Token outcome
    /// * `NotFound` - The token's old address does not match this account
    async fn confirm_email_change(
        &self,
        user: &User,
        token_value: &str,
    ) -> Result<User, AccountError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// # Errors
    /// * `EmailTaken` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn create(&self, user: User) -> Result<User, AccountError>;

    /// Retrieve an account by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError>;

    /// Retrieve an account by email address.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError>;

    /// Update an existing account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `EmailTaken` - New email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn update(&self, user: User) -> Result<User, AccountError>;
}

/// Persistence operations for verification tokens.
#[async_trait]
pub trait TokenRepository: Send + Sync + 'static {
    /// Store a token, replacing any live token for the same
    /// `(purpose, subject)`.
    ///
    /// Must be a single atomic statement against the store's uniqueness
    /// constraint; concurrent issues for one subject must not leave two
    /// live tokens.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn upsert(&self, token: VerificationToken) -> Result<VerificationToken, AccountError>;

    /// Retrieve a token by purpose and raw value.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_value(
        &self,
        purpose: TokenPurpose,
        value: &str,
    ) -> Result<Option<VerificationToken>, AccountError>;

    /// Remove a token, reporting whether it was still present.
    ///
    /// Consume races resolve here: the loser observes `false`.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn delete(&self, id: &TokenId) -> Result<bool, AccountError>;
}

/// Persistence operations for two-factor confirmations.
#[async_trait]
pub trait TwoFactorRepository: Send + Sync + 'static {
    /// Drop any existing confirmation for the user and record a fresh one.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn replace_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<TwoFactorConfirmation, AccountError>;

    /// Retrieve the confirmation for a user, if one exists.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<TwoFactorConfirmation>, AccountError>;
}

/// Outbound notification delivery.
///
/// Fire-and-forget from the domain's perspective: the service logs
/// delivery failures and never lets them affect control flow.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send an email-verification link.
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailerError>;

    /// Send a password-reset link.
    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailerError>;

    /// Send an email-change confirmation link to the new address.
    async fn send_email_change(&self, new_email: &str, token: &str) -> Result<(), MailerError>;

    /// Send a two-factor login code.
    async fn send_two_factor_code(&self, email: &str, code: &str) -> Result<(), MailerError>;
}
