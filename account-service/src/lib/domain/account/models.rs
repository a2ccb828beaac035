use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::DisplayNameError;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::RoleError;
use crate::account::errors::SettingsError;
use crate::account::errors::UserIdError;

/// Account aggregate entity.
///
/// Mutated by registration, email-change confirmation, settings updates,
/// and password reset.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub role: Role,
    pub email_verified: Option<DateTime<Utc>>,
    pub is_two_factor_enabled: bool,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Requires at least 2 characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 2;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `TooShort` - Name shorter than 2 characters after trimming
    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();

        if length < Self::MIN_LENGTH {
            return Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Policy-checked plaintext password.
///
/// 8-20 characters with at least one letter, one digit, and one symbol.
/// Carries the plaintext only until the service hashes it; the debug
/// representation is redacted.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 20;

    /// Create a new policy-conforming password.
    ///
    /// # Errors
    /// * `TooShort` / `TooLong` - Length outside 8-20 characters
    /// * `MissingLetter` / `MissingDigit` / `MissingSymbol` - Required
    ///   character class absent
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();

        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(PasswordPolicyError::MissingLetter);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PasswordPolicyError::MissingSymbol);
        }

        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(redacted)")
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification token unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(pub Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The four purposes a verification token can be minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    EmailVerify,
    PasswordReset,
    EmailChange,
    TwoFactor,
}

impl TokenPurpose {
    /// Token lifetime: 5 minutes for two-factor codes, 10 for link tokens.
    pub fn ttl(&self) -> Duration {
        match self {
            TokenPurpose::TwoFactor => Duration::minutes(5),
            _ => Duration::minutes(10),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerify => "email_verify",
            TokenPurpose::PasswordReset => "password_reset",
            TokenPurpose::EmailChange => "email_change",
            TokenPurpose::TwoFactor => "two_factor",
        }
    }
}

impl FromStr for TokenPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verify" => Ok(TokenPurpose::EmailVerify),
            "password_reset" => Ok(TokenPurpose::PasswordReset),
            "email_change" => Ok(TokenPurpose::EmailChange),
            "two_factor" => Ok(TokenPurpose::TwoFactor),
            other => Err(format!("Unknown token purpose: {}", other)),
        }
    }
}

/// The subject a verification token is scoped to.
///
/// Most purposes are keyed by a single email; an email change is keyed by
/// the old/new pair so a new request for either address supersedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSubject {
    Email(EmailAddress),
    EmailChange {
        old_email: EmailAddress,
        new_email: EmailAddress,
    },
}

impl TokenSubject {
    /// Canonical key backing the store's `(purpose, subject)` uniqueness
    /// constraint.
    pub fn key(&self) -> String {
        match self {
            TokenSubject::Email(email) => email.as_str().to_string(),
            TokenSubject::EmailChange {
                old_email,
                new_email,
            } => format!("{}->{}", old_email.as_str(), new_email.as_str()),
        }
    }
}

/// Single-use verification token.
///
/// At most one live token exists per `(purpose, subject)`; issuing a new
/// one supersedes the old. Consumed (validated and deleted) exactly once.
#[derive(Debug, Clone)]
pub struct VerificationToken {
    pub id: TokenId,
    pub purpose: TokenPurpose,
    pub subject: TokenSubject,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Marker that a user passed the second factor during a login.
///
/// Superseded (deleted then recreated) on each successful two-factor
/// login. `user_id` is a plain foreign key, not an ownership link.
#[derive(Debug, Clone)]
pub struct TwoFactorConfirmation {
    pub id: Uuid,
    pub user_id: UserId,
}

/// A signed session credential and its expiry, ready for the transport
/// layer to emit.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Independently signed and independently expiring credential pair.
#[derive(Debug, Clone)]
pub struct SessionPair {
    pub access: Credential,
    pub refresh: Credential,
}

/// Command to register a new account with validated fields.
#[derive(Debug)]
pub struct RegisterCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterCommand {
    pub fn new(name: DisplayName, email: EmailAddress, password: Password) -> Self {
        Self {
            name,
            email,
            password,
        }
    }
}

/// A login attempt: the raw password plus the optional second-factor code.
///
/// The password is only ever compared against the stored hash, so it is
/// not policy-checked here.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: String,
    pub code: Option<String>,
}

/// Partial settings update with optional validated fields.
///
/// Only provided fields are applied. A password change needs the current
/// password and the new one together; the constructor rejects one without
/// the other.
#[derive(Debug)]
pub struct UpdateSettingsCommand {
    pub name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    pub password: Option<String>,
    pub new_password: Option<Password>,
    pub role: Option<Role>,
    pub is_two_factor_enabled: Option<bool>,
}

impl UpdateSettingsCommand {
    /// # Errors
    /// * `IncompletePasswordPair` - `password` and `new_password` were not
    ///   supplied together
    pub fn new(
        name: Option<DisplayName>,
        email: Option<EmailAddress>,
        password: Option<String>,
        new_password: Option<Password>,
        role: Option<Role>,
        is_two_factor_enabled: Option<bool>,
    ) -> Result<Self, SettingsError> {
        if password.is_some() != new_password.is_some() {
            return Err(SettingsError::IncompletePasswordPair);
        }

        Ok(Self {
            name,
            email,
            password,
            new_password,
            role,
            is_two_factor_enabled,
        })
    }
}

/// Outcome of a login attempt.
///
/// The two intermediate variants are distinguished outcomes, not errors:
/// each means a fresh token was issued and a notification sent.
#[derive(Debug)]
pub enum LoginOutcome {
    /// The account's email is unverified; a verification link was re-sent.
    VerificationPending,
    /// Two-factor is enabled and no code was supplied; a code was sent.
    TwoFactorRequired,
    /// Credentials (and code, when required) checked out.
    LoggedIn(SessionPair),
}

/// Outcome of a settings update.
#[derive(Debug)]
pub enum SettingsOutcome {
    Updated(User),
    /// An email change was requested; nothing is applied until the new
    /// address confirms.
    EmailChangePending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_trims_and_validates() {
        let name = DisplayName::new("  Jane  ".to_string()).unwrap();
        assert_eq!(name.as_str(), "Jane");

        assert!(matches!(
            DisplayName::new(" J ".to_string()),
            Err(DisplayNameError::TooShort { min: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_password_policy() {
        assert!(Password::new("Aa1!aaaa".to_string()).is_ok());

        assert!(matches!(
            Password::new("Aa1!aaa".to_string()),
            Err(PasswordPolicyError::TooShort { .. })
        ));
        assert!(matches!(
            Password::new("Aa1!aaaaaaaaaaaaaaaaa".to_string()),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert!(matches!(
            Password::new("12345678!".to_string()),
            Err(PasswordPolicyError::MissingLetter)
        ));
        assert!(matches!(
            Password::new("abcdefgh!".to_string()),
            Err(PasswordPolicyError::MissingDigit)
        ));
        assert!(matches!(
            Password::new("abcdefg1".to_string()),
            Err(PasswordPolicyError::MissingSymbol)
        ));
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_token_purpose_ttl() {
        assert_eq!(TokenPurpose::EmailVerify.ttl(), Duration::minutes(10));
        assert_eq!(TokenPurpose::PasswordReset.ttl(), Duration::minutes(10));
        assert_eq!(TokenPurpose::EmailChange.ttl(), Duration::minutes(10));
        assert_eq!(TokenPurpose::TwoFactor.ttl(), Duration::minutes(5));
    }

    #[test]
    fn test_token_subject_key() {
        let old = EmailAddress::new("old@example.com".to_string()).unwrap();
        let new = EmailAddress::new("new@example.com".to_string()).unwrap();

        assert_eq!(TokenSubject::Email(old.clone()).key(), "old@example.com");
        assert_eq!(
            TokenSubject::EmailChange {
                old_email: old,
                new_email: new,
            }
            .key(),
            "old@example.com->new@example.com"
        );
    }

    #[test]
    fn test_settings_command_requires_password_pair() {
        assert!(matches!(
            UpdateSettingsCommand::new(
                None,
                None,
                Some("current".to_string()),
                None,
                None,
                None
            ),
            Err(SettingsError::IncompletePasswordPair)
        ));

        assert!(matches!(
            UpdateSettingsCommand::new(
                None,
                None,
                None,
                Some(Password::new("Aa1!aaaa".to_string()).unwrap()),
                None,
                None
            ),
            Err(SettingsError::IncompletePasswordPair)
        ));

        assert!(UpdateSettingsCommand::new(None, None, None, None, None, Some(true)).is_ok());
    }
}
