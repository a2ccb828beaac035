use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::LoginOutcome;
use crate::account::models::Password;
use crate::account::models::RegisterCommand;
use crate::account::models::Role;
use crate::account::models::SettingsOutcome;
use crate::account::models::TokenPurpose;
use crate::account::models::TokenSubject;
use crate::account::models::UpdateSettingsCommand;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::ports::AccountServicePort;
use crate::account::ports::Mailer;
use crate::account::ports::TokenRepository;
use crate::account::ports::TwoFactorRepository;
use crate::account::ports::UserRepository;
use crate::account::session::SessionManager;
use crate::account::tokens::TokenIssuer;

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<UR, TR, FR, M>
where
    UR: UserRepository,
    TR: TokenRepository,
    FR: TwoFactorRepository,
    M: Mailer,
{
    users: Arc<UR>,
    two_factor: Arc<FR>,
    mailer: Arc<M>,
    tokens: TokenIssuer<TR>,
    sessions: Arc<SessionManager>,
    password_hasher: auth::PasswordHasher,
}

impl<UR, TR, FR, M> AccountService<UR, TR, FR, M>
where
    UR: UserRepository,
    TR: TokenRepository,
    FR: TwoFactorRepository,
    M: Mailer,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - Account persistence implementation
    /// * `tokens` - Verification token persistence implementation
    /// * `two_factor` - Two-factor confirmation persistence implementation
    /// * `mailer` - Outbound notification implementation
    /// * `sessions` - Session credential manager (shared with the guard)
    pub fn new(
        users: Arc<UR>,
        tokens: Arc<TR>,
        two_factor: Arc<FR>,
        mailer: Arc<M>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            users,
            two_factor,
            mailer,
            tokens: TokenIssuer::new(tokens),
            sessions,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    /// Issue a fresh verification token for `email` and notify it.
    async fn send_email_verification(&self, email: &EmailAddress) -> Result<(), AccountError> {
        let token = self
            .tokens
            .issue(TokenPurpose::EmailVerify, TokenSubject::Email(email.clone()))
            .await?;

        if let Err(e) = self
            .mailer
            .send_verification(email.as_str(), &token.value)
            .await
        {
            tracing::error!(
                "Failed to send verification email to {}: {}",
                email.as_str(),
                e
            );
        }

        Ok(())
    }

    async fn user_by_email(&self, email: &EmailAddress) -> Result<User, AccountError> {
        self.users
            .find_by_email(email.as_str())
            .await?
            .ok_or_else(|| AccountError::NotFound(email.as_str().to_string()))
    }
}

#[async_trait]
impl<UR, TR, FR, M> AccountServicePort for AccountService<UR, TR, FR, M>
where
    UR: UserRepository,
    TR: TokenRepository,
    FR: TwoFactorRepository,
    M: Mailer,
{
    async fn register(&self, command: RegisterCommand) -> Result<(), AccountError> {
        if self
            .users
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(AccountError::EmailTaken(command.email.as_str().to_string()));
        }

        let password_hash = self.password_hasher.hash(command.password.as_str())?;

        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            role: Role::User,
            email_verified: None,
            is_two_factor_enabled: false,
        };

        let user = self.users.create(user).await?;

        self.send_email_verification(&user.email).await?;

        Ok(())
    }

    async fn verify_email(&self, token_value: &str) -> Result<(), AccountError> {
        let subject = self
            .tokens
            .consume(TokenPurpose::EmailVerify, token_value)
            .await?;

        let email = match subject {
            TokenSubject::Email(email) => email,
            // issue() never stores a pair subject under this purpose
            TokenSubject::EmailChange { .. } => return Err(AccountError::TokenNotFound),
        };

        let mut user = self.user_by_email(&email).await?;
        user.email_verified = Some(Utc::now());
        self.users.update(user).await?;

        Ok(())
    }

    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AccountError> {
        let user = self.user_by_email(&command.email).await?;

        // The gates fire in a fixed order: verification, two-factor,
        // password. An unverified account never reaches the password
        // check; it gets a fresh verification token instead.
        if user.email_verified.is_none() {
            self.send_email_verification(&user.email).await?;
            return Ok(LoginOutcome::VerificationPending);
        }

        if user.is_two_factor_enabled {
            match &command.code {
                None => {
                    let token = self
                        .tokens
                        .issue(
                            TokenPurpose::TwoFactor,
                            TokenSubject::Email(user.email.clone()),
                        )
                        .await?;

                    if let Err(e) = self
                        .mailer
                        .send_two_factor_code(user.email.as_str(), &token.value)
                        .await
                    {
                        tracing::error!(
                            "Failed to send two-factor code to {}: {}",
                            user.email.as_str(),
                            e
                        );
                    }

                    return Ok(LoginOutcome::TwoFactorRequired);
                }
                Some(code) => {
                    let subject = self.tokens.consume(TokenPurpose::TwoFactor, code).await?;

                    // A code minted for some other account must not clear
                    // this one's gate.
                    if subject != TokenSubject::Email(user.email.clone()) {
                        return Err(AccountError::TokenNotFound);
                    }

                    self.two_factor.replace_for_user(&user.id).await?;
                }
            }
        }

        let matches = self
            .password_hasher
            .verify(&command.password, &user.password_hash)?;

        if !matches {
            return Err(AccountError::Unauthorized);
        }

        let pair = self.sessions.create_session(&user.id)?;

        Ok(LoginOutcome::LoggedIn(pair))
    }

    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AccountError> {
        let user = self.user_by_email(email).await?;

        let token = self
            .tokens
            .issue(
                TokenPurpose::PasswordReset,
                TokenSubject::Email(user.email.clone()),
            )
            .await?;

        if let Err(e) = self
            .mailer
            .send_password_reset(user.email.as_str(), &token.value)
            .await
        {
            tracing::error!(
                "Failed to send password reset email to {}: {}",
                user.email.as_str(),
                e
            );
        }

        Ok(())
    }

    async fn reset_password(
        &self,
        token_value: &str,
        new_password: Password,
    ) -> Result<(), AccountError> {
        let subject = self
            .tokens
            .consume(TokenPurpose::PasswordReset, token_value)
            .await?;

        let email = match subject {
            TokenSubject::Email(email) => email,
            TokenSubject::EmailChange { .. } => return Err(AccountError::TokenNotFound),
        };

        let mut user = self.user_by_email(&email).await?;
        user.password_hash = self.password_hasher.hash(new_password.as_str())?;
        self.users.update(user).await?;

        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<User, AccountError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn update_settings(
        &self,
        user: &User,
        command: UpdateSettingsCommand,
    ) -> Result<SettingsOutcome, AccountError> {
        // The email branch is exclusive: nothing else in the command is
        // applied until the new address confirms.
        if let Some(new_email) = &command.email {
            if *new_email != user.email {
                if let Some(owner) = self.users.find_by_email(new_email.as_str()).await? {
                    if owner.id != user.id {
                        return Err(AccountError::EmailTaken(new_email.as_str().to_string()));
                    }
                }

                let token = self
                    .tokens
                    .issue(
                        TokenPurpose::EmailChange,
                        TokenSubject::EmailChange {
                            old_email: user.email.clone(),
                            new_email: new_email.clone(),
                        },
                    )
                    .await?;

                if let Err(e) = self
                    .mailer
                    .send_email_change(new_email.as_str(), &token.value)
                    .await
                {
                    tracing::error!(
                        "Failed to send email change confirmation to {}: {}",
                        new_email.as_str(),
                        e
                    );
                }

                return Ok(SettingsOutcome::EmailChangePending);
            }
        }

        let mut updated = user.clone();

        if let (Some(current), Some(new_password)) = (&command.password, &command.new_password) {
            let matches = self
                .password_hasher
                .verify(current, &user.password_hash)?;

            if !matches {
                return Err(AccountError::Unauthorized);
            }

            updated.password_hash = self.password_hasher.hash(new_password.as_str())?;
        }

        if let Some(name) = command.name {
            updated.name = name;
        }
        if let Some(role) = command.role {
            updated.role = role;
        }
        if let Some(enabled) = command.is_two_factor_enabled {
            updated.is_two_factor_enabled = enabled;
        }

        let updated = self.users.update(updated).await?;

        Ok(SettingsOutcome::Updated(updated))
    }

    async fn confirm_email_change(
        &self,
        user: &User,
        token_value: &str,
    ) -> Result<User, AccountError> {
        let subject = self
            .tokens
            .consume(TokenPurpose::EmailChange, token_value)
            .await?;

        let (old_email, new_email) = match subject {
            TokenSubject::EmailChange {
                old_email,
                new_email,
            } => (old_email, new_email),
            TokenSubject::Email(_) => return Err(AccountError::TokenNotFound),
        };

        // The token must have been minted for this account's current
        // address.
        if user.email != old_email {
            return Err(AccountError::NotFound(old_email.as_str().to_string()));
        }

        let mut updated = user.clone();
        updated.email = new_email;
        updated.email_verified = Some(Utc::now());

        self.users.update(updated).await
    }
}
