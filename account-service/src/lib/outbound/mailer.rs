use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::account::errors::MailerError;
use crate::account::ports::Mailer;
use crate::config::Config;

/// SMTP implementation of the notification port.
///
/// Link-carrying messages point at the configured frontend base URL.
/// Callers treat delivery as fire-and-forget; errors surface only so the
/// service can log them.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    base_url: String,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        tracing::info!(
            host = %config.mail.host,
            from = %config.mail.from,
            "Initializing SMTP mailer"
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.mail.host)?
            .credentials(Credentials::new(
                config.mail.username.clone(),
                config.mail.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.mail.from.clone(),
            base_url: config.mail.base_url.clone(),
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e: lettre::address::AddressError| {
                        MailerError::InvalidAddress(e.to_string())
                    })?,
            )
            .to(to.parse().map_err(|e: lettre::address::AddressError| {
                MailerError::InvalidAddress(e.to_string())
            })?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| MailerError::BuildFailed(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::error!("Failed to send mail to {}: {}", to, e);
                MailerError::SendFailed(e.to_string())
            })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailerError> {
        let link = format!("{}/auth/new-verification?token={}", self.base_url, token);

        self.send(
            email,
            "Confirm your email",
            format!(r#"<div><a href="{link}">Verify Email</a></div>"#),
        )
        .await
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailerError> {
        let link = format!("{}/auth/new-password?token={}", self.base_url, token);

        self.send(
            email,
            "Reset your password",
            format!(r#"<p>Click <a href="{link}">here</a> to reset password.</p>"#),
        )
        .await
    }

    async fn send_email_change(&self, new_email: &str, token: &str) -> Result<(), MailerError> {
        let link = format!("{}/auth/new-email?token={}", self.base_url, token);

        self.send(
            new_email,
            "Confirm your email",
            format!(r#"<div><a href="{link}">Verify Email</a></div>"#),
        )
        .await
    }

    async fn send_two_factor_code(&self, email: &str, code: &str) -> Result<(), MailerError> {
        self.send(email, "2FA Code", format!("<p>Your 2FA code: {code}</p>"))
            .await
    }
}
