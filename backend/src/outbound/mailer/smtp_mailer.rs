//! SMTP mailer adapter backed by lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::ports::{Mailer, MailerError};

use super::templates;

/// Relay settings for the SMTP transport.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// RFC 5322 mailbox used as the From header, e.g. `"Marketplace <noreply@example.com>"`.
    pub from: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a TLS transport for the configured relay.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| MailerError::transport(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        let from = config
            .from
            .parse()
            .map_err(|_| MailerError::composition("invalid From mailbox"))?;
        Ok(Self { transport, from })
    }

    async fn send(&self, recipient: &str, subject: &str, body: String) -> Result<(), MailerError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| MailerError::composition("invalid recipient mailbox"))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body)
            .map_err(|e| MailerError::composition(e.to_string()))?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::transport(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_activation(
        &self,
        recipient: &str,
        username: &str,
        activation_url: &str,
    ) -> Result<(), MailerError> {
        self.send(
            recipient,
            templates::ACTIVATION_SUBJECT,
            templates::activation_body(username, activation_url),
        )
        .await
    }

    async fn send_password_reset(
        &self,
        recipient: &str,
        username: &str,
        reset_url: &str,
    ) -> Result<(), MailerError> {
        self.send(
            recipient,
            templates::RESET_SUBJECT,
            templates::reset_body(username, reset_url),
        )
        .await
    }
}
