//! Mailer adapter that logs rendered mails instead of sending them.
//!
//! The default in development and tests: every mail is emitted as a single
//! structured log record, so activation and reset links can be copied from
//! the console.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Mailer, MailerError};

use super::templates;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_activation(
        &self,
        recipient: &str,
        username: &str,
        activation_url: &str,
    ) -> Result<(), MailerError> {
        info!(
            recipient,
            subject = templates::ACTIVATION_SUBJECT,
            body = %templates::activation_body(username, activation_url),
            "mail rendered (console delivery)"
        );
        Ok(())
    }

    async fn send_password_reset(
        &self,
        recipient: &str,
        username: &str,
        reset_url: &str,
    ) -> Result<(), MailerError> {
        info!(
            recipient,
            subject = templates::RESET_SUBJECT,
            body = %templates::reset_body(username, reset_url),
            "mail rendered (console delivery)"
        );
        Ok(())
    }
}
