//! Port abstraction for outbound transactional email.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Delivery errors raised by mailer adapters.
    pub enum MailerError {
        /// The message could not be handed to the transport.
        Transport { message: String } => "mail transport failed: {message}",
        /// The message could not be composed.
        Composition { message: String } => "mail composition failed: {message}",
    }
}

/// Sends the two transactional mails the platform produces. Both sends are
/// fire-and-forget from the caller's perspective; failures are logged, never
/// surfaced to the triggering request.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_activation(
        &self,
        recipient: &str,
        username: &str,
        activation_url: &str,
    ) -> Result<(), MailerError>;

    async fn send_password_reset(
        &self,
        recipient: &str,
        username: &str,
        reset_url: &str,
    ) -> Result<(), MailerError>;
}
