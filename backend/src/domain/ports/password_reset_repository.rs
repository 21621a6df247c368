//! Port abstraction for outstanding password-reset tokens.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by password-reset repository adapters.
    pub enum PasswordResetPersistenceError {
        Connection { message: String } => "password reset repository connection failed: {message}",
        Query { message: String } => "password reset repository query failed: {message}",
    }
}

/// An outstanding reset token bound to the email it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub email: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Record a fresh reset token for `email`, discarding any rows already
    /// outstanding for that address.
    async fn replace_for_email(
        &self,
        email: &str,
        token: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), PasswordResetPersistenceError>;

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordReset>, PasswordResetPersistenceError>;

    /// Remove a consumed or invalidated token.
    async fn delete(&self, token: &str) -> Result<(), PasswordResetPersistenceError>;
}
