//! Adapters for the domain `Mailer` port.
//!
//! The tracing adapter logs rendered mails and is the default everywhere a
//! real SMTP relay is not configured; the lettre-backed adapter lives behind
//! the `smtp` feature.

#[cfg(feature = "smtp")]
mod smtp_mailer;
mod templates;
mod tracing_mailer;

#[cfg(feature = "smtp")]
pub use smtp_mailer::{SmtpConfig, SmtpMailer};
pub use tracing_mailer::TracingMailer;
