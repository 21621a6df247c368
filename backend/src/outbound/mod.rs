//! Driven adapters: implementations of the domain's outbound ports.

pub mod mailer;
pub mod persistence;
