//! Marketplace backend library.
//!
//! Hexagonal layout: `domain` holds the entities, services, and ports;
//! `inbound` and `outbound` hold the HTTP and persistence/mail adapters;
//! `server` wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
