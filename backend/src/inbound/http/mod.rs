//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod base_info;
pub mod error;
pub mod identity;
pub mod offers;
pub mod orders;
pub mod profiles;
pub mod reviews;
pub mod routes;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
