//! HTTP inbound adapter exposing the order lifecycle as REST endpoints.

pub mod error;
pub mod health;
pub mod orders;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
