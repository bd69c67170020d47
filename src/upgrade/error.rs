//! Error types for upgrade negotiation.

use thiserror::Error;

/// Reasons an upgrade request is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A header the upgrade requires is absent.
    #[error("Missing upgrade header: {0}")]
    MissingHeader(&'static str),

    /// A required header is present with an unacceptable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidHeader { name: &'static str, value: String },
}
