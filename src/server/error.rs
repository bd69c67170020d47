//! Error types for the server.

use thiserror::Error;

use crate::parser::Error as ParserError;
use crate::upgrade::Error as UpgradeError;

/// Errors that can occur while serving a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be parsed.
    #[error("Malformed request: {0}")]
    MalformedRequest(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The request grew past the configured limit before its headers ended.
    #[error("Request exceeds {0} bytes")]
    RequestTooLarge(usize),

    /// No handler is registered for a path the route table accepted.
    #[error("Undefined route: {0}")]
    UndefinedRoute(String),

    /// A handler failed while processing a request.
    ///
    /// The built-in endpoints fail with more specific variants; this one is
    /// for handlers registered by users of the crate, whose message becomes
    /// the 500 body verbatim.
    #[error("{0}")]
    HandlerFailure(String),

    /// The client's upgrade request was refused.
    #[error("{0}")]
    Upgrade(#[from] UpgradeError),

    /// The upgrade was negotiated but no duplex protocol can take the connection.
    #[error("Socket upgrade is not implemented")]
    UpgradeNotImplemented,

    /// The server configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON configuration could not be read.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
