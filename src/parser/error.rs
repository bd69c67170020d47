//! Error types for the request parser.
//!
//! Every variant is a flavour of malformed request. The connection loop logs
//! them and drops the connection without writing a response.

use thiserror::Error;

/// Errors that can occur during request parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The request is empty.
    #[error("Empty request")]
    EmptyRequest,

    /// The request bytes are not valid UTF-8.
    #[error("Request is not valid UTF-8")]
    InvalidUtf8,

    /// No line break terminates the request line.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The request line carries no path token.
    #[error("Missing request path")]
    MissingPath,

    /// No blank line separates the header block from the body.
    #[error("Missing blank line after headers")]
    MissingHeaderTerminator,

    /// A header line has no space between name and value.
    #[error("Invalid header line: {0}")]
    InvalidHeaderFormat(String),

    /// The same header name appears more than once.
    #[error("Duplicate header: {0}")]
    DuplicateHeader(String),
}
