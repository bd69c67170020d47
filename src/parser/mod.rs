//! Request parsing.
//!
//! Turns the decoded text of a request message into an [`HttpRequest`]:
//! request line, header block and body.

mod request;
mod method;
mod version;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

// Re-export the parse_request function
pub use request::parse_request;
