//! Connection upgrade negotiation.
//!
//! Validates the header set a client sends to move a connection from
//! request/response mode to a duplex frame protocol, and computes the accept
//! token the server would echo back. The framing side does not exist yet, so
//! nothing here switches a connection over.

mod crypto;
mod error;
mod handshake;

pub use crypto::{base64_encode, sha1};
pub use error::Error;
pub use handshake::{accept_key, UpgradeHandshake, SUPPORTED_VERSION};
