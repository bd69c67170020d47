//! Upgrade request validation.

use crate::parser::HttpRequest;
use crate::upgrade::crypto::{base64_encode, sha1};
use crate::upgrade::error::Error;

/// GUID appended to the client key before hashing (RFC 6455).
const ACCEPT_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// The only protocol version accepted.
pub const SUPPORTED_VERSION: &str = "13";

/// A validated upgrade request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeHandshake {
    /// The client's `Sec-WebSocket-Key`
    pub client_key: String,
    /// The token the server answers with in `Sec-WebSocket-Accept`
    pub accept_key: String,
}

impl UpgradeHandshake {
    /// Check the upgrade headers of `request` and derive the accept token.
    pub fn validate(request: &HttpRequest) -> Result<Self, Error> {
        let upgrade = required(request, "Upgrade")?;
        if !upgrade.eq_ignore_ascii_case("websocket") {
            return Err(Error::InvalidHeader { name: "Upgrade", value: upgrade.clone() });
        }

        let connection = required(request, "Connection")?;
        if !connection.to_ascii_lowercase().contains("upgrade") {
            return Err(Error::InvalidHeader { name: "Connection", value: connection.clone() });
        }

        let version = required(request, "Sec-WebSocket-Version")?;
        if version != SUPPORTED_VERSION {
            return Err(Error::InvalidHeader { name: "Sec-WebSocket-Version", value: version.clone() });
        }

        let client_key = required(request, "Sec-WebSocket-Key")?;
        if client_key.is_empty() {
            return Err(Error::MissingHeader("Sec-WebSocket-Key"));
        }

        Ok(Self {
            accept_key: accept_key(client_key),
            client_key: client_key.clone(),
        })
    }
}

fn required<'a>(request: &'a HttpRequest, name: &'static str) -> Result<&'a String, Error> {
    request.get_header(name).ok_or(Error::MissingHeader(name))
}

/// Compute the accept token for a client key.
pub fn accept_key(client_key: &str) -> String {
    let mut input = String::with_capacity(client_key.len() + ACCEPT_GUID.len());
    input.push_str(client_key);
    input.push_str(ACCEPT_GUID);

    base64_encode(&sha1(input.as_bytes()))
}
