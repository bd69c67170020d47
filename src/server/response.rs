//! Response types and the response writer.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::parser::HttpVersion;
use crate::server::error::Error;

/// The only content type this server writes.
pub const CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

/// Status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    NotFound = 404,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Status line text, e.g. `HTTP/1.0 200 OK`.
    pub fn status_line(&self, version: HttpVersion) -> String {
        format!("{version} {} {}", *self as u16, self.reason_phrase())
    }
}

/// A response: a full status line and a text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The status line, e.g. `HTTP/1.1 404 Not Found`
    pub status: String,
    /// The response body
    pub body: String,
}

impl HttpResponse {
    /// Create a response with an empty body.
    pub fn new(version: HttpVersion, status: StatusCode) -> Self {
        Self {
            status: status.status_line(version),
            body: String::new(),
        }
    }

    /// Set the response body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// `HTTP/1.1 404 Not Found` with an empty body.
    pub fn not_found() -> Self {
        Self::new(HttpVersion::Http11, StatusCode::NotFound)
    }

    /// `HTTP/1.1 500 Internal Server Error` carrying `message` as its body.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(HttpVersion::Http11, StatusCode::InternalServerError).with_body(message)
    }

    /// `HTTP/1.1 503 Service Unavailable` with an empty body.
    pub fn service_unavailable() -> Self {
        Self::new(HttpVersion::Http11, StatusCode::ServiceUnavailable)
    }

    /// Convert the response to its wire bytes.
    ///
    /// Status line, `Content-Type`, `Content-Length` (the body's byte length),
    /// a blank line, then the body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "{status}\r\nContent-Type: {CONTENT_TYPE}\r\nContent-Length: {len}\r\n\r\n",
            status = self.status,
            len = self.body.len(),
        );

        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

/// Write `response` to `stream` and flush it.
pub async fn write_response<W>(stream: &mut W, response: &HttpResponse) -> Result<(), Error>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    Ok(())
}
