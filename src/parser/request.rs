//! Request representation and parsing.

use std::collections::{HashMap, HashSet};

use crate::parser::error::Error;
use crate::parser::method::Method;

/// Marker separating the header block from the body.
const HEADER_TERMINATOR: &str = "\r\n\r\n";

/// A parsed request.
///
/// Built once per connection by [`parse_request`] and handed to exactly one
/// handler.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The request method. Unknown tokens are read as GET.
    pub method: Method,
    /// The request path, verbatim from the request line
    pub path: String,
    /// Header name to value, names as sent
    pub headers: HashMap<String, String>,
    /// Everything after the blank line
    pub body: String,
    /// The full decoded request text
    pub raw: String,
}

impl HttpRequest {
    /// Get a header value, matching the name case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Check if a header exists.
    ///
    /// Not used by the built-in endpoints; offered to handlers registered
    /// through [`HandlerRegistry`](crate::server::HandlerRegistry).
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }
}

/// Parse a request from its decoded text.
///
/// The request line is the text up to the first line break, split on single
/// spaces: the first token is the method, the second the path. Headers run
/// until the first blank line and are split on their first space. The body is
/// whatever follows the blank line.
///
/// # Errors
///
/// Fails when the text is empty, has no line break, has no blank line, lacks
/// a path, or carries a header line without a space or a repeated header name.
pub fn parse_request(input: &str) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let line_end = input
        .find('\n')
        .ok_or_else(|| Error::MalformedRequestLine(input.to_string()))?;
    let separator = input
        .find(HEADER_TERMINATOR)
        .ok_or(Error::MissingHeaderTerminator)?;

    let request_line = input[..line_end].trim_end_matches('\r');
    let mut tokens = request_line.split(' ');
    let method = Method::from(tokens.next().unwrap_or_default());
    let path = tokens
        .next()
        .filter(|path| !path.is_empty())
        .ok_or(Error::MissingPath)?
        .to_string();

    // With no headers the terminator starts on the request line itself.
    let header_block = if separator > line_end {
        &input[line_end + 1..separator]
    } else {
        ""
    };
    let headers = parse_headers(header_block)?;

    let body = input[separator + HEADER_TERMINATOR.len()..].to_string();

    Ok(HttpRequest {
        method,
        path,
        headers,
        body,
        raw: input.to_string(),
    })
}

fn parse_headers(block: &str) -> Result<HashMap<String, String>, Error> {
    let mut headers = HashMap::new();
    // Names compare case-insensitively, so `Host` and `host` are one header.
    let mut seen = HashSet::new();
    for line in block.lines() {
        let (name, value) = line
            .split_once(' ')
            .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))?;
        let name = name.trim_end_matches(':');

        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(Error::DuplicateHeader(name.to_string()));
        }
        headers.insert(name.to_string(), value.trim().to_string());
    }
    Ok(headers)
}
