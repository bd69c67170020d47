//! Request methods.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The request methods this engine distinguishes.
///
/// Parsing never fails: any token outside this set is read as [`Method::GET`].
/// Configuration files are stricter and only accept the names listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    GET,
    POST,
    PUT,
    PATCH,
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        match token {
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "PATCH" => Method::PATCH,
            // GET, and the fallback for everything unrecognized
            _ => Method::GET,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
