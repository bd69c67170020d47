//! Request/response server.
//!
//! Accepts TCP connections and runs each through read, parse, route check,
//! handler dispatch and response write.

mod config;
mod endpoints;
mod error;
mod handler;
mod http_server;
mod reader;
mod response;
mod routes;
mod tests;

// Re-export public items
pub use config::ServerConfig;
pub use endpoints::{DefaultHandler, SocketHandler, ACKNOWLEDGEMENT};
pub use error::Error;
pub use handler::{Connection, EndpointHandler, HandlerConstructor, HandlerFuture, HandlerRegistry};
pub use http_server::HttpServer;
pub use reader::read_request;
pub use response::{write_response, HttpResponse, StatusCode, CONTENT_TYPE};
pub use routes::{RouteEntry, RouteTable};
