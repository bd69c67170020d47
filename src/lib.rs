//! A minimal request/response engine over raw TCP streams.
//!
//! Each connection carries one request. The engine reads the request text,
//! parses method, path, headers and body, checks the (method, path) pair
//! against a static route table, builds the handler registered for the path
//! and writes its response as plain text before closing the connection.
//!
//! Two endpoints are built in: `/` acknowledges with `200 OK`, and `/socket`
//! validates a protocol-upgrade request without completing it.
//!
//! # Examples
//!
//! ## Parsing
//!
//! ```
//! use rawhttp::{parse_request, Method};
//!
//! let request = parse_request("GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
//! assert_eq!(request.method, Method::GET);
//! assert_eq!(request.path, "/");
//! assert_eq!(request.headers.get("Host").unwrap(), "localhost");
//! ```
//!
//! ## Routing
//!
//! ```
//! use rawhttp::{Method, RouteTable};
//!
//! let routes = RouteTable::default();
//! assert!(routes.verify(Method::GET, "/socket"));
//! assert!(!routes.verify(Method::POST, "/socket"));
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use rawhttp::{HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), rawhttp::ServerError> {
//! let server = HttpServer::new(ServerConfig::default());
//! server.start().await
//! # }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Export the upgrade module
pub mod upgrade;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{
    Error as ServerError, EndpointHandler, HandlerRegistry, HttpResponse, HttpServer, RouteEntry, RouteTable,
    ServerConfig, StatusCode,
};
pub use upgrade::{Error as UpgradeError, UpgradeHandshake};
