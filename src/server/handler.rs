//! Endpoint handlers and dispatch by path.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::parser::HttpRequest;
use crate::server::endpoints::{DefaultHandler, SocketHandler};
use crate::server::error::Error;
use crate::server::response::HttpResponse;

/// A byte stream a handler may take over, e.g. for a protocol upgrade.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Connection for T {}

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send + 'a>>;

/// The one capability every endpoint shares: turn its request into a response.
///
/// A handler is built for a single request and sees the connection it arrived
/// on, so variants that leave request/response mode can take the stream over.
pub trait EndpointHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Process the request this handler was built for.
    fn handle<'a>(&'a self, connection: &'a mut dyn Connection) -> HandlerFuture<'a>;
}

/// Builds the handler for one request.
pub type HandlerConstructor = fn(HttpRequest) -> Box<dyn EndpointHandler>;

/// Path to handler constructor lookup.
///
/// Adding an endpoint means registering one constructor here and one route in
/// the route table.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerConstructor>,
}

impl HandlerRegistry {
    /// A registry with no handlers.
    pub fn empty() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Register `constructor` for `path`, replacing any previous one.
    pub fn register(&mut self, path: impl Into<String>, constructor: HandlerConstructor) -> &mut Self {
        self.handlers.insert(path.into(), constructor);
        self
    }

    /// Build the handler registered for the request's path.
    ///
    /// # Errors
    ///
    /// [`Error::UndefinedRoute`] when nothing is registered for the path.
    pub fn create(&self, request: HttpRequest) -> Result<Box<dyn EndpointHandler>, Error> {
        match self.handlers.get(&request.path) {
            Some(constructor) => Ok(constructor(request)),
            None => Err(Error::UndefinedRoute(request.path)),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.handlers.contains_key(path)
    }
}

impl Default for HandlerRegistry {
    /// `/` answers with [`DefaultHandler`], `/socket` with [`SocketHandler`].
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("/", DefaultHandler::boxed)
            .register("/socket", SocketHandler::boxed);
        registry
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&String> = self.handlers.keys().collect();
        paths.sort();
        f.debug_struct("HandlerRegistry").field("paths", &paths).finish()
    }
}
