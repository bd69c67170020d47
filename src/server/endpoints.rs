//! The built-in endpoints.

use log::debug;

use crate::parser::{HttpRequest, HttpVersion};
use crate::server::error::Error;
use crate::server::handler::{Connection, EndpointHandler, HandlerFuture};
use crate::server::response::{HttpResponse, StatusCode};
use crate::upgrade::UpgradeHandshake;

/// Body of the acknowledgement written by [`DefaultHandler`].
pub const ACKNOWLEDGEMENT: &str = "200 OK";

/// Acknowledges the request with `HTTP/1.0 200 OK`.
#[derive(Debug)]
pub struct DefaultHandler {
    request: HttpRequest,
}

impl DefaultHandler {
    pub fn new(request: HttpRequest) -> Self {
        Self { request }
    }

    pub fn boxed(request: HttpRequest) -> Box<dyn EndpointHandler> {
        Box::new(Self::new(request))
    }
}

impl EndpointHandler for DefaultHandler {
    fn name(&self) -> &'static str {
        "default"
    }

    fn handle<'a>(&'a self, _connection: &'a mut dyn Connection) -> HandlerFuture<'a> {
        Box::pin(async move {
            debug!("Acknowledging {} {}", self.request.method, self.request.path);
            Ok(HttpResponse::new(HttpVersion::Http10, StatusCode::Ok).with_body(ACKNOWLEDGEMENT))
        })
    }
}

/// Entry point for moving a connection to a duplex protocol.
///
/// Validates the upgrade headers and derives the accept token, then stops:
/// there is no frame protocol to hand the connection to, so a well-formed
/// upgrade still fails with [`Error::UpgradeNotImplemented`].
#[derive(Debug)]
pub struct SocketHandler {
    request: HttpRequest,
}

impl SocketHandler {
    pub fn new(request: HttpRequest) -> Self {
        Self { request }
    }

    pub fn boxed(request: HttpRequest) -> Box<dyn EndpointHandler> {
        Box::new(Self::new(request))
    }

    async fn upgrade(&self) -> Result<HttpResponse, Error> {
        let handshake = UpgradeHandshake::validate(&self.request)?;
        debug!(
            "Upgrade negotiated on {}, accept token {}",
            self.request.path, handshake.accept_key
        );
        Err(Error::UpgradeNotImplemented)
    }
}

impl EndpointHandler for SocketHandler {
    fn name(&self) -> &'static str {
        "socket"
    }

    fn handle<'a>(&'a self, _connection: &'a mut dyn Connection) -> HandlerFuture<'a> {
        Box::pin(self.upgrade())
    }
}
