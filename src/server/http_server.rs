//! The connection loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::parser::parse_request;
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{Connection, HandlerConstructor, HandlerRegistry};
use crate::server::reader::read_request;
use crate::server::response::{write_response, HttpResponse};
use crate::server::routes::RouteTable;

/// A request/response server over raw TCP.
///
/// Each accepted connection carries exactly one request and is closed after
/// the response. Connections are served concurrently, up to
/// `config.max_connections`; the route table and handler registry are shared
/// read-only between them.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    routes: Arc<RouteTable>,
    handlers: Arc<HandlerRegistry>,
}

impl HttpServer {
    /// Create a server with the configured routes and the built-in handlers.
    pub fn new(config: ServerConfig) -> Self {
        let routes = Arc::new(config.route_table());
        Self {
            config,
            routes,
            handlers: Arc::new(HandlerRegistry::default()),
        }
    }

    /// Register an extra handler constructor for `path`.
    ///
    /// The path is only reachable if the route table also lists it.
    pub fn with_handler(mut self, path: impl Into<String>, constructor: HandlerConstructor) -> Self {
        Arc::make_mut(&mut self.handlers).register(path, constructor);
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Log the registered endpoints.
    fn display_server_info(&self) {
        info!("Registered endpoints:");
        for route in self.routes.iter() {
            info!("  {} {}", route.method, route.path);
            if !self.handlers.contains(&route.path) {
                warn!("  no handler registered for {}", route.path);
            }
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Resolves on Ctrl+C. Never resolves if the signal handler cannot be installed.
    async fn ctrl_c() {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
            Err(e) => {
                error!("Error setting up Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    }

    /// Start the server and serve until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the address cannot be bound.
    pub async fn start(&self) -> Result<(), Error> {
        self.config.validate()?;
        let listener = self.setup_listener().await?;
        self.serve(listener, Self::ctrl_c()).await
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    pub async fn serve(&self, listener: TcpListener, shutdown: impl Future<Output = ()>) -> Result<(), Error> {
        self.display_server_info();

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => self.handle_new_connection(socket, addr, &semaphore, &mut tasks).await,
                        Err(e) => Self::handle_connection_error(e).await,
                    }
                }
            }

            while let Some(result) = tasks.try_join_next() {
                if let Err(e) = result {
                    error!("Connection task failed: {e}");
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;
        Ok(())
    }

    /// Spawn the pipeline for a new connection, or turn it away when at capacity.
    async fn handle_new_connection(
        &self,
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::service_unavailable()
                    .with_body("Server is at capacity, please try again later");
                if let Err(e) = write_response(&mut socket, &response).await {
                    debug!("Failed to send 503 to {addr}: {e}");
                }
                if let Err(e) = socket.shutdown().await {
                    debug!("Failed to close rejected connection from {addr}: {e}");
                }
                return;
            }
        };

        let routes = self.routes.clone();
        let handlers = self.handlers.clone();
        let read_buffer_size = self.config.read_buffer_size;
        let max_request_size = self.config.max_request_size;

        tasks.spawn(async move {
            // Released when the task completes
            let _permit = permit;
            debug!("Connection from {addr} opened");

            match Self::handle_connection(&mut socket, &routes, &handlers, read_buffer_size, max_request_size).await {
                Ok(()) => {}
                Err(e @ (Error::MalformedRequest(_) | Error::RequestTooLarge(_))) => {
                    warn!("Dropped request from {addr}: {e}");
                }
                Err(e @ Error::IoError(_)) => error!("Error handling connection from {addr}: {e}"),
                // Already answered with a 500 and logged
                Err(_) => {}
            }

            if let Err(e) = socket.shutdown().await {
                debug!("Failed to close connection from {addr}: {e}");
            }
            debug!("Connection from {addr} closed");
        });
    }

    /// Log an accept failure and pause briefly before accepting again.
    async fn handle_connection_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let drained = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown timed out, aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }
        info!("Server shutdown complete");
    }

    /// Serve a single request on `socket`.
    ///
    /// Read, parse, verify the route, dispatch, write. Unknown routes get a
    /// 404; a failing handler gets a 500 carrying its error text. Malformed
    /// requests are returned as errors without writing anything.
    pub async fn handle_connection<S: Connection>(
        socket: &mut S,
        routes: &RouteTable,
        handlers: &HandlerRegistry,
        read_buffer_size: usize,
        max_request_size: usize,
    ) -> Result<(), Error> {
        let Some(raw) = read_request(socket, read_buffer_size, max_request_size).await? else {
            debug!("Client closed connection before sending a request");
            return Ok(());
        };

        let request = parse_request(&raw)?;
        debug!("{} {} ({} headers)", request.method, request.path, request.headers.len());

        if !routes.verify(request.method, &request.path) {
            warn!("No route for {} {}", request.method, request.path);
            return write_response(socket, &HttpResponse::not_found()).await;
        }

        let handler = match handlers.create(request) {
            Ok(handler) => handler,
            Err(e) => {
                error!("Route table accepted a path with no handler: {e}");
                write_response(socket, &HttpResponse::internal_error(e.to_string())).await?;
                return Err(e);
            }
        };

        let outcome = handler.handle(socket).await;
        match outcome {
            Ok(response) => write_response(socket, &response).await,
            Err(e) => {
                error!("Handler {} failed: {e}", handler.name());
                write_response(socket, &HttpResponse::internal_error(e.to_string())).await?;
                Err(e)
            }
        }
    }
}
