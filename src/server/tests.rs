//! Tests for the connection pipeline.

#[cfg(test)]
mod server_tests {
    use std::collections::VecDeque;
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    use crate::parser::{Error as ParserError, HttpRequest, Method};
    use crate::server::{
        read_request, Connection, EndpointHandler, Error, HandlerFuture, HandlerRegistry, HttpServer, RouteEntry,
        RouteTable, ServerConfig,
    };

    const OK_RESPONSE: &[u8] =
        b"HTTP/1.0 200 OK\r\nContent-Type: text/plain; charset=UTF-8\r\nContent-Length: 6\r\n\r\n200 OK";
    const NOT_FOUND_RESPONSE: &[u8] =
        b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain; charset=UTF-8\r\nContent-Length: 0\r\n\r\n";

    // Mock TcpStream for testing
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
    }

    impl MockTcpStream {
        fn new(read_data: impl Into<Vec<u8>>) -> Self {
            Self {
                read_data: Cursor::new(read_data.into()),
                write_data: Vec::new(),
            }
        }

        fn written_data(&self) -> &[u8] {
            &self.write_data
        }

        fn written_text(&self) -> String {
            String::from_utf8_lossy(&self.write_data).into_owned()
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            this.write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    // Hands out one queued chunk per read, like a peer writing in pieces
    struct ChunkedStream {
        chunks: VecDeque<Vec<u8>>,
    }

    impl ChunkedStream {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            }
        }
    }

    impl AsyncRead for ChunkedStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            if let Some(chunk) = this.chunks.pop_front() {
                assert!(chunk.len() <= buf.remaining(), "test chunk larger than read buffer");
                buf.put_slice(&chunk);
            }
            Poll::Ready(Ok(()))
        }
    }

    struct FailingHandler;

    impl EndpointHandler for FailingHandler {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn handle<'a>(&'a self, _connection: &'a mut dyn Connection) -> HandlerFuture<'a> {
            Box::pin(async { Err(Error::HandlerFailure("database unavailable".to_string())) })
        }
    }

    fn failing(_request: HttpRequest) -> Box<dyn EndpointHandler> {
        Box::new(FailingHandler)
    }

    async fn serve_one(request: &[u8]) -> (Result<(), Error>, MockTcpStream) {
        serve_one_with(request, &RouteTable::default(), &HandlerRegistry::default()).await
    }

    async fn serve_one_with(
        request: &[u8],
        routes: &RouteTable,
        handlers: &HandlerRegistry,
    ) -> (Result<(), Error>, MockTcpStream) {
        let mut stream = MockTcpStream::new(request);
        let result = HttpServer::handle_connection(&mut stream, routes, handlers, 1024, 8192).await;
        (result, stream)
    }

    #[tokio::test]
    async fn test_default_route() {
        let (result, stream) = serve_one(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(result.is_ok());
        assert_eq!(stream.written_data(), OK_RESPONSE);
    }

    #[tokio::test]
    async fn test_default_route_is_idempotent() {
        let request = b"GET / HTTP/1.1\r\nHost: localhost\r\nUser-Agent: test\r\n\r\n";
        let (_, first) = serve_one(request).await;
        let (_, second) = serve_one(request).await;
        assert_eq!(first.written_data(), second.written_data());
    }

    #[tokio::test]
    async fn test_not_found() {
        let (result, stream) = serve_one(b"GET /missing HTTP/1.1\r\n\r\n").await;
        assert!(result.is_ok());
        assert_eq!(stream.written_data(), NOT_FOUND_RESPONSE);
    }

    #[tokio::test]
    async fn test_wrong_method_is_not_found() {
        let (result, stream) = serve_one(b"POST / HTTP/1.1\r\nHost: localhost\r\n\r\nbody").await;
        assert!(result.is_ok());
        assert_eq!(stream.written_data(), NOT_FOUND_RESPONSE);
    }

    #[tokio::test]
    async fn test_unknown_method_served_as_get() {
        let (result, stream) = serve_one(b"DELETE / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(result.is_ok());
        assert_eq!(stream.written_data(), OK_RESPONSE);
    }

    #[tokio::test]
    async fn test_handler_failure_returns_500() {
        let routes = RouteTable::new(vec![RouteEntry::new(Method::GET, "/fail")]);
        let mut handlers = HandlerRegistry::default();
        handlers.register("/fail", failing);

        let (result, stream) = serve_one_with(b"GET /fail HTTP/1.1\r\n\r\n", &routes, &handlers).await;

        assert!(matches!(result, Err(Error::HandlerFailure(ref msg)) if msg == "database unavailable"));
        assert_eq!(
            stream.written_text(),
            "HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain; charset=UTF-8\r\nContent-Length: 20\r\n\r\ndatabase unavailable"
        );
    }

    #[tokio::test]
    async fn test_route_without_handler() {
        let routes = RouteTable::new(vec![RouteEntry::new(Method::GET, "/orphan")]);
        let (result, stream) =
            serve_one_with(b"GET /orphan HTTP/1.1\r\n\r\n", &routes, &HandlerRegistry::default()).await;

        assert!(matches!(result, Err(Error::UndefinedRoute(ref path)) if path == "/orphan"));
        let response = stream.written_text();
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.ends_with("\r\n\r\nUndefined route: /orphan"));
    }

    #[tokio::test]
    async fn test_malformed_request_gets_no_response() {
        let requests: [&[u8]; 3] = [b"INVALID REQUEST", b"GET / HTTP/1.1\r\nBadHeader\r\n\r\n", b"GET\r\n\r\n"];
        for request in requests {
            let (result, stream) = serve_one(request).await;
            assert!(matches!(result, Err(Error::MalformedRequest(_))));
            assert!(stream.written_data().is_empty());
        }
    }

    #[tokio::test]
    async fn test_duplicate_header_gets_no_response() {
        let (result, stream) = serve_one(b"GET / HTTP/1.1\r\nHost: a\r\nHost: b\r\n\r\n").await;
        assert!(matches!(
            result,
            Err(Error::MalformedRequest(ParserError::DuplicateHeader(ref name))) if name == "Host"
        ));
        assert!(stream.written_data().is_empty());
    }

    #[tokio::test]
    async fn test_case_variant_duplicate_header_gets_no_response() {
        let request = b"GET /socket HTTP/1.1\r\nUpgrade: websocket\r\nupgrade: h2c\r\n\r\n";
        for _ in 0..20 {
            let (result, stream) = serve_one(request).await;
            assert!(matches!(
                result,
                Err(Error::MalformedRequest(ParserError::DuplicateHeader(ref name))) if name == "upgrade"
            ));
            assert!(stream.written_data().is_empty());
        }
    }

    #[tokio::test]
    async fn test_empty_connection() {
        let (result, stream) = serve_one(b"").await;
        assert!(result.is_ok());
        assert!(stream.written_data().is_empty());
    }

    #[tokio::test]
    async fn test_socket_without_upgrade_headers() {
        let (result, stream) = serve_one(b"GET /socket HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(matches!(result, Err(Error::Upgrade(_))));
        let response = stream.written_text();
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.ends_with("\r\n\r\nMissing upgrade header: Upgrade"));
    }

    #[tokio::test]
    async fn test_socket_upgrade_not_implemented() {
        let request = b"GET /socket HTTP/1.1\r\nHost: localhost\r\nUpgrade: websocket\r\nConnection: Upgrade\r\n\
Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\nSec-WebSocket-Version: 13\r\n\r\n";
        let (result, stream) = serve_one(request).await;
        assert!(matches!(result, Err(Error::UpgradeNotImplemented)));
        let response = stream.written_text();
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.ends_with("\r\n\r\nSocket upgrade is not implemented"));
    }

    #[tokio::test]
    async fn test_registry_dispatch() {
        let registry = HandlerRegistry::default();
        let request = crate::parser::parse_request("GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(registry.create(request).unwrap().name(), "default");

        let request = crate::parser::parse_request("GET /socket HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(registry.create(request).unwrap().name(), "socket");

        let request = crate::parser::parse_request("GET /elsewhere HTTP/1.1\r\n\r\n").unwrap();
        assert!(matches!(registry.create(request), Err(Error::UndefinedRoute(ref p)) if p == "/elsewhere"));
    }

    #[tokio::test]
    async fn test_default_handler_response() {
        let registry = HandlerRegistry::default();
        let request = crate::parser::parse_request("GET / HTTP/1.1\r\n\r\n").unwrap();
        let handler = registry.create(request).unwrap();
        let mut stream = MockTcpStream::new(Vec::new());

        let response = handler.handle(&mut stream).await.unwrap();
        assert_eq!(response.status, "HTTP/1.0 200 OK");
        assert_eq!(response.body, "200 OK");
        // Handlers return responses, the loop writes them
        assert!(stream.written_data().is_empty());
    }

    #[tokio::test]
    async fn test_read_request_across_chunks() {
        let mut stream = ChunkedStream::new(&[b"GET / HT", b"TP/1.1\r\nHost: a\r", b"\n\r", b"\nbody", b"ignored"]);
        let raw = read_request(&mut stream, 64, 1024).await.unwrap().unwrap();
        assert_eq!(raw, "GET / HTTP/1.1\r\nHost: a\r\n\r\nbody");
        // Reading stops once the header block is complete
        assert_eq!(stream.chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_read_request_without_terminator_until_eof() {
        let mut stream = ChunkedStream::new(&[b"GET / HTTP/1.1\r\n"]);
        let raw = read_request(&mut stream, 64, 1024).await.unwrap();
        assert_eq!(raw.as_deref(), Some("GET / HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_read_request_too_large() {
        let mut stream = ChunkedStream::new(&[&[b'a'; 32], &[b'a'; 32], &[b'a'; 32]]);
        let result = read_request(&mut stream, 32, 64).await;
        assert!(matches!(result, Err(Error::RequestTooLarge(64))));
    }

    #[tokio::test]
    async fn test_read_request_invalid_utf8() {
        let mut stream = ChunkedStream::new(&[b"GET /\xff HTTP/1.1\r\n\r\n"]);
        let result = read_request(&mut stream, 64, 1024).await;
        assert!(matches!(result, Err(Error::MalformedRequest(ParserError::InvalidUtf8))));
    }

    #[tokio::test]
    async fn test_server_with_handler() {
        let server = HttpServer::new(ServerConfig::default()).with_handler("/fail", failing);
        assert!(server.handlers().contains("/"));
        assert!(server.handlers().contains("/socket"));
        assert!(server.handlers().contains("/fail"));
        // Not routable until the route table lists it
        assert!(!server.routes().verify(Method::GET, "/fail"));
    }

    async fn roundtrip(addr: std::net::SocketAddr, request: &[u8]) -> Vec<u8> {
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(request).await.unwrap();
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serve_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = HttpServer::new(ServerConfig::default());
        let running = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        assert_eq!(roundtrip(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await, OK_RESPONSE);
        // A malformed request is dropped without a response...
        assert!(roundtrip(addr, b"garbage\r\n\r\n").await.is_empty());
        // ...and the server keeps serving
        assert_eq!(roundtrip(addr, b"GET /missing HTTP/1.1\r\n\r\n").await, NOT_FOUND_RESPONSE);

        shutdown_tx.send(()).unwrap();
        running.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_rejects_connections_over_capacity() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let config = ServerConfig { max_connections: 1, ..ServerConfig::default() };
        let server = HttpServer::new(config);
        let running = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        // Accepted first and holds the only permit while it sends nothing
        let idle = TcpStream::connect(addr).await.unwrap();
        // Rejected before anything is read, so send nothing and just listen
        let mut rejected = TcpStream::connect(addr).await.unwrap();
        let mut response = String::new();
        rejected.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(response.ends_with("\r\n\r\nServer is at capacity, please try again later"));

        // Closing the idle connection frees the permit
        drop(idle);
        shutdown_tx.send(()).unwrap();
        running.await.unwrap().unwrap();
    }
}
