//! Test utilities for integration tests.
//!
//! This module provides mock encoders and helpers for building requests
//! against the router and for running a real server on an ephemeral port.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;

use bond::server::{self, load_rustls_config};
use bond::{create_router, EncodeError, PngQrEncoder, QrEncoder, RecoveryLevel, RouterConfig};

/// Secret used by every test router.
pub const TEST_SECRET: &str = "abc123";

/// Largest size accepted by every test router.
pub const TEST_MAX_SIZE: u32 = 500;

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub const TEST_CERT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/certificate.pem");
pub const TEST_KEY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/key.pem");

// =============================================================================
// Mock Encoders
// =============================================================================

/// One call seen by [`RecordingEncoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeCall {
    pub content: Vec<u8>,
    pub level: RecoveryLevel,
    pub size: u32,
}

/// Encoder that records its calls and returns fixed bytes.
#[derive(Clone, Default)]
pub struct RecordingEncoder {
    calls: Arc<Mutex<Vec<EncodeCall>>>,
}

impl RecordingEncoder {
    pub const OUTPUT: &'static [u8] = b"not-really-a-png";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<EncodeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl QrEncoder for RecordingEncoder {
    fn encode(
        &self,
        content: &[u8],
        level: RecoveryLevel,
        size: u32,
    ) -> Result<Bytes, EncodeError> {
        self.calls.lock().unwrap().push(EncodeCall {
            content: content.to_vec(),
            level,
            size,
        });
        Ok(Bytes::from_static(Self::OUTPUT))
    }
}

/// Encoder that rejects every content.
pub struct FailingEncoder;

impl QrEncoder for FailingEncoder {
    fn encode(&self, _: &[u8], _: RecoveryLevel, _: u32) -> Result<Bytes, EncodeError> {
        Err(EncodeError::Symbol("data too long".to_string()))
    }
}

/// Encoder that panics on every call.
pub struct PanickingEncoder;

impl QrEncoder for PanickingEncoder {
    fn encode(&self, _: &[u8], _: RecoveryLevel, _: u32) -> Result<Bytes, EncodeError> {
        panic!("encoder blew up");
    }
}

/// Encoder whose output is far larger than any socket buffer.
pub struct OversizedEncoder;

impl OversizedEncoder {
    pub const LEN: usize = 64 * 1024 * 1024;
}

impl QrEncoder for OversizedEncoder {
    fn encode(&self, _: &[u8], _: RecoveryLevel, _: u32) -> Result<Bytes, EncodeError> {
        Ok(Bytes::from(vec![0u8; Self::LEN]))
    }
}

// =============================================================================
// Log Capture
// =============================================================================

/// In-memory log sink for a `tracing_subscriber` fmt layer.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    /// Install a subscriber writing into this sink for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Router config used across tests.
pub fn test_config() -> RouterConfig {
    RouterConfig::new(TEST_SECRET, TEST_MAX_SIZE, RecoveryLevel::Medium)
}

/// Router backed by the real PNG encoder.
pub fn png_router() -> Router {
    create_router(PngQrEncoder::new(), test_config())
}

/// Build an image request URI with every parameter percent-encoded.
pub fn qr_uri(secret: &str, content: &str, size: &str) -> String {
    format!(
        "/?secret={}&content={}&size={}",
        urlencoding::encode(secret),
        urlencoding::encode(content),
        urlencoding::encode(size)
    )
}

/// Send one request through the router.
pub async fn send(router: Router, method: &str, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    router.oneshot(request).await.unwrap()
}

/// Send one GET request through the router.
pub async fn get(router: Router, uri: &str) -> Response<Body> {
    send(router, "GET", uri).await
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub fn is_valid_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

/// Read width and height from a PNG's IHDR chunk.
pub fn png_dimensions(data: &[u8]) -> (u32, u32) {
    assert!(is_valid_png(data), "not a PNG");
    let width = u32::from_be_bytes(data[16..20].try_into().unwrap());
    let height = u32::from_be_bytes(data[20..24].try_into().unwrap());
    (width, height)
}

// =============================================================================
// Live Server
// =============================================================================

/// A real server listening on an ephemeral localhost port.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: Handle,
}

impl TestServer {
    /// Start a plain HTTP server.
    pub async fn start(router: Router) -> Self {
        Self::start_with(router, None).await
    }

    /// Start an HTTPS server using the certificate in `tests/data`.
    pub async fn start_tls(router: Router) -> Self {
        let tls = load_rustls_config(TEST_CERT, TEST_KEY).unwrap();
        Self::start_with(router, Some(tls)).await
    }

    async fn start_with(router: Router, tls: Option<RustlsConfig>) -> Self {
        let handle = Handle::new();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        tokio::spawn(server::serve(router, addr, tls, handle.clone()));

        let addr = handle.listening().await.expect("server failed to bind");
        Self { addr, handle }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self, scheme: &str, path: &str) -> String {
        format!("{}://{}{}", scheme, self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.shutdown();
    }
}

/// A localhost port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
