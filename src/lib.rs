//! # Bond
//!
//! A tiny HTTP service that renders QR codes.
//!
//! Clients call `GET /?secret=..&content=..&size=..` and receive a PNG of
//! `size x size` pixels encoding `content`. Requests must carry the shared
//! secret the service was started with, and `size` is bounded by a
//! configured maximum.
//!
//! ## Features
//!
//! - **Shared-secret access**: constant-time comparison of the `secret` parameter
//! - **Configurable error correction**: LOW, MEDIUM, HIGH or HIGHEST
//! - **HTTPS**: optional TLS from PEM files via rustls
//! - **Self-check**: `bond --healthcheck` probes a running instance for
//!   container health checks
//!
//! ## Architecture
//!
//! - [`config`] - CLI, env files and setting resolution
//! - [`qr`] - Recovery levels and the PNG encoder
//! - [`server`] - Axum router, handlers, auth and TLS
//! - [`healthcheck`] - Client side of the self-check
//!
//! ## Example
//!
//! ```rust,no_run
//! use bond::{create_router, PngQrEncoder, RecoveryLevel, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RouterConfig::new("abc123", 500, RecoveryLevel::High);
//!     let router = create_router(PngQrEncoder::new(), config);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod healthcheck;
pub mod qr;
pub mod server;

// Re-export commonly used types
pub use config::{Cli, Command, EnvFiles, HealthcheckConfig, ServiceConfig};
pub use error::{ConfigError, EncodeError, HealthcheckError, TlsError};
pub use qr::{PngQrEncoder, QrEncoder, RecoveryLevel};
pub use server::{
    create_router, health_handler, qr_handler, serve, AppState, AuthError, QrRequestError,
    RouterConfig, SharedSecret,
};
