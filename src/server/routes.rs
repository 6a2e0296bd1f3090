//! Router configuration for Bond.
//!
//! This module defines the HTTP routes and applies the middleware stack:
//! CORS headers, panic recovery and optional request logging.
//!
//! # Route Structure
//!
//! ```text
//! GET     /          - Render a QR code (secret required)
//! OPTIONS /          - CORS preflight
//! GET     /health    - Health check (public)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bond::qr::{PngQrEncoder, RecoveryLevel};
//! use bond::server::routes::{create_router, RouterConfig};
//!
//! let config = RouterConfig::new("abc123", 500, RecoveryLevel::High).with_tracing(true);
//! let router = create_router(PngQrEncoder::new(), config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{routing::get, Router};
use http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};
use http::HeaderValue;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::auth::SharedSecret;
use super::handlers::{health_handler, preflight_handler, qr_handler, AppState};
use crate::qr::{QrEncoder, RecoveryLevel};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Secret every image request must present
    pub secret: String,

    /// Largest accepted `size` (inclusive)
    pub max_size: u32,

    /// Error-correction level for rendered codes
    pub recovery_level: RecoveryLevel,

    /// Whether to log every request
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// Request logging is off by default.
    pub fn new(secret: impl Into<String>, max_size: u32, recovery_level: RecoveryLevel) -> Self {
        Self {
            secret: secret.into(),
            max_size,
            recovery_level,
            enable_tracing: false,
        }
    }

    /// Enable or disable request logging.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Set the largest accepted size.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the error-correction level.
    pub fn with_recovery_level(mut self, recovery_level: RecoveryLevel) -> Self {
        self.recovery_level = recovery_level;
        self
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("secret", &"<redacted>")
            .field("max_size", &self.max_size)
            .field("recovery_level", &self.recovery_level)
            .field("enable_tracing", &self.enable_tracing)
            .finish()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Every response, errors and panics included, carries
/// `Access-Control-Allow-Origin: *` and `Access-Control-Allow-Methods: GET`.
/// A panicking handler yields `500 Internal Server Error` instead of taking
/// the process down.
pub fn create_router<E: QrEncoder>(encoder: E, config: RouterConfig) -> Router {
    let state = AppState::new(
        encoder,
        SharedSecret::new(&config.secret),
        config.max_size,
        config.recovery_level,
    );

    let router = Router::new()
        .route("/", get(qr_handler::<E>).options(preflight_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET"),
        ));

    if config.enable_tracing {
        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
