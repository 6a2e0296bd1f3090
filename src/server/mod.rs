//! HTTP server layer for Bond.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │          GET /?secret=..&content=..&size=..   GET /health       │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌────────────┐  ┌─────────┐  │
//! │  │  handlers   │  │    auth     │  │   routes   │  │   tls   │  │
//! │  │ (requests)  │  │  (secret)   │  │(middleware)│  │ (https) │  │
//! │  └─────────────┘  └─────────────┘  └────────────┘  └─────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod body;
pub mod handlers;
pub mod routes;
pub mod tls;

use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::{self, RustlsConfig};
use axum_server::Handle;

pub use auth::{AuthError, SharedSecret};
pub use body::ImageBody;
pub use handlers::{
    health_handler, preflight_handler, qr_handler, AppState, QrQueryParams, QrRequestError,
    IMAGE_CONTENT_TYPE,
};
pub use routes::{create_router, RouterConfig};
pub use tls::{load_rustls_config, load_server_config};

/// Serve `router` on `addr`, over HTTPS when `tls` is given.
///
/// Runs until the server fails or `handle` is told to shut down. The handle
/// also reports the bound address, which matters when `addr` uses port 0.
pub async fn serve(
    router: Router,
    addr: SocketAddr,
    tls: Option<RustlsConfig>,
    handle: Handle,
) -> std::io::Result<()> {
    let service = router.into_make_service();

    match tls {
        Some(config) => {
            tls_rustls::bind_rustls(addr, config)
                .handle(handle)
                .serve(service)
                .await
        }
        None => axum_server::bind(addr).handle(handle).serve(service).await,
    }
}
