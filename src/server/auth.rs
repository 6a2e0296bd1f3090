//! Shared-secret authorization for image requests.
//!
//! Every `GET /` must carry a `secret` query parameter equal to the
//! configured `SECRET`. There is no hashing or expiry: the check is a plain
//! equality test, performed in constant time so response timing does not
//! reveal how much of a guess was right.
//!
//! # Example
//!
//! ```rust
//! use bond::server::auth::SharedSecret;
//!
//! let secret = SharedSecret::new("abc123");
//! assert!(secret.verify(b"abc123").is_ok());
//! assert!(secret.verify(b"wrong").is_err());
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::debug;

// =============================================================================
// Types
// =============================================================================

/// Authorization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provided secret is missing or does not match
    Forbidden,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Forbidden => write!(f, "Secret missing or incorrect"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        debug!(status = StatusCode::FORBIDDEN.as_u16(), "Authorization failed: {}", self);

        StatusCode::FORBIDDEN.into_response()
    }
}

// =============================================================================
// Shared Secret
// =============================================================================

/// The configured secret, compared against each request's `secret` parameter.
#[derive(Clone)]
pub struct SharedSecret {
    secret: Vec<u8>,
}

impl SharedSecret {
    /// Create a checker for the given secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Check a provided secret.
    ///
    /// A missing parameter should be passed as an empty slice; it only
    /// matches an empty configured secret, which startup validation refuses.
    pub fn verify(&self, provided: &[u8]) -> Result<(), AuthError> {
        // ct_eq on slices of different lengths is false without leaking where they differ
        if self.secret.as_slice().ct_eq(provided).into() {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("secret", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
