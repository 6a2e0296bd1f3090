//! HTTP request handlers for the QR code API.
//!
//! # Endpoints
//!
//! - `GET /?secret=..&content=..&size=..` - Render a QR code
//! - `OPTIONS /` - CORS preflight
//! - `GET /health` - Health check endpoint

use std::num::ParseIntError;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode;
use thiserror::Error;
use tracing::{debug, warn};

use super::auth::{AuthError, SharedSecret};
use super::body::ImageBody;
use crate::error::EncodeError;
use crate::qr::{QrEncoder, RecoveryLevel};

/// Content type of every rendered image.
pub const IMAGE_CONTENT_TYPE: &str = "application/octet-stream";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state: the encoder plus the request policy.
///
/// This is passed to all handlers via Axum's State extractor and never
/// mutated after startup.
pub struct AppState<E: QrEncoder> {
    /// Renders QR codes into image bytes
    pub encoder: Arc<E>,

    /// Secret every image request must present
    pub secret: SharedSecret,

    /// Largest accepted `size` (inclusive)
    pub max_size: u32,

    /// Error-correction level used for every code
    pub recovery_level: RecoveryLevel,
}

impl<E: QrEncoder> AppState<E> {
    /// Create a new application state.
    pub fn new(
        encoder: E,
        secret: SharedSecret,
        max_size: u32,
        recovery_level: RecoveryLevel,
    ) -> Self {
        Self {
            encoder: Arc::new(encoder),
            secret,
            max_size,
            recovery_level,
        }
    }
}

impl<E: QrEncoder> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            encoder: Arc::clone(&self.encoder),
            secret: self.secret.clone(),
            max_size: self.max_size,
            recovery_level: self.recovery_level,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters of an image request.
///
/// Values are kept as the raw bytes the client sent after percent-decoding,
/// so content that is not valid UTF-8 reaches the encoder unchanged. Absent
/// parameters are empty. When a key is repeated, the first occurrence wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QrQueryParams {
    /// Shared secret
    pub secret: Vec<u8>,

    /// Bytes to encode
    pub content: Vec<u8>,

    /// Image width and height in pixels, still unparsed
    pub size: Vec<u8>,
}

impl QrQueryParams {
    /// Parse a raw (still percent-encoded) query string.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let (mut has_secret, mut has_content, mut has_size) = (false, false, false);

        for pair in query.unwrap_or("").split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));

            let (seen, slot) = match decode_component(key).as_slice() {
                b"secret" => (&mut has_secret, &mut params.secret),
                b"content" => (&mut has_content, &mut params.content),
                b"size" => (&mut has_size, &mut params.size),
                _ => continue,
            };
            if !*seen {
                *seen = true;
                *slot = decode_component(value);
            }
        }

        params
    }
}

/// Decode one `application/x-www-form-urlencoded` component to raw bytes.
fn decode_component(component: &str) -> Vec<u8> {
    let plus_as_space = component.replace('+', " ");
    percent_decode(plus_as_space.as_bytes()).collect()
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Everything that can stop an image request from producing an image.
#[derive(Debug, Error)]
pub enum QrRequestError {
    /// Secret missing or wrong (403)
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// `content` or `size` is missing or empty (400)
    #[error("Both content and size are required")]
    MissingParameter,

    /// `size` is not a base-10 integer (500, body is the parse error)
    #[error("{0}")]
    SizeParse(#[from] ParseIntError),

    /// `size` parsed but is not within 1..=max_size (400)
    #[error("Size {size} is out of range (1-{max_size})")]
    SizeOutOfRange { size: i64, max_size: u32 },

    /// The encoder rejected the content (400)
    #[error("Failed to encode QR code: {0}")]
    Encode(#[from] EncodeError),
}

impl QrRequestError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            QrRequestError::Unauthorized(_) => StatusCode::FORBIDDEN,
            QrRequestError::MissingParameter => StatusCode::BAD_REQUEST,
            // Unparsable sizes answer 500, not 400 (existing client contract)
            QrRequestError::SizeParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QrRequestError::SizeOutOfRange { .. } => StatusCode::BAD_REQUEST,
            QrRequestError::Encode(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Convert QrRequestError to HTTP response.
///
/// Bodies are empty except for size parse errors, which carry the parser's
/// message as plain text.
impl IntoResponse for QrRequestError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            QrRequestError::Unauthorized(auth) => return auth.clone().into_response(),
            QrRequestError::SizeParse(e) => {
                debug!(status = status.as_u16(), "Unparsable size: {}", e);
                return (status, e.to_string()).into_response();
            }
            QrRequestError::Encode(e) => {
                warn!(status = status.as_u16(), "Client error: {}", e);
            }
            QrRequestError::MissingParameter | QrRequestError::SizeOutOfRange { .. } => {
                debug!(status = status.as_u16(), "Client error: {}", self);
            }
        }

        status.into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle QR code requests.
///
/// # Endpoint
///
/// `GET /`
///
/// # Query Parameters
///
/// - `secret`: Shared secret (must match `SECRET`)
/// - `content`: Text to encode
/// - `size`: Width and height of the image in pixels (1 to `MAX_SIZE`)
///
/// # Response
///
/// - `200 OK`: PNG image with `Content-Type: application/octet-stream`
/// - `403 Forbidden`: Secret missing or wrong
/// - `400 Bad Request`: Missing content/size, size out of range, or content
///   that cannot be encoded
/// - `500 Internal Server Error`: Size is not an integer (body holds the
///   parse error)
///
/// Checks run in that order, so a bad secret always yields 403. A client
/// that disconnects while the image is being written is logged as an error.
pub async fn qr_handler<E: QrEncoder>(
    State(state): State<AppState<E>>,
    RawQuery(query): RawQuery,
) -> Result<Response, QrRequestError> {
    let params = QrQueryParams::from_query(query.as_deref());

    state.secret.verify(&params.secret)?;

    if params.content.is_empty() || params.size.is_empty() {
        return Err(QrRequestError::MissingParameter);
    }

    let size: i64 = String::from_utf8_lossy(&params.size).parse()?;

    if size <= 0 || size > i64::from(state.max_size) {
        return Err(QrRequestError::SizeOutOfRange {
            size,
            max_size: state.max_size,
        });
    }

    // In range 1..=max_size, so it fits
    let size = size as u32;

    let image = state
        .encoder
        .encode(&params.content, state.recovery_level, size)?;

    debug!(size, bytes = image.len(), "Rendered QR code");

    Ok((
        [(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)],
        Body::new(ImageBody::new(image)),
    )
        .into_response())
}

/// Handle CORS preflight requests.
///
/// # Endpoint
///
/// `OPTIONS /`
///
/// `200 OK` with an empty body; the CORS headers are added by the router.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// `200 OK` with an empty body, whatever the query string.
pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// Tests
// =============================================================================
