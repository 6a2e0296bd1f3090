//! QR code rendering.
//!
//! - [`RecoveryLevel`]: the four error-correction tiers accepted in configuration
//! - [`QrEncoder`]: the seam between the HTTP layer and image generation
//! - [`PngQrEncoder`]: production encoder producing square grayscale PNGs
//!
//! # Example
//!
//! ```
//! use bond::qr::{PngQrEncoder, QrEncoder, RecoveryLevel};
//!
//! let encoder = PngQrEncoder::new();
//! let png = encoder.encode(b"hello", RecoveryLevel::High, 256).unwrap();
//! assert!(!png.is_empty());
//! ```

mod encoder;
mod level;

pub use encoder::{PngQrEncoder, QrEncoder, QUIET_ZONE_MODULES};
pub use level::{RecoveryLevel, UnknownRecoveryLevel};
