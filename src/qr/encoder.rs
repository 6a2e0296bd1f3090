//! PNG QR code encoder.
//!
//! Renders a QR symbol into a square grayscale PNG of the requested size.
//!
//! # Layout
//!
//! - **Quiet zone**: 4 light modules on every side of the symbol.
//! - **Scaling**: each module is `size / (modules + 8)` pixels wide; the
//!   leftover pixels are split evenly as extra margin, so the output is
//!   exactly `size x size`.
//! - **Too small**: when `size` cannot fit one pixel per module, the image
//!   grows to the symbol's natural size instead of failing.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma};
use qrcode::{Color, QrCode};

use super::RecoveryLevel;
use crate::error::EncodeError;

/// Light modules added around the symbol on each side.
pub const QUIET_ZONE_MODULES: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

// =============================================================================
// Encoder Trait
// =============================================================================

/// Turns text into an encoded image.
///
/// The HTTP layer is generic over this trait so the production encoder can
/// be swapped for test doubles.
pub trait QrEncoder: Send + Sync + 'static {
    /// Render the raw `content` bytes at `level` into an image `size` pixels wide.
    fn encode(&self, content: &[u8], level: RecoveryLevel, size: u32)
        -> Result<Bytes, EncodeError>;
}

// =============================================================================
// PNG Encoder
// =============================================================================

/// Production encoder: QR symbol rendered as an 8-bit grayscale PNG.
#[derive(Debug, Clone, Default)]
pub struct PngQrEncoder;

impl PngQrEncoder {
    /// Create a new PNG QR encoder.
    pub fn new() -> Self {
        Self
    }

    /// Rasterize the symbol without PNG-encoding it.
    pub fn render(
        &self,
        content: &[u8],
        level: RecoveryLevel,
        size: u32,
    ) -> Result<GrayImage, EncodeError> {
        let code = QrCode::with_error_correction_level(content, level.ec_level())
            .map_err(|e| EncodeError::Symbol(e.to_string()))?;

        let modules = code.width() as u32;
        let colors = code.to_colors();

        let total = modules + 2 * QUIET_ZONE_MODULES;
        let size = size.max(total);
        let scale = size / total;
        let offset = (size - total * scale) / 2 + QUIET_ZONE_MODULES * scale;

        let mut img = GrayImage::from_pixel(size, size, LIGHT);

        for (i, color) in colors.iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let x = offset + (i as u32 % modules) * scale;
            let y = offset + (i as u32 / modules) * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(x + dx, y + dy, DARK);
                }
            }
        }

        Ok(img)
    }
}

impl QrEncoder for PngQrEncoder {
    fn encode(
        &self,
        content: &[u8],
        level: RecoveryLevel,
        size: u32,
    ) -> Result<Bytes, EncodeError> {
        let img = self.render(content, level, size)?;

        let mut output = Cursor::new(Vec::new());
        PngEncoder::new(&mut output)
            .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::L8)
            .map_err(|e| EncodeError::Image(e.to_string()))?;

        Ok(Bytes::from(output.into_inner()))
    }
}

// =============================================================================
// Tests
// =============================================================================
