//! Class image encoding.
//!
//! Two encode paths exist, matching the two artifact kinds: the original
//! frame is encoded as-is, while per-class buffers go through sample
//! normalization and a BGR→RGBA channel reorder first - the record store
//! downstream expects that byte layout, which differs from the in-memory
//! one.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::SegsieveError;
use crate::extract::ClassMask;

/// Default JPEG quality, matching the codec default the original artifacts
/// were produced with.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Encodes per-class color buffers into compressed image bytes.
#[derive(Clone, Copy, Debug)]
pub struct ClassImageEncoder {
    quality: u8,
}

impl ClassImageEncoder {
    /// Creates an encoder with the given JPEG quality (1-100).
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// The configured JPEG quality.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encodes one class mask as a JPEG byte sequence.
    ///
    /// The sparse mask is reconstructed into a dense H×W buffer (sentinel
    /// everywhere outside the class), samples are normalized through f32,
    /// the BGR→RGBA reorder is applied, and the result is JPEG-encoded.
    /// The codec is lossy and carries no alpha, so sentinel regions come
    /// back as near-black rather than transparent.
    ///
    /// A mask is only ever created for a class with at least one member
    /// pixel, so the empty/degenerate case is unreachable in the pipeline;
    /// it is still rejected here with [`SegsieveError::Encode`].
    pub fn encode(
        &self,
        mask: &ClassMask,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, SegsieveError> {
        if width == 0 || height == 0 {
            return Err(SegsieveError::Encode {
                message: format!("degenerate buffer extents {width}x{height}"),
            });
        }
        if mask.is_empty() {
            return Err(SegsieveError::Encode {
                message: "class mask has no member pixels".to_string(),
            });
        }

        let dense = mask.to_dense(width, height);
        let reordered = reorder_bgr_to_rgba(&dense);
        encode_rgba_jpeg(&reordered, self.quality)
    }
}

impl Default for ClassImageEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

/// Encodes an RGBA buffer as JPEG without any channel reorder.
///
/// Used for the original-frame artifact. JPEG drops the alpha channel.
pub fn encode_rgba_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, SegsieveError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(SegsieveError::Encode {
            message: "cannot encode an empty image".to_string(),
        });
    }

    let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
    let mut bytes = Vec::new();
    let mut binding = Cursor::new(&mut bytes);
    let encoder = JpegEncoder::new_with_quality(&mut binding, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|source| SegsieveError::Encode {
            message: source.to_string(),
        })?;
    Ok(bytes)
}

/// Reorders channels from the in-memory layout to the persistence layer's
/// expected one: samples pass through f32 and the blue/red positions swap.
fn reorder_bgr_to_rgba(image: &RgbaImage) -> RgbaImage {
    let mut out = RgbaImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0.map(|sample| sample as f32);
        out.put_pixel(x, y, Rgba([b as u8, g as u8, r as u8, a as u8]));
    }
    out
}
