//! Grayscale-PNG label-grid reader.
//!
//! Inference happens outside this crate; the CLI stands in for the
//! inference provider by reading the label grid from a grayscale PNG mask
//! where the pixel value at (x, y) is the class id. 16-bit grayscale is
//! supported for catalogs larger than 256 classes.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};

use super::{LabelGrid, SegmentationResult};
use crate::error::SegsieveError;
use crate::pipeline::SegmentationProvider;

/// Reads a label grid from a grayscale PNG mask file.
pub fn read_label_grid_png(path: &Path) -> Result<LabelGrid, SegsieveError> {
    let bytes = fs::read(path).map_err(|source| SegsieveError::MaskRead {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;
    label_grid_from_png_slice(&bytes).map_err(|message| SegsieveError::MaskRead {
        path: path.to_path_buf(),
        message,
    })
}

/// Parses a label grid from in-memory PNG bytes.
///
/// Useful for fuzzing and tests without file I/O.
pub fn label_grid_from_png_slice(bytes: &[u8]) -> Result<LabelGrid, String> {
    let decoded = image::load_from_memory(bytes).map_err(|source| source.to_string())?;

    let (width, height, labels) = match decoded {
        DynamicImage::ImageLuma16(img) => {
            let (w, h) = img.dimensions();
            (w, h, img.into_raw())
        }
        other => {
            let img = other.into_luma8();
            let (w, h) = img.dimensions();
            let labels = img.into_raw().into_iter().map(u16::from).collect();
            (w, h, labels)
        }
    };

    LabelGrid::from_raw(width, height, labels)
        .ok_or_else(|| "decoded mask size does not match its extents".to_string())
}

/// A [`SegmentationProvider`] that serves a pre-computed mask file.
///
/// Pairs the grid read from `path` with whatever image the pipeline hands
/// it; a size disagreement is left for the validator to reject.
#[derive(Clone, Debug)]
pub struct MaskFileProvider {
    path: PathBuf,
}

impl MaskFileProvider {
    /// Creates a provider reading from the given mask file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SegmentationProvider for MaskFileProvider {
    fn segment(&self, image: &RgbaImage) -> Result<SegmentationResult, SegsieveError> {
        let grid = read_label_grid_png(&self.path)?;
        Ok(SegmentationResult::new(grid, image.clone()))
    }
}
