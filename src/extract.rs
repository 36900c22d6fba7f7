//! The label-to-object grouping engine.
//!
//! One row-major pass over the label grid partitions every pixel into
//! per-class [`ClassMask`]es. Masks are sparse: a coordinate list plus a
//! parallel color list, in exactly the scan order the pass visited them.
//! The dense sentinel-filled buffer the encoder needs is reconstructed
//! on demand by [`ClassMask::to_dense`], so memory is bounded by
//! pixels-per-class rather than H×W per class.

use std::collections::BTreeMap;

use image::{Rgba, RgbaImage};

use crate::catalog::ClassId;
use crate::grid::{PixelCoord, SegmentationResult};

/// The "empty" pixel value marking non-members in a dense class buffer.
pub const SENTINEL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// The pixels (and their colors) belonging to one class within one run.
///
/// `coords` and `colors` are parallel vectors in row-major scan order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassMask {
    coords: Vec<PixelCoord>,
    colors: Vec<Rgba<u8>>,
}

impl ClassMask {
    /// Appends one member pixel. Callers must preserve scan order.
    fn push(&mut self, coord: PixelCoord, color: Rgba<u8>) {
        self.coords.push(coord);
        self.colors.push(color);
    }

    /// Member coordinates in row-major scan order.
    pub fn coords(&self) -> &[PixelCoord] {
        &self.coords
    }

    /// Member colors, parallel to [`coords`](Self::coords).
    pub fn colors(&self) -> &[Rgba<u8>] {
        &self.colors
    }

    /// Number of member pixels.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Returns true if the mask has no member pixels.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Reconstructs the dense H×W buffer: member pixels carry their
    /// original color, everything else is [`SENTINEL`].
    pub fn to_dense(&self, width: u32, height: u32) -> RgbaImage {
        let mut buffer = RgbaImage::from_pixel(width, height, SENTINEL);
        for (coord, color) in self.coords.iter().zip(&self.colors) {
            if coord.x < width && coord.y < height {
                buffer.put_pixel(coord.x, coord.y, *color);
            }
        }
        buffer
    }
}

/// Partitions every pixel of a validated segmentation into per-class masks.
///
/// A mask is created lazily the first time its class id is seen, so only
/// classes actually present allocate anything. Coordinate order within
/// each mask is exactly the row-major scan order, which makes repeated
/// runs over identical input byte-identical.
///
/// Precondition: `segmentation` has passed
/// [`validate_segmentation`](crate::validation::validate_segmentation);
/// labels are not range-checked here.
pub fn group_by_class(segmentation: &SegmentationResult) -> BTreeMap<ClassId, ClassMask> {
    let mut masks: BTreeMap<ClassId, ClassMask> = BTreeMap::new();

    for (coord, label) in segmentation.label_grid.iter() {
        let color = *segmentation.color_image.get_pixel(coord.x, coord.y);
        masks
            .entry(ClassId::new(label))
            .or_default()
            .push(coord, color);
    }

    masks
}
