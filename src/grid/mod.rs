//! Label grids and segmentation results.
//!
//! A [`LabelGrid`] is the dense per-pixel output of a segmentation model:
//! an H×W array of class ids in row-major order. A [`SegmentationResult`]
//! pairs one with the color image it was computed from.

pub mod io_png;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A pixel position, serialized as a `[x, y]` pair to match the
/// detected-objects report wire format.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Debug for PixelCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// Hand-written serde keeps the wire shape a bare two-element array.
impl Serialize for PixelCoord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.x, self.y).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PixelCoord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (x, y) = <(u32, u32)>::deserialize(deserializer)?;
        Ok(PixelCoord::new(x, y))
    }
}

/// A dense H×W grid of class labels in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelGrid {
    width: u32,
    height: u32,
    labels: Vec<u16>,
}

impl LabelGrid {
    /// Creates a grid from row-major labels.
    ///
    /// Returns `None` if `labels.len() != width * height`.
    pub fn from_raw(width: u32, height: u32, labels: Vec<u16>) -> Option<Self> {
        if labels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            labels,
        })
    }

    /// Creates a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u16) -> Self {
        let mut labels = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                labels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            labels,
        }
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height) extents.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The label at (x, y), or `None` out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.labels[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Raw row-major labels.
    #[inline]
    pub fn labels(&self) -> &[u16] {
        &self.labels
    }

    /// Iterates `(coord, label)` in row-major scan order.
    pub fn iter(&self) -> impl Iterator<Item = (PixelCoord, u16)> + '_ {
        let width = self.width;
        self.labels.iter().enumerate().map(move |(i, &label)| {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            (PixelCoord::new(x, y), label)
        })
    }
}

/// The output of an inference provider: a label grid plus the color image
/// it labels, with identical extents (enforced by the validator, not the
/// constructor).
#[derive(Clone, Debug)]
pub struct SegmentationResult {
    pub label_grid: LabelGrid,
    pub color_image: RgbaImage,
}

impl SegmentationResult {
    /// Pairs a grid with its color image.
    pub fn new(label_grid: LabelGrid, color_image: RgbaImage) -> Self {
        Self {
            label_grid,
            color_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_length_check() {
        assert!(LabelGrid::from_raw(2, 2, vec![0, 1, 2, 3]).is_some());
        assert!(LabelGrid::from_raw(2, 2, vec![0, 1, 2]).is_none());
    }

    #[test]
    fn test_get_is_row_major() {
        let grid = LabelGrid::from_raw(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.get(0, 0), Some(0));
        assert_eq!(grid.get(2, 0), Some(2));
        assert_eq!(grid.get(0, 1), Some(3));
        assert_eq!(grid.get(2, 1), Some(5));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_iter_scan_order() {
        let grid = LabelGrid::from_fn(2, 2, |x, y| (y * 2 + x) as u16);
        let coords: Vec<PixelCoord> = grid.iter().map(|(c, _)| c).collect();
        assert_eq!(
            coords,
            vec![
                PixelCoord::new(0, 0),
                PixelCoord::new(1, 0),
                PixelCoord::new(0, 1),
                PixelCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_pixel_coord_serializes_as_pair() {
        let json = serde_json::to_string(&PixelCoord::new(3, 7)).unwrap();
        assert_eq!(json, "[3,7]");
        let back: PixelCoord = serde_json::from_str("[3,7]").unwrap();
        assert_eq!(back, PixelCoord::new(3, 7));
    }
}
