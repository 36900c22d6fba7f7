//! Segmentation input validation.
//!
//! A [`SegmentationResult`] arrives from an external inference provider and
//! is checked here before the pipeline touches it: the label grid and the
//! color image must agree on extents, and every label must index a class
//! in the catalog. The check is pure - no side effects, nothing persisted.

use crate::catalog::ClassCatalog;
use crate::error::SegsieveError;
use crate::grid::SegmentationResult;

/// Validates a segmentation result against a class catalog.
///
/// Extents are checked eagerly; labels are validated with a full O(H×W)
/// scan so that no out-of-range class-table lookup can occur in any later
/// stage. Fails with [`SegsieveError::DimensionMismatch`] or
/// [`SegsieveError::InvalidLabel`] (first offending cell).
pub fn validate_segmentation(
    segmentation: &SegmentationResult,
    catalog: &ClassCatalog,
) -> Result<(), SegsieveError> {
    let (grid_width, grid_height) = segmentation.label_grid.dimensions();
    let (image_width, image_height) = segmentation.color_image.dimensions();

    if (grid_width, grid_height) != (image_width, image_height) {
        return Err(SegsieveError::DimensionMismatch {
            grid_width,
            grid_height,
            image_width,
            image_height,
        });
    }

    let classes = catalog.len();
    for (coord, label) in segmentation.label_grid.iter() {
        if (label as usize) >= classes {
            return Err(SegsieveError::InvalidLabel {
                label,
                x: coord.x,
                y: coord.y,
                classes,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LabelGrid;
    use image::RgbaImage;

    fn seg(grid_w: u32, grid_h: u32, img_w: u32, img_h: u32, label: u16) -> SegmentationResult {
        SegmentationResult::new(
            LabelGrid::from_fn(grid_w, grid_h, |_, _| label),
            RgbaImage::new(img_w, img_h),
        )
    }

    #[test]
    fn test_matching_input_passes() {
        let catalog = ClassCatalog::pascal_voc();
        assert!(validate_segmentation(&seg(4, 3, 4, 3, 7), &catalog).is_ok());
    }

    #[test]
    fn test_extent_disagreement_rejected() {
        let catalog = ClassCatalog::pascal_voc();
        let err = validate_segmentation(&seg(4, 3, 4, 4, 0), &catalog).unwrap_err();
        assert!(matches!(
            err,
            SegsieveError::DimensionMismatch {
                grid_width: 4,
                grid_height: 3,
                image_width: 4,
                image_height: 4,
            }
        ));
    }

    #[test]
    fn test_out_of_range_label_rejected() {
        let catalog = ClassCatalog::pascal_voc();
        let err = validate_segmentation(&seg(2, 2, 2, 2, 21), &catalog).unwrap_err();
        match err {
            SegsieveError::InvalidLabel {
                label,
                x,
                y,
                classes,
            } => {
                assert_eq!(label, 21);
                // First offending cell in scan order.
                assert_eq!((x, y), (0, 0));
                assert_eq!(classes, 21);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_max_valid_label_accepted() {
        let catalog = ClassCatalog::pascal_voc();
        assert!(validate_segmentation(&seg(2, 2, 2, 2, 20), &catalog).is_ok());
    }
}
