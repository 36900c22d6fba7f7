#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use segsieve::grid::{LabelGrid, SegmentationResult};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A segmentation result with labels in `[0, classes)` over a grid of up
/// to `max_side`×`max_side` pixels and pseudo-random pixel colors.
pub fn arb_segmentation(max_side: u32, classes: u16) -> BoxedStrategy<SegmentationResult> {
    (1..=max_side, 1..=max_side)
        .prop_flat_map(move |(width, height)| {
            let cells = (width as usize) * (height as usize);
            proptest::collection::vec(0..classes, cells).prop_map(move |labels| {
                let grid = LabelGrid::from_raw(width, height, labels).expect("sized labels");
                let mut image = RgbaImage::new(width, height);
                for (x, y, pixel) in image.enumerate_pixels_mut() {
                    // Deterministic but varied colors; the properties only
                    // need colors to differ between pixels.
                    *pixel = Rgba([
                        (x * 7 % 256) as u8,
                        (y * 13 % 256) as u8,
                        ((x + y) * 29 % 256) as u8,
                        255,
                    ]);
                }
                SegmentationResult::new(grid, image)
            })
        })
        .boxed()
}
