//! Fuzz target for grayscale-PNG label-mask parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the mask decoder,
//! checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use segsieve::grid::io_png::label_grid_from_png_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let _ = label_grid_from_png_slice(data);
});
