//! Fuzz target for detected-objects report parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the report parser,
//! checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use segsieve::report::from_json_slice;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid OOM on very large inputs.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let _ = from_json_slice(data);
});
