#![no_main]
use apkdiff::engine::{CompareOptions, Mode, compare_memory};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let opts = CompareOptions::default();
    // Malformed archives must surface as errors, never panics.
    if let Ok(verdict) = compare_memory(data, data, Mode::Packages, &opts) {
        // Entries whose data fails to inflate report as read errors; anything
        // readable must match itself.
        assert!(verdict.is_same() || !verdict.diagnostics.is_empty());
    }
    let _ = compare_memory(data, data, Mode::Bundle, &opts);
});
