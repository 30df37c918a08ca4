#![no_main]
use apkdiff::compare::normalize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let name = String::from_utf8_lossy(data);
    let out = normalize(&name);
    assert!(out.len() <= name.len() || name.starts_with("BUNDLE-METADATA/"));
    if !name.starts_with("base/") && !name.starts_with("BUNDLE-METADATA/") {
        assert_eq!(out, name);
    }
});
