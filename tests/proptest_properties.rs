use std::io::{Cursor, Write};

use apkdiff::compare::{compare_streams, match_packages, normalize};
use apkdiff::engine::{CompareOptions, Mode, compare_memory};
use proptest::prelude::*;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn zip_bytes(files: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn entry_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(/[a-z]{1,6}){0,2}\\.(dex|so|bin)"
}

/// Up to eight uniquely named entries.
fn archive() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    proptest::collection::btree_map(entry_name(), proptest::collection::vec(any::<u8>(), 0..64), 0..8)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_stream_compare_is_byte_equality(
        a in proptest::collection::vec(any::<u8>(), 0..2048),
        b in proptest::collection::vec(any::<u8>(), 0..2048),
        chunk in 1usize..600
    ) {
        let same = compare_streams(&a[..], &b[..], chunk).unwrap();
        prop_assert_eq!(same, a == b);
    }

    #[test]
    fn prop_stream_compare_ignores_chunk_size(
        a in proptest::collection::vec(any::<u8>(), 0..4096),
        flip in proptest::option::of(0usize..4096),
        c1 in 1usize..5000,
        c2 in 1usize..5000
    ) {
        let mut b = a.clone();
        if let Some(i) = flip {
            if i < b.len() {
                b[i] ^= 0x80;
            }
        }
        let r1 = compare_streams(&a[..], &b[..], c1).unwrap();
        let r2 = compare_streams(&a[..], &b[..], c2).unwrap();
        prop_assert_eq!(r1, r2);
    }

    #[test]
    fn prop_package_mode_is_symmetric(a in archive(), b in archive()) {
        let za = zip_bytes(&a);
        let zb = zip_bytes(&b);
        let opts = CompareOptions::default();
        let ab = compare_memory(&za, &zb, Mode::Packages, &opts).unwrap();
        let ba = compare_memory(&zb, &za, Mode::Packages, &opts).unwrap();
        prop_assert_eq!(ab.outcome, ba.outcome);
    }

    #[test]
    fn prop_archive_matches_itself(a in archive()) {
        let z = zip_bytes(&a);
        let verdict = compare_memory(&z, &z, Mode::Packages, &CompareOptions::default()).unwrap();
        prop_assert!(verdict.is_same());
        prop_assert_eq!(verdict.stats.pairs_compared, a.len());
    }

    #[test]
    fn prop_matching_ignores_order(names in proptest::collection::btree_set(entry_name(), 0..16)) {
        let forward: Vec<String> = names.iter().cloned().collect();
        let reverse: Vec<String> = names.iter().rev().cloned().collect();
        let outcome = match_packages(&forward, &reverse);
        prop_assert!(outcome.is_complete());
        prop_assert_eq!(outcome.pairs.len(), names.len());
    }

    #[test]
    fn prop_base_prefix_is_stripped(name in entry_name()) {
        prop_assume!(!name.starts_with("root/") && !name.starts_with("dex/") && !name.starts_with("manifest/"));
        let bundled = format!("base/{name}");
        prop_assert_eq!(normalize(&bundled), name.as_str());
    }

    #[test]
    fn prop_unprefixed_names_pass_through(name in entry_name()) {
        prop_assume!(!name.starts_with("base/"));
        prop_assert_eq!(normalize(&name), name.as_str());
    }
}
