// Entry-level comparison primitives.
//
// # Modules
//
// - `normalize`: Bundle-to-package path rewriting (ordered rule tables)
// - `matcher`: Pairing of entries between two filtered lists
// - `stream`: Chunked byte-for-byte stream comparison

pub mod matcher;
pub mod normalize;
pub mod stream;

pub use matcher::{MatchOutcome, match_bundle, match_packages, pair_by_name};
pub use normalize::{BUNDLE_REMAPS, BUNDLE_STRIPS, PrefixRule, normalize, normalize_with};
pub use stream::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, compare_streams, compare_streams_default};
