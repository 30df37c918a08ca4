// Zip container access for APK/AAB files.
//
// # Modules
//
// - `container`: Random-access container reader (entry list + open-for-read)
// - `filter`: Ignore sets and the entry filter applied before matching

pub mod container;
pub mod filter;

pub use container::{Container, ContainerError, Entry};
pub use filter::{BUNDLE_IGNORES, IgnoreSet, PACKAGE_IGNORES, filter_entries};
