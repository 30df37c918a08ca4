//! apkdiff: reproducible-build verification for Android packages.
//!
//! Compares two APKs, or an APK against an AAB, entry by entry and
//! byte for byte, skipping the entries that legitimately differ between
//! builds (signatures, resource tables, ART profiles, the binary manifest).
//!
//! The crate provides:
//! - Zip container access and ignore sets (`archive`)
//! - Path normalization, entry matching and stream comparison (`compare`)
//! - The comparison engine (`engine`) and its result types (`verdict`)
//! - A path-level entry point (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use apkdiff::engine::CompareOptions;
//! use apkdiff::io::compare_files;
//!
//! let verdict = compare_files(
//!     Path::new("app-release.apk"),
//!     Path::new("app-store.apk"),
//!     &CompareOptions::default(),
//! )
//! .unwrap();
//! for diagnostic in &verdict.diagnostics {
//!     println!("{diagnostic}");
//! }
//! assert!(verdict.is_same());
//! ```

pub mod archive;
pub mod compare;
pub mod engine;
pub mod io;
pub mod verdict;

#[cfg(feature = "cli")]
pub mod cli;
