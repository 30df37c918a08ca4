// Ignore sets and the entry filter.
//
// Entries listed in an ignore set are dropped before matching. They hold
// data that legitimately differs between two builds of the same sources:
// signatures, the compiled resource table, ART profiles and the binary
// manifest.

use std::collections::BTreeSet;

use super::container::Entry;

/// Entries exempt from APK-vs-APK comparison.
pub const PACKAGE_IGNORES: &[&str] = &[
    "META-INF/MANIFEST.MF",
    "META-INF/CERT.RSA",
    "META-INF/CERT.SF",
    "META-INF/BNDLTOOL.SF",
    "META-INF/BNDLTOOL.RSA",
    "stamp-cert-sha256",
    "resources.arsc",
    "res/xml/splits0.xml",
    "AndroidManifest.xml",
];

/// Entries exempt from APK-vs-AAB comparison.
pub const BUNDLE_IGNORES: &[&str] = &[
    "resources.arsc",
    "stamp-cert-sha256",
    "assets/dexopt/baseline.prof",
    "assets/dexopt/baseline.profm",
    "AndroidManifest.xml",
];

/// A set of exact entry names excluded from comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
}

impl IgnoreSet {
    /// Build a set from arbitrary names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in APK-vs-APK set.
    pub fn packages() -> Self {
        Self::from_names(PACKAGE_IGNORES.iter().copied())
    }

    /// The built-in APK-vs-AAB set.
    pub fn bundle() -> Self {
        Self::from_names(BUNDLE_IGNORES.iter().copied())
    }

    /// Return this set extended with `extra` names.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Whether `name` is ignored. Matching is exact and case-sensitive.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Drop every entry whose name is in `ignores`, keeping input order.
pub fn filter_entries<'a>(entries: &'a [Entry], ignores: &IgnoreSet) -> Vec<&'a Entry> {
    entries
        .iter()
        .filter(|entry| {
            let keep = !ignores.contains(&entry.name);
            if !keep {
                log::trace!("ignoring {}", entry.name);
            }
            keep
        })
        .collect()
}
