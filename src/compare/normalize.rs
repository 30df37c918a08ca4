// Bundle path normalization.
//
// An AAB nests the files of the base APK under module directories
// (`base/root/`, `base/dex/`, `base/manifest/`, `base/`) and keeps signing
// metadata under `BUNDLE-METADATA/`. Normalizing a bundle path maps it back
// into APK path space so it can be compared by name against APK entries.

use std::borrow::Cow;

/// Replace a leading `prefix` with `replacement` (empty to strip it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRule {
    pub prefix: &'static str,
    pub replacement: &'static str,
}

impl PrefixRule {
    pub const fn strip(prefix: &'static str) -> Self {
        Self {
            prefix,
            replacement: "",
        }
    }

    pub const fn remap(prefix: &'static str, replacement: &'static str) -> Self {
        Self {
            prefix,
            replacement,
        }
    }

    fn apply<'a>(&self, name: &'a str) -> Option<Cow<'a, str>> {
        let rest = name.strip_prefix(self.prefix)?;
        Some(if self.replacement.is_empty() {
            Cow::Borrowed(rest)
        } else {
            Cow::Owned(format!("{}{rest}", self.replacement))
        })
    }
}

/// Module prefixes; the first match is stripped. More specific prefixes
/// must come before `base/`.
pub const BUNDLE_STRIPS: &[PrefixRule] = &[
    PrefixRule::strip("base/root/"),
    PrefixRule::strip("base/dex/"),
    PrefixRule::strip("base/manifest/"),
    PrefixRule::strip("base/"),
];

/// Applied after stripping; the first match is rewritten.
pub const BUNDLE_REMAPS: &[PrefixRule] = &[PrefixRule::remap("BUNDLE-METADATA/", "META-INF/")];

/// Map a bundle entry name into APK path space.
pub fn normalize(name: &str) -> Cow<'_, str> {
    normalize_with(name, BUNDLE_STRIPS, BUNDLE_REMAPS)
}

/// Rule-driven form of [`normalize`]: at most one rule from `strips`, then
/// at most one rule from `remaps`, each first-match-wins.
pub fn normalize_with<'a>(
    name: &'a str,
    strips: &[PrefixRule],
    remaps: &[PrefixRule],
) -> Cow<'a, str> {
    let stripped = first_match(name, strips).unwrap_or(Cow::Borrowed(name));
    let remapped = first_match(&stripped, remaps).map(Cow::into_owned);
    match remapped {
        Some(remapped) => Cow::Owned(remapped),
        None => stripped,
    }
}

fn first_match<'a>(name: &'a str, rules: &[PrefixRule]) -> Option<Cow<'a, str>> {
    rules.iter().find_map(|rule| rule.apply(name))
}
