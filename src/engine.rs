// Comparison engine: ties filtering, matching and byte comparison together.
//
// A run walks a fixed sequence of states:
//
//   Start -> Filtering -> Matching -> Comparing -> Succeeded
//                            |            |
//                            +-> Failed <-+
//
// Matching failures and the first content mismatch end the run. Every
// failure ends up in the returned `Verdict`; only problems with the inputs
// themselves (mode selection, unreadable containers) are errors.

use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use crate::archive::{Container, ContainerError, Entry, IgnoreSet, filter_entries};
use crate::compare::{DEFAULT_CHUNK_SIZE, compare_streams, match_bundle, match_packages};
use crate::verdict::{CompareStats, Diagnostic, Phase, Verdict};

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Which pair of container kinds is being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// APK vs APK: symmetric, exact names.
    Packages,
    /// APK vs AAB: every APK entry must appear in the bundle.
    Bundle,
}

pub const PACKAGE_EXTENSION: &str = "apk";
pub const BUNDLE_EXTENSION: &str = "aab";

impl Mode {
    /// Pick the mode from the input file suffixes.
    ///
    /// Two `.apk` inputs select [`Mode::Packages`]; an `.aab` on either side
    /// selects [`Mode::Bundle`]. Anything else is a
    /// [`CompareError::ModeSelection`]. Suffixes compare ASCII
    /// case-insensitively, so `APP.APK` is a package.
    pub fn detect(first: &Path, second: &Path) -> Result<Self, CompareError> {
        if has_extension(first, PACKAGE_EXTENSION) && has_extension(second, PACKAGE_EXTENSION) {
            Ok(Self::Packages)
        } else if is_bundle(first) || is_bundle(second) {
            Ok(Self::Bundle)
        } else {
            Err(CompareError::ModeSelection {
                first: first.to_path_buf(),
                second: second.to_path_buf(),
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Packages => "apk-vs-apk",
            Self::Bundle => "apk-vs-aab",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `path` carries the bundle suffix.
pub fn is_bundle(path: &Path) -> bool {
    has_extension(path, BUNDLE_EXTENSION)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for a comparison run.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Chunk size for the byte comparator.
    pub chunk_size: usize,
    /// Force a mode instead of detecting it from file suffixes.
    pub mode: Option<Mode>,
    /// Names exempt in APK-vs-APK mode.
    pub package_ignores: IgnoreSet,
    /// Names exempt in APK-vs-AAB mode.
    pub bundle_ignores: IgnoreSet,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: None,
            package_ignores: IgnoreSet::packages(),
            bundle_ignores: IgnoreSet::bundle(),
        }
    }
}

impl CompareOptions {
    /// The ignore set that applies to `mode`.
    pub fn ignores(&self, mode: Mode) -> &IgnoreSet {
        match mode {
            Mode::Packages => &self.package_ignores,
            Mode::Bundle => &self.bundle_ignores,
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Filtering,
    Matching,
    Comparing,
    Succeeded,
    Failed,
}

fn enter(from: State, to: State) -> State {
    log::debug!("engine: {from:?} -> {to:?}");
    to
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Compare two opened containers in `mode`.
///
/// In [`Mode::Bundle`] `first` is the APK and `second` the bundle.
pub fn compare_containers<RA, RB>(
    first: &mut Container<RA>,
    second: &mut Container<RB>,
    mode: Mode,
    opts: &CompareOptions,
) -> Verdict
where
    RA: Read + Seek,
    RB: Read + Seek,
{
    let mut state = State::Start;
    log::debug!(
        "comparing {} and {} ({mode})",
        first.label(),
        second.label()
    );

    state = enter(state, State::Filtering);
    let ignores = opts.ignores(mode);
    let first_entries: Vec<Entry> = filter_entries(first.entries(), ignores)
        .into_iter()
        .cloned()
        .collect();
    let second_entries: Vec<Entry> = filter_entries(second.entries(), ignores)
        .into_iter()
        .cloned()
        .collect();

    let mut stats = CompareStats {
        first_entries: first.len(),
        second_entries: second.len(),
        first_ignored: first.len() - first_entries.len(),
        second_ignored: second.len() - second_entries.len(),
        ..Default::default()
    };

    state = enter(state, State::Matching);
    let matched = match mode {
        Mode::Packages => match_packages(&first_entries, &second_entries),
        Mode::Bundle => match_bundle(&first_entries, &second_entries),
    };
    stats.pairs_matched = matched.pairs.len();
    if !matched.is_complete() {
        enter(state, State::Failed);
        return Verdict::different(Phase::Matching, matched.diagnostics, stats);
    }

    state = enter(state, State::Comparing);
    for &(i, j) in &matched.pairs {
        let a = &first_entries[i];
        let b = &second_entries[j];
        stats.pairs_compared += 1;

        match compare_entry(first, a, second, b, opts.chunk_size) {
            Ok(true) => log::trace!("{}: equal", a.name),
            Ok(false) => {
                log::debug!("{}: content differs", a.name);
                enter(state, State::Failed);
                return Verdict::different(
                    Phase::Comparing,
                    vec![Diagnostic::ContentMismatch(a.name.clone())],
                    stats,
                );
            }
            Err(e) => {
                log::warn!("{}: {e}", a.name);
                enter(state, State::Failed);
                return Verdict::different(
                    Phase::Comparing,
                    vec![Diagnostic::EntryRead {
                        name: a.name.clone(),
                        message: e.to_string(),
                    }],
                    stats,
                );
            }
        }
    }

    enter(state, State::Succeeded);
    log::info!(
        "{} pairs compared, {} + {} entries ignored",
        stats.pairs_compared,
        stats.first_ignored,
        stats.second_ignored
    );
    Verdict::same(Phase::Complete, stats)
}

fn compare_entry<RA, RB>(
    first: &mut Container<RA>,
    a: &Entry,
    second: &mut Container<RB>,
    b: &Entry,
    chunk_size: usize,
) -> Result<bool, ContainerError>
where
    RA: Read + Seek,
    RB: Read + Seek,
{
    let reader_a = first.open_entry(a)?;
    let reader_b = second.open_entry(b)?;
    compare_streams(reader_a, reader_b, chunk_size).map_err(|source| ContainerError::EntryRead {
        name: a.name.clone(),
        source,
    })
}

/// Compare two in-memory archives.
pub fn compare_memory(
    first: &[u8],
    second: &[u8],
    mode: Mode,
    opts: &CompareOptions,
) -> Result<Verdict, CompareError> {
    let mut a = Container::from_reader(Cursor::new(first), "first")?;
    let mut b = Container::from_reader(Cursor::new(second), "second")?;
    Ok(compare_containers(&mut a, &mut b, mode, opts))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that prevent a comparison from producing a verdict.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error(transparent)]
    Container(#[from] ContainerError),
    /// Neither APK-vs-APK nor APK-vs-AAB applies to the inputs.
    #[error(
        "cannot choose a comparison mode for {} and {}: expected two .apk files or an .aab",
        first.display(),
        second.display()
    )]
    ModeSelection { first: PathBuf, second: PathBuf },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Outcome;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn compare(a: &[(&str, &[u8])], b: &[(&str, &[u8])], mode: Mode) -> Verdict {
        compare_memory(
            &build_zip(a),
            &build_zip(b),
            mode,
            &CompareOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn detect_modes() {
        let p = Path::new;
        assert_eq!(Mode::detect(p("a.apk"), p("b.apk")).unwrap(), Mode::Packages);
        assert_eq!(Mode::detect(p("a.apk"), p("b.aab")).unwrap(), Mode::Bundle);
        assert_eq!(Mode::detect(p("a.aab"), p("b.apk")).unwrap(), Mode::Bundle);
        assert_eq!(Mode::detect(p("A.APK"), p("b.Apk")).unwrap(), Mode::Packages);
        assert!(matches!(
            Mode::detect(p("a.apk"), p("b.zip")),
            Err(CompareError::ModeSelection { .. })
        ));
        assert!(Mode::detect(p("apk"), p("aab")).is_err());
    }

    #[test]
    fn identical_packages_are_same() {
        let files: &[(&str, &[u8])] = &[("classes.dex", b"dex\n035"), ("lib/x.so", b"\x7fELF")];
        let verdict = compare(files, files, Mode::Packages);
        assert_eq!(verdict.outcome, Outcome::Same);
        assert_eq!(verdict.phase, Phase::Complete);
        assert_eq!(verdict.stats.pairs_compared, 2);
    }

    #[test]
    fn ignored_entries_may_differ() {
        let a: &[(&str, &[u8])] = &[
            ("classes.dex", b"same"),
            ("META-INF/CERT.RSA", b"sig-a"),
            ("resources.arsc", b"table-a"),
        ];
        let b: &[(&str, &[u8])] = &[
            ("META-INF/CERT.RSA", b"sig-b"),
            ("resources.arsc", b"table-b"),
            ("classes.dex", b"same"),
        ];
        let verdict = compare(a, b, Mode::Packages);
        assert!(verdict.is_same());
        assert_eq!(verdict.stats.first_ignored, 2);
        assert_eq!(verdict.stats.pairs_compared, 1);
    }

    #[test]
    fn content_mismatch_stops_comparison() {
        let a: &[(&str, &[u8])] = &[("a", b"1"), ("b", b"2"), ("c", b"3")];
        let b: &[(&str, &[u8])] = &[("a", b"1"), ("b", b"X"), ("c", b"Y")];
        let verdict = compare(a, b, Mode::Packages);
        assert_eq!(verdict.outcome, Outcome::Different);
        assert_eq!(verdict.phase, Phase::Comparing);
        assert_eq!(
            verdict.diagnostics,
            [Diagnostic::ContentMismatch("b".into())]
        );
        assert_eq!(verdict.stats.pairs_compared, 2);
    }

    #[test]
    fn count_mismatch_fails_matching() {
        let verdict = compare(&[("a.txt", b"x")], &[], Mode::Packages);
        assert_eq!(verdict.phase, Phase::Matching);
        assert_eq!(
            verdict.diagnostics,
            [Diagnostic::EntryCountMismatch {
                first: 1,
                second: 0
            }]
        );
    }

    #[test]
    fn bundle_mode_uses_bundle_ignores() {
        // baseline.prof is only exempt against a bundle; MANIFEST.MF only
        // between two APKs.
        let apk: &[(&str, &[u8])] = &[
            ("classes.dex", b"code"),
            ("assets/dexopt/baseline.prof", b"p1"),
            ("res/drawable/a.png", b"png"),
        ];
        let aab: &[(&str, &[u8])] = &[
            ("base/dex/classes.dex", b"code"),
            ("base/root/assets/dexopt/baseline.prof", b"p2"),
            ("BundleConfig.pb", b"cfg"),
        ];
        assert!(compare(apk, aab, Mode::Bundle).is_same());

        let apk: &[(&str, &[u8])] = &[("META-INF/MANIFEST.MF", b"m")];
        let verdict = compare(apk, &[], Mode::Bundle);
        assert_eq!(
            verdict.diagnostics,
            [Diagnostic::MissingInBundle("META-INF/MANIFEST.MF".into())]
        );
    }

    #[test]
    fn bundle_content_mismatch_names_apk_entry() {
        let verdict = compare(
            &[("lib/x.so", b"one")],
            &[("base/lib/x.so", b"two")],
            Mode::Bundle,
        );
        assert_eq!(
            verdict.diagnostics,
            [Diagnostic::ContentMismatch("lib/x.so".into())]
        );
    }

    #[test]
    fn custom_ignore_sets_are_honored() {
        let opts = CompareOptions {
            package_ignores: IgnoreSet::from_names(["build.txt"]),
            ..Default::default()
        };
        let a = build_zip(&[("build.txt", b"1"), ("resources.arsc", b"t")]);
        let b = build_zip(&[("build.txt", b"2"), ("resources.arsc", b"t")]);
        let verdict = compare_memory(&a, &b, Mode::Packages, &opts).unwrap();
        assert!(verdict.is_same());

        let b = build_zip(&[("build.txt", b"2"), ("resources.arsc", b"u")]);
        let verdict = compare_memory(&a, &b, Mode::Packages, &opts).unwrap();
        assert!(!verdict.is_same());
    }

    #[test]
    fn invalid_archive_is_an_error() {
        let good = build_zip(&[("a", b"1")]);
        let err = compare_memory(b"garbage", &good, Mode::Packages, &CompareOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CompareError::Container(ContainerError::InvalidArchive { .. })
        ));
    }
}
