// Structured comparison results.
//
// A `Verdict` is the single result of a comparison run: same or different,
// the phase the run ended in, and one `Diagnostic` per reportable event in
// the order they were produced. Presentation is left to the caller.

use std::fmt;

/// Final answer of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Same,
    Different,
}

/// The engine phase a run terminated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Both inputs named the same file; nothing was opened.
    Identical,
    /// Stopped while pairing entries.
    Matching,
    /// Stopped while comparing entry contents.
    Comparing,
    /// Every pair was compared.
    Complete,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identical => "identical",
            Self::Matching => "matching",
            Self::Comparing => "comparing",
            Self::Complete => "complete",
        }
    }
}

/// One reportable event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The filtered APK entry lists differ in length.
    EntryCountMismatch { first: usize, second: usize },
    /// An entry of the first APK has no counterpart in the second.
    MissingInSecond(String),
    /// An entry of the second APK was left unpaired.
    MissingInFirst(String),
    /// An APK entry has no counterpart in the bundle.
    MissingInBundle(String),
    /// A matched pair differs in content.
    ContentMismatch(String),
    /// A matched entry could not be read.
    EntryRead { name: String, message: String },
}

impl Diagnostic {
    /// Short machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EntryCountMismatch { .. } => "entry_count_mismatch",
            Self::MissingInSecond(_) => "missing_in_second",
            Self::MissingInFirst(_) => "missing_in_first",
            Self::MissingInBundle(_) => "missing_in_bundle",
            Self::ContentMismatch(_) => "content_mismatch",
            Self::EntryRead { .. } => "entry_read",
        }
    }

    /// Entry the event is about, if it concerns a single entry.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Self::EntryCountMismatch { .. } => None,
            Self::MissingInSecond(name)
            | Self::MissingInFirst(name)
            | Self::MissingInBundle(name)
            | Self::ContentMismatch(name)
            | Self::EntryRead { name, .. } => Some(name),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryCountMismatch { first, second } => {
                write!(f, "APK entry counts differ: {first} != {second}")
            }
            Self::MissingInSecond(name) => write!(f, "file {name} not found in second APK"),
            Self::MissingInFirst(name) => write!(f, "file {name} not found in first APK"),
            Self::MissingInBundle(name) => write!(f, "file {name} not found in AAB"),
            Self::ContentMismatch(name) => write!(f, "file {name} does not match"),
            Self::EntryRead { name, message } => {
                write!(f, "file {name} could not be read: {message}")
            }
        }
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareStats {
    /// Entries listed by the first container.
    pub first_entries: usize,
    /// Entries listed by the second container.
    pub second_entries: usize,
    /// Entries of the first container dropped by the ignore set.
    pub first_ignored: usize,
    /// Entries of the second container dropped by the ignore set.
    pub second_ignored: usize,
    /// Pairs produced by the matcher.
    pub pairs_matched: usize,
    /// Pairs whose contents were compared (including a failing one).
    pub pairs_compared: usize,
}

/// Result of one comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub phase: Phase,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: CompareStats,
}

impl Verdict {
    pub(crate) fn same(phase: Phase, stats: CompareStats) -> Self {
        Self {
            outcome: Outcome::Same,
            phase,
            diagnostics: Vec::new(),
            stats,
        }
    }

    pub(crate) fn different(
        phase: Phase,
        diagnostics: Vec<Diagnostic>,
        stats: CompareStats,
    ) -> Self {
        Self {
            outcome: Outcome::Different,
            phase,
            diagnostics,
            stats,
        }
    }

    pub fn is_same(&self) -> bool {
        self.outcome == Outcome::Same
    }
}
