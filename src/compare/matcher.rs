// Entry matching between two filtered entry lists.
//
// Both algorithms pair entries by name with set semantics: a candidate from
// the second list is consumed by its first match and can never be paired
// again. Candidates are indexed by name up front; each name keeps a queue of
// unconsumed positions in list order, so "first unconsumed candidate with
// this name" is a pop from the front of that queue.

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};

use super::normalize::normalize;
use crate::verdict::Diagnostic;

/// Package entries under this prefix are never looked up in a bundle.
pub const RESOURCE_PREFIX: &str = "res/";

/// Result of a matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// `(first_index, second_index)` positions into the two input lists, in
    /// the order the first list was walked.
    pub pairs: Vec<(usize, usize)>,
    /// Dangling entries. Empty when matching succeeded.
    pub diagnostics: Vec<Diagnostic>,
}

impl MatchOutcome {
    fn failed(pairs: Vec<(usize, usize)>, diagnostic: Diagnostic) -> Self {
        Self {
            pairs,
            diagnostics: vec![diagnostic],
        }
    }

    /// Whether every entry that had to be matched was matched.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Name index
// ---------------------------------------------------------------------------

struct NameIndex<'a> {
    slots: HashMap<&'a str, VecDeque<usize>>,
}

impl<'a> NameIndex<'a> {
    fn new(names: impl Iterator<Item = &'a str>) -> Self {
        let mut slots: HashMap<&'a str, VecDeque<usize>> = HashMap::new();
        for (pos, name) in names.enumerate() {
            slots.entry(name).or_default().push_back(pos);
        }
        Self { slots }
    }

    /// Consume the first unconsumed position carrying `name`.
    fn take(&mut self, name: &str) -> Option<usize> {
        self.slots.get_mut(name)?.pop_front()
    }

    /// Unconsumed positions, in list order.
    fn remaining(self) -> Vec<usize> {
        let mut left: Vec<usize> = self.slots.into_values().flatten().collect();
        left.sort_unstable();
        left
    }
}

// ---------------------------------------------------------------------------
// APK vs APK
// ---------------------------------------------------------------------------

/// Match two APK entry lists by exact name.
///
/// Lists of different lengths fail before any pairing with
/// [`Diagnostic::EntryCountMismatch`]. Otherwise see [`pair_by_name`].
pub fn match_packages<A, B>(first: &[A], second: &[B]) -> MatchOutcome
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    if first.len() != second.len() {
        log::debug!(
            "entry count mismatch: {} != {}",
            first.len(),
            second.len()
        );
        return MatchOutcome::failed(
            Vec::new(),
            Diagnostic::EntryCountMismatch {
                first: first.len(),
                second: second.len(),
            },
        );
    }
    pair_by_name(first, second)
}

/// Pair every entry of `first` with an identically named, unconsumed entry
/// of `second`.
///
/// The first entry of `first` without a counterpart stops the pass with a
/// single [`Diagnostic::MissingInSecond`]. When all of `first` is paired,
/// every leftover entry of `second` is reported as
/// [`Diagnostic::MissingInFirst`].
pub fn pair_by_name<A, B>(first: &[A], second: &[B]) -> MatchOutcome
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let mut index = NameIndex::new(second.iter().map(|e| e.as_ref()));
    let mut pairs = Vec::with_capacity(first.len());

    for (i, entry) in first.iter().enumerate() {
        let name = entry.as_ref();
        match index.take(name) {
            Some(j) => pairs.push((i, j)),
            None => {
                log::debug!("{name}: no counterpart in second container");
                return MatchOutcome::failed(pairs, Diagnostic::MissingInSecond(name.to_owned()));
            }
        }
    }

    let diagnostics = index
        .remaining()
        .into_iter()
        .map(|j| Diagnostic::MissingInFirst(second[j].as_ref().to_owned()))
        .collect();

    MatchOutcome { pairs, diagnostics }
}

// ---------------------------------------------------------------------------
// APK vs AAB
// ---------------------------------------------------------------------------

/// Match APK entries against bundle entries by normalized bundle name.
///
/// APK entries under `res/` are skipped. The first APK entry with no bundle
/// counterpart stops the pass with [`Diagnostic::MissingInBundle`]. Bundle
/// entries left unmatched are not reported.
pub fn match_bundle<A, B>(package: &[A], bundle: &[B]) -> MatchOutcome
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let normalized: Vec<Cow<'_, str>> = bundle.iter().map(|b| normalize(b.as_ref())).collect();
    let mut index = NameIndex::new(normalized.iter().map(|n| &**n));
    let mut pairs = Vec::with_capacity(package.len());

    for (i, entry) in package.iter().enumerate() {
        let name = entry.as_ref();
        if name.starts_with(RESOURCE_PREFIX) {
            log::trace!("{name}: resource, skipped");
            continue;
        }
        match index.take(name) {
            Some(j) => pairs.push((i, j)),
            None => {
                log::debug!("{name}: no counterpart in bundle");
                return MatchOutcome::failed(pairs, Diagnostic::MissingInBundle(name.to_owned()));
            }
        }
    }

    MatchOutcome {
        pairs,
        diagnostics: Vec::new(),
    }
}
