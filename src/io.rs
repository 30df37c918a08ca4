// File-level entry point.
//
// `compare_files()` resolves the comparison mode from the two paths, orders
// the inputs so the APK is always the first container in bundle mode, opens
// both containers for the duration of the run and hands them to the engine.
// Containers are dropped (and their file handles closed) on every return
// path, including errors.

use std::path::Path;

use crate::archive::Container;
use crate::engine::{CompareError, CompareOptions, Mode, compare_containers, is_bundle};
use crate::verdict::{CompareStats, Phase, Verdict};

/// Compare the containers at `first` and `second`.
///
/// Identical paths succeed immediately without touching the files.
pub fn compare_files(
    first: &Path,
    second: &Path,
    opts: &CompareOptions,
) -> Result<Verdict, CompareError> {
    if first == second {
        log::info!("{} compared with itself", first.display());
        return Ok(Verdict::same(Phase::Identical, CompareStats::default()));
    }

    let mode = match opts.mode {
        Some(mode) => mode,
        None => Mode::detect(first, second)?,
    };
    let (first, second) = orient(first, second, mode);

    let mut a = Container::open(first)?;
    let mut b = Container::open(second)?;
    let verdict = compare_containers(&mut a, &mut b, mode, opts);

    log::info!(
        "{} vs {} ({mode}): {:?} at {}",
        first.display(),
        second.display(),
        verdict.outcome,
        verdict.phase.as_str()
    );
    Ok(verdict)
}

/// In bundle mode, put the APK side first. When both inputs are bundles the
/// order is kept.
fn orient<'a>(first: &'a Path, second: &'a Path, mode: Mode) -> (&'a Path, &'a Path) {
    if mode == Mode::Bundle && is_bundle(first) && !is_bundle(second) {
        log::debug!("bundle given first, swapping inputs");
        (second, first)
    } else {
        (first, second)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
