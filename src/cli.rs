// Command-line front end for apkdiff.
//
// `apkdiff <FIRST> <SECOND>` prints one line per diagnostic followed by
// "APKs are the same!" or "APKs are different!". The verdict is reported in
// text only: the exit status is 0 whenever a verdict was reached and 1 for
// usage errors, undeterminable modes and unreadable containers.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, ValueEnum, ValueHint};

use crate::compare::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::engine::{CompareOptions, Mode};
use crate::io::compare_files;
use crate::verdict::Verdict;

const USAGE: &str = "usage: apkdiff [OPTIONS] <FIRST> <SECOND>";
const SAME: &str = "APKs are the same!";
const DIFFERENT: &str = "APKs are different!";

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    let size = num
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))?;
    if size == 0 {
        return Err("size must be at least 1 byte".into());
    }
    Ok(size)
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Verify that two APKs, or an APK and an AAB, have the same contents.
#[derive(Parser, Debug)]
#[command(
    name = "apkdiff",
    version,
    about = "Reproducible-build checker for APK and AAB files"
)]
struct Cli {
    /// The two containers to compare (.apk or .aab).
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    paths: Vec<PathBuf>,

    /// Only print the verdict line.
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose logging (use multiple times for more detail).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Also write the verdict as JSON to stderr.
    #[arg(long = "json")]
    json_output: bool,

    /// Additional entry name to ignore (repeatable).
    #[arg(long = "ignore", value_name = "NAME", action = ArgAction::Append)]
    ignore: Vec<String>,

    /// Comparison mode; `auto` picks it from the file suffixes.
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    mode: ModeArg,

    /// Read size for content comparison (supports K/M/G suffix).
    #[arg(long = "chunk-size", value_parser = parse_byte_size, default_value_t = DEFAULT_CHUNK_SIZE as u64)]
    chunk_size: u64,

    /// Print the built-in ignore sets and exit.
    #[arg(long = "list-ignores")]
    list_ignores: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Auto,
    Packages,
    Bundle,
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Options {
    paths: Vec<PathBuf>,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    extra_ignores: Vec<String>,
    mode: Option<Mode>,
    chunk_size: usize,
    list_ignores: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let mode = match cli.mode {
        ModeArg::Auto => None,
        ModeArg::Packages => Some(Mode::Packages),
        ModeArg::Bundle => Some(Mode::Bundle),
    };
    Options {
        paths: cli.paths,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        extra_ignores: cli.ignore,
        mode,
        chunk_size: usize::try_from(cli.chunk_size).unwrap_or(usize::MAX),
        list_ignores: cli.list_ignores,
    }
}

fn validate_options(opts: &Options) -> Result<(), String> {
    if opts.chunk_size > MAX_CHUNK_SIZE {
        return Err(format!(
            "--chunk-size: {} exceeds max {MAX_CHUNK_SIZE}",
            opts.chunk_size
        ));
    }
    Ok(())
}

fn build_compare_options(opts: &Options) -> CompareOptions {
    let defaults = CompareOptions::default();
    CompareOptions {
        chunk_size: opts.chunk_size,
        mode: opts.mode,
        package_ignores: defaults
            .package_ignores
            .with_extra(opts.extra_ignores.iter().cloned()),
        bundle_ignores: defaults
            .bundle_ignores
            .with_extra(opts.extra_ignores.iter().cloned()),
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("apkdiff".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        if validate_options(&opts).is_ok() {
            let _ = build_compare_options(&opts);
        }
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

fn report_lines(verdict: &Verdict, quiet: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(verdict.diagnostics.len() + 1);
    if !quiet {
        lines.extend(verdict.diagnostics.iter().map(ToString::to_string));
    }
    lines.push(if verdict.is_same() { SAME } else { DIFFERENT }.to_string());
    lines
}

fn verdict_json(first: &Path, second: &Path, verdict: &Verdict) -> serde_json::Value {
    let diagnostics: Vec<_> = verdict
        .diagnostics
        .iter()
        .map(|d| {
            serde_json::json!({
                "kind": d.kind(),
                "entry": d.entry_name(),
                "message": d.to_string(),
            })
        })
        .collect();
    serde_json::json!({
        "first": first.display().to_string(),
        "second": second.display().to_string(),
        "same": verdict.is_same(),
        "phase": verdict.phase.as_str(),
        "diagnostics": diagnostics,
        "stats": {
            "first_entries": verdict.stats.first_entries,
            "second_entries": verdict.stats.second_entries,
            "first_ignored": verdict.stats.first_ignored,
            "second_ignored": verdict.stats.second_ignored,
            "pairs_matched": verdict.stats.pairs_matched,
            "pairs_compared": verdict.stats.pairs_compared,
        },
    })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn ignore_listing(opts: &CompareOptions) -> Vec<String> {
    let mut lines = Vec::new();
    for mode in [Mode::Packages, Mode::Bundle] {
        lines.push(format!("{mode}:"));
        lines.extend(opts.ignores(mode).iter().map(|name| format!("  {name}")));
    }
    lines
}

fn cmd_list_ignores(opts: &Options) -> i32 {
    for line in ignore_listing(&build_compare_options(opts)) {
        println!("{line}");
    }
    0
}

fn cmd_compare(opts: &Options) -> i32 {
    let [first, second] = opts.paths.as_slice() else {
        eprintln!("{USAGE}");
        return 1;
    };

    let compare_opts = build_compare_options(opts);
    let verdict = match compare_files(first, second, &compare_opts) {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("apkdiff: {e}");
            return 1;
        }
    };

    for line in report_lines(&verdict, opts.quiet) {
        println!("{line}");
    }

    if opts.json_output {
        eprintln!("{:#}", verdict_json(first, second, &verdict));
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, runs the comparison.
pub fn run() -> ! {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };
    let opts = resolve_options(cli);

    if let Err(msg) = validate_options(&opts) {
        eprintln!("apkdiff: {msg}");
        process::exit(1);
    }

    let level = match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = if opts.list_ignores {
        cmd_list_ignores(&opts)
    } else {
        cmd_compare(&opts)
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
