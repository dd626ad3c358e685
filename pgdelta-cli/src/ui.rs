//! Progress reporting for long table walks.
//!
//! All progress output goes to stderr through indicatif so stdout stays
//! parseable (findings, JSON, SQL). Everything here is suppressed when
//! `--quiet` is set, `PGDELTA_QUIET=1`, or stderr is piped.

use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

static QUIET: OnceLock<bool> = OnceLock::new();

/// Resolve quiet mode once at startup from the flag, the environment,
/// and TTY detection.
pub fn init_quiet_mode(quiet_flag: bool) {
    let quiet = quiet_flag
        || matches!(std::env::var("PGDELTA_QUIET").as_deref(), Ok("1"))
        || !std::io::stderr().is_terminal();
    QUIET.set(quiet).ok();
}

pub fn is_quiet() -> bool {
    QUIET.get().copied().unwrap_or(false)
}

/// Spinner for a single unbounded step (introspection, profiling).
pub fn spinner(msg: impl Into<String>) -> Option<ProgressBar> {
    if is_quiet() {
        return None;
    }
    let bar = ProgressBar::new_spinner().with_message(msg.into());
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
            .expect("static template"),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    Some(bar)
}

/// Bar for the table walk. Starts with no length; the comparison engine
/// sets it once both catalogs are loaded and ticks once per table.
pub fn table_walk_bar(msg: impl Into<String>) -> Option<ProgressBar> {
    if is_quiet() {
        return None;
    }
    let bar = ProgressBar::new(0).with_message(msg.into());
    bar.set_style(
        ProgressStyle::with_template("{msg:24} {wide_bar:.green} {pos}/{len} tables")
            .expect("static template"),
    );
    Some(bar)
}

/// Clear the bar (if any) and print a closing line on stderr.
pub fn finish(bar: Option<ProgressBar>, outcome: impl AsRef<str>) {
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    if !is_quiet() {
        eprintln!("{}", outcome.as_ref());
    }
}
