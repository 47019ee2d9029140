// dmesg-recent - app/run.rs
//
// One invocation of the filter, in three phases:
//   1. load the cursor from the stamp file,
//   2. stream the input through the recent-line filter,
//   3. atomically persist the new cursor.
//
// Problems are folded into one worse-wins `Status`. Stamp-file problems are
// recoverable and never stop filtering. A fatal scan error skips phase 3 so
// the cursor is never advanced past output that was not fully written.

use crate::core::filter;
use crate::core::model::{ContinuationMode, Status};
use crate::platform::stamp;
use crate::util::constants;
use crate::util::error::DmesgRecentError;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Everything a run needs besides its streams.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path of the stamp file holding the cursor.
    pub stamp_path: PathBuf,
    /// How lines without a timestamp are attributed.
    pub mode: ContinuationMode,
    /// Suffix of the sibling temporary file used for the atomic save.
    pub temp_suffix: String,
}

impl RunOptions {
    pub fn new(stamp_path: impl Into<PathBuf>, mode: ContinuationMode) -> Self {
        Self {
            stamp_path: stamp_path.into(),
            mode,
            temp_suffix: constants::DEFAULT_TEMP_SUFFIX.to_string(),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Worst status encountered; becomes the exit code.
    pub status: Status,
    /// Cursor loaded at the start (0.0 if missing or unreadable).
    pub previous_cursor: f64,
    /// Cursor written to the stamp file, if the save succeeded.
    pub saved_cursor: Option<f64>,
    pub lines_read: u64,
    pub lines_emitted: u64,
    /// Every problem encountered, in order.
    pub errors: Vec<DmesgRecentError>,
}

/// Run the filter over `input`, writing new lines to `output`.
///
/// `on_error` is called as soon as each problem occurs, so diagnostics are
/// not held back until the input ends; the same errors are also returned in
/// [`RunOutcome::errors`].
pub fn run<R, W, F>(options: &RunOptions, input: R, output: &mut W, mut on_error: F) -> RunOutcome
where
    R: BufRead,
    W: Write + ?Sized,
    F: FnMut(&DmesgRecentError),
{
    let mut status = Status::Success;
    let mut errors = Vec::new();
    let mut record = |err: DmesgRecentError, status: &mut Status| {
        on_error(&err);
        status.worsen(err.status());
        errors.push(err);
    };

    // -- Phase 1: cursor --
    let previous_cursor = match stamp::load(&options.stamp_path) {
        Ok(Some(cursor)) => cursor,
        Ok(None) => constants::INITIAL_CURSOR,
        Err(e) => {
            record(e.into(), &mut status);
            constants::INITIAL_CURSOR
        }
    };

    // -- Phase 2: scan --
    let mut scan = filter::filter_recent(input, output, previous_cursor, options.mode);
    status.worsen(scan.status());
    if let Some(e) = scan.error.take() {
        record(e.into(), &mut status);
    }

    // -- Phase 3: persist --
    let mut saved_cursor = None;
    if status.is_fatal() {
        tracing::debug!(
            path = %options.stamp_path.display(),
            "Scan aborted; stamp file left unchanged"
        );
    } else {
        let next = scan.next_cursor(previous_cursor);
        match stamp::save(&options.stamp_path, next, &options.temp_suffix) {
            Ok(()) => saved_cursor = Some(next),
            Err(e) => record(e.into(), &mut status),
        }
    }

    tracing::info!(
        previous_cursor,
        saved_cursor = ?saved_cursor,
        lines_read = scan.lines_read,
        lines_emitted = scan.lines_emitted,
        status = status.code(),
        "Run finished"
    );

    RunOutcome {
        status,
        previous_cursor,
        saved_cursor,
        lines_read: scan.lines_read,
        lines_emitted: scan.lines_emitted,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::error::{ScanError, StampError};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_collect(options: &RunOptions, input: &str) -> (String, RunOutcome, usize) {
        let mut out = Vec::new();
        let mut reported = 0;
        let outcome = run(options, Cursor::new(input.as_bytes()), &mut out, |_| {
            reported += 1
        });
        (String::from_utf8(out).unwrap(), outcome, reported)
    }

    #[test]
    fn test_run_first_run_without_stamp_file() {
        let dir = TempDir::new().unwrap();
        let options = RunOptions::new(dir.path().join("stamp"), ContinuationMode::Strict);

        let (out, outcome, reported) = run_collect(&options, "[1.0] a\n[2.0] b\n");
        assert_eq!(out, "[1.0] a\n[2.0] b\n");
        assert_eq!(outcome.status, Status::Success);
        assert_eq!(outcome.previous_cursor, 0.0);
        assert_eq!(outcome.saved_cursor, Some(2.0));
        assert_eq!(reported, 0);
        assert_eq!(
            std::fs::read_to_string(&options.stamp_path).unwrap(),
            "2.000000\n"
        );
    }

    #[test]
    fn test_run_corrupt_stamp_is_recoverable_and_rewritten() {
        let dir = TempDir::new().unwrap();
        let options = RunOptions::new(dir.path().join("stamp"), ContinuationMode::Strict);
        std::fs::write(&options.stamp_path, "corrupt").unwrap();

        let (out, outcome, reported) = run_collect(&options, "[1.0] a\n");
        assert_eq!(out, "[1.0] a\n");
        assert_eq!(outcome.status, Status::Recoverable);
        assert_eq!(reported, 1);
        assert!(matches!(
            outcome.errors.as_slice(),
            [DmesgRecentError::Stamp(StampError::Parse { .. })]
        ));
        assert_eq!(outcome.saved_cursor, Some(1.0));
    }

    #[test]
    fn test_run_fatal_scan_leaves_stamp_unchanged() {
        let dir = TempDir::new().unwrap();
        let options = RunOptions::new(dir.path().join("stamp"), ContinuationMode::Strict);
        std::fs::write(&options.stamp_path, "1.000000\n").unwrap();

        let (out, outcome, _) = run_collect(&options, "[2.0] ok\nbroken\n[3.0] never\n");
        assert_eq!(out, "[2.0] ok\n");
        assert_eq!(outcome.status, Status::Fatal);
        assert_eq!(outcome.saved_cursor, None);
        assert!(matches!(
            outcome.errors.as_slice(),
            [DmesgRecentError::Scan(ScanError::MalformedHeader { .. })]
        ));
        assert_eq!(
            std::fs::read_to_string(&options.stamp_path).unwrap(),
            "1.000000\n"
        );
    }

    #[test]
    fn test_run_save_failure_is_recoverable() {
        let dir = TempDir::new().unwrap();
        let options = RunOptions::new(
            dir.path().join("missing-dir").join("stamp"),
            ContinuationMode::Strict,
        );

        let (out, outcome, reported) = run_collect(&options, "[1.0] a\n");
        assert_eq!(out, "[1.0] a\n", "output is not undone by a failed save");
        assert_eq!(outcome.status, Status::Recoverable);
        assert_eq!(outcome.saved_cursor, None);
        assert_eq!(reported, 1);
    }

    #[test]
    fn test_run_custom_temp_suffix() {
        let dir = TempDir::new().unwrap();
        let mut options = RunOptions::new(dir.path().join("stamp"), ContinuationMode::Multiline);
        options.temp_suffix = ".partial".to_string();

        let (_, outcome, _) = run_collect(&options, "[4.0] a\nno indent\n");
        assert_eq!(outcome.status, Status::Success);
        assert_eq!(outcome.lines_emitted, 2);
        assert!(!dir.path().join("stamp.partial").exists());
        assert_eq!(outcome.saved_cursor, Some(4.0));
    }
}
