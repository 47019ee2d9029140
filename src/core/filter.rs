// dmesg-recent - core/filter.rs
//
// The recent-line filter: a single forward pass over the input that copies
// every message newer than the cursor to the output, byte for byte.
// Core layer: works on any BufRead/Write pair, never touches the filesystem.

use crate::core::model::{ContinuationMode, LineKind, Status};
use crate::core::parser;
use crate::util::constants;
use crate::util::error::ScanError;
use std::io::{BufRead, Write};

/// Result of one pass over the input stream.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Timestamp of the most recent header when the scan stopped
    /// (0.0 if no header was seen).
    pub running_timestamp: f64,

    /// Highest header timestamp parsed during the scan.
    pub max_timestamp: Option<f64>,

    /// Lines consumed from the input, including the one that aborted the
    /// scan (if any).
    pub lines_read: u64,

    /// Lines copied to the output.
    pub lines_emitted: u64,

    /// The error that stopped the scan early, if any.
    pub error: Option<ScanError>,
}

impl ScanOutcome {
    /// Exit status contributed by the scan.
    pub fn status(&self) -> Status {
        if self.error.is_some() {
            Status::Fatal
        } else {
            Status::Success
        }
    }

    /// Cursor to persist after this scan, given the one it started from.
    ///
    /// Never moves backwards: empty input, or input whose timestamps are all
    /// older (e.g. after the ring buffer was cleared), keeps `previous`.
    pub fn next_cursor(&self, previous: f64) -> f64 {
        match self.max_timestamp {
            Some(max) if max > previous => max,
            _ => previous,
        }
    }
}

/// Copy the lines of `input` whose message is newer than `cursor` to `output`.
///
/// A line's message timestamp is that of the last header at or before it,
/// so continuation lines follow their header in or out. Lines before the
/// first header count as timestamp 0.
///
/// The scan stops at the first malformed header (strict mode only), output
/// write failure, or input read failure, and reports it in
/// [`ScanOutcome::error`]. Lines already written stay written.
pub fn filter_recent<R, W>(
    mut input: R,
    output: &mut W,
    cursor: f64,
    mode: ContinuationMode,
) -> ScanOutcome
where
    R: BufRead,
    W: Write + ?Sized,
{
    let mut outcome = ScanOutcome {
        running_timestamp: 0.0,
        max_timestamp: None,
        lines_read: 0,
        lines_emitted: 0,
        error: None,
    };
    let mut line = Vec::with_capacity(constants::LINE_BUFFER_CAPACITY);

    loop {
        line.clear();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(source) => {
                tracing::debug!(
                    after_line = outcome.lines_read,
                    error = %source,
                    "Input read failed"
                );
                outcome.error = Some(ScanError::Read {
                    line_number: outcome.lines_read,
                    source,
                });
                break;
            }
        }
        outcome.lines_read += 1;

        match parser::classify(&line, mode) {
            LineKind::Header(ts) => {
                outcome.running_timestamp = ts;
                outcome.max_timestamp = Some(outcome.max_timestamp.map_or(ts, |m| m.max(ts)));
            }
            LineKind::Continuation => {}
            LineKind::Unparsed => {
                // Leading boilerplate before the first non-zero header is
                // tolerated; after that the log format can no longer be trusted.
                if outcome.running_timestamp > 0.0 {
                    tracing::debug!(
                        line_number = outcome.lines_read,
                        running = outcome.running_timestamp,
                        "Line has no timestamp in strict mode"
                    );
                    outcome.error = Some(ScanError::MalformedHeader {
                        line_number: outcome.lines_read,
                        line: preview(&line),
                    });
                    break;
                }
                outcome.running_timestamp = 0.0;
            }
        }

        if outcome.running_timestamp > cursor {
            if let Err(source) = output.write_all(&line) {
                tracing::debug!(
                    line_number = outcome.lines_read,
                    error = %source,
                    "Output write failed"
                );
                outcome.error = Some(ScanError::Write {
                    line_number: outcome.lines_read,
                    source,
                });
                break;
            }
            outcome.lines_emitted += 1;
        }
    }

    let write_failed = matches!(outcome.error, Some(ScanError::Write { .. }));
    if !write_failed {
        if let Err(source) = output.flush() {
            tracing::debug!(error = %source, "Output flush failed");
            if outcome.error.is_none() {
                outcome.error = Some(ScanError::Write {
                    line_number: outcome.lines_read,
                    source,
                });
            }
        }
    }

    tracing::debug!(
        cursor,
        running = outcome.running_timestamp,
        max = ?outcome.max_timestamp,
        lines_read = outcome.lines_read,
        lines_emitted = outcome.lines_emitted,
        "Scan finished"
    );
    outcome
}

/// Printable, bounded rendering of a raw line for diagnostics.
fn preview(line: &[u8]) -> String {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end_matches(['\n', '\r']);
    match text.char_indices().nth(constants::DIAGNOSTIC_MAX_LINE_PREVIEW) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    fn run(input: &str, cursor: f64, mode: ContinuationMode) -> (String, ScanOutcome) {
        let mut out = Vec::new();
        let outcome = filter_recent(Cursor::new(input.as_bytes()), &mut out, cursor, mode);
        (String::from_utf8(out).unwrap(), outcome)
    }

    /// Writer that accepts `budget` writes, then fails.
    struct FailingWriter {
        budget: usize,
        written: Vec<u8>,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
            }
            self.budget -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Reader that yields `data`, then fails instead of reporting EOF.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "device gone")),
                n => Ok(n),
            }
        }
    }

    const SAMPLE: &str = "[50.0] old message\n\
                          [150.0] new message\n  continuation of new message\n\
                          [200.5] newest message\n";

    #[test]
    fn test_filter_emits_only_newer_messages() {
        let (out, outcome) = run(SAMPLE, 100.0, ContinuationMode::Strict);
        assert_eq!(
            out,
            "[150.0] new message\n  continuation of new message\n[200.5] newest message\n"
        );
        assert!(outcome.error.is_none());
        assert_eq!(outcome.lines_read, 4);
        assert_eq!(outcome.lines_emitted, 3);
        assert_eq!(outcome.max_timestamp, Some(200.5));
        assert_eq!(outcome.next_cursor(100.0), 200.5);
        assert_eq!(outcome.status(), Status::Success);
    }

    #[test]
    fn test_filter_equal_timestamp_is_not_reemitted() {
        let (out, _) = run(SAMPLE, 200.5, ContinuationMode::Strict);
        assert_eq!(out, "");
        let (out, _) = run(SAMPLE, 150.0, ContinuationMode::Strict);
        assert_eq!(out, "[200.5] newest message\n");
    }

    #[test]
    fn test_filter_skips_continuations_of_old_messages() {
        let input = "[10.0] old\n  old detail\n\tmore old detail\n[20.0] new\n  new detail\n";
        let (out, _) = run(input, 15.0, ContinuationMode::Strict);
        assert_eq!(out, "[20.0] new\n  new detail\n");
    }

    #[test]
    fn test_filter_strict_malformed_header_is_fatal() {
        let input = "[1.0] first\n[2.0] second\nnot a header\n[3.0] third\n";
        let (out, outcome) = run(input, 0.0, ContinuationMode::Strict);
        assert_eq!(out, "[1.0] first\n[2.0] second\n");
        assert_eq!(outcome.status(), Status::Fatal);
        match outcome.error {
            Some(ScanError::MalformedHeader { line_number, line }) => {
                assert_eq!(line_number, 3);
                assert_eq!(line, "not a header");
            }
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_filter_strict_tolerates_leading_boilerplate() {
        let input = "boot banner\n[0.000000] Linux version\nstill booting\n[1.5] real\n";
        let (out, outcome) = run(input, 0.0, ContinuationMode::Strict);
        assert!(outcome.error.is_none(), "unexpected error: {:?}", outcome.error);
        // Timestamp-0 lines never exceed a non-negative cursor.
        assert_eq!(out, "[1.5] real\n");
    }

    #[test]
    fn test_filter_multiline_treats_unparsed_as_continuation() {
        let input = "[1.0] first\ncontinued without indent\n[2.0] second\n";
        let (out, outcome) = run(input, 0.5, ContinuationMode::Multiline);
        assert!(outcome.error.is_none());
        assert_eq!(out, input);

        let (out, _) = run(input, 1.0, ContinuationMode::Multiline);
        assert_eq!(out, "[2.0] second\n");
    }

    #[test]
    fn test_filter_last_line_without_newline() {
        let (out, outcome) = run("[1.0] a\n[2.0] b", 1.0, ContinuationMode::Strict);
        assert_eq!(out, "[2.0] b");
        assert_eq!(outcome.lines_read, 2);
    }

    #[test]
    fn test_filter_passes_non_utf8_bytes_verbatim() {
        let input: &[u8] = b"[1.0] ok\n[2.0] \xff\xfe raw\n \xc3 cont\n";
        let mut out = Vec::new();
        let outcome = filter_recent(input, &mut out, 1.0, ContinuationMode::Strict);
        assert!(outcome.error.is_none());
        assert_eq!(out, b"[2.0] \xff\xfe raw\n \xc3 cont\n");
    }

    #[test]
    fn test_filter_empty_input_keeps_cursor() {
        let (out, outcome) = run("", 42.0, ContinuationMode::Strict);
        assert_eq!(out, "");
        assert_eq!(outcome.max_timestamp, None);
        assert_eq!(outcome.next_cursor(42.0), 42.0);
    }

    #[test]
    fn test_filter_older_input_never_lowers_cursor() {
        let (_, outcome) = run("[1.0] after reboot\n", 500.0, ContinuationMode::Strict);
        assert_eq!(outcome.next_cursor(500.0), 500.0);
    }

    #[test]
    fn test_filter_write_failure_is_fatal() {
        let mut out = FailingWriter {
            budget: 1,
            written: Vec::new(),
        };
        let outcome = filter_recent(
            SAMPLE.as_bytes(),
            &mut out,
            0.0,
            ContinuationMode::Strict,
        );
        assert_eq!(out.written, b"[50.0] old message\n");
        assert!(matches!(
            outcome.error,
            Some(ScanError::Write { line_number: 2, .. })
        ));
        assert_eq!(outcome.status(), Status::Fatal);
        assert_eq!(outcome.lines_emitted, 1);
    }

    #[test]
    fn test_filter_read_failure_after_processing_lines() {
        let reader = io::BufReader::new(FailingReader {
            data: Cursor::new(b"[1.0] a\n[2.0] b\n".to_vec()),
        });
        let mut out = Vec::new();
        let outcome = filter_recent(reader, &mut out, 0.0, ContinuationMode::Strict);
        assert_eq!(out, b"[1.0] a\n[2.0] b\n");
        assert!(matches!(
            outcome.error,
            Some(ScanError::Read { line_number: 2, .. })
        ));
        assert_eq!(outcome.status(), Status::Fatal);
    }

    #[test]
    fn test_preview_truncates_long_lines() {
        let long = "x".repeat(constants::DIAGNOSTIC_MAX_LINE_PREVIEW + 50);
        let shown = preview(long.as_bytes());
        assert!(shown.ends_with("..."));
        assert_eq!(shown.len(), constants::DIAGNOSTIC_MAX_LINE_PREVIEW + 3);
    }
}
