// dmesg-recent - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// The only state that outlives a run is the cursor: the timestamp of the
// newest header already emitted by a previous run. Kernel timestamps are
// seconds since boot as printed by dmesg (`[  12.345678] ...`), so the
// cursor is a plain `f64`.

use std::process::ExitCode;

// =============================================================================
// Run status
// =============================================================================

/// Severity of a run's outcome, ordered from best to worst.
///
/// Errors accumulate with a worse-wins rule: once a run is `Fatal` it stays
/// `Fatal` no matter what succeeds afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Status {
    /// Everything succeeded.
    #[default]
    Success,
    /// A local problem (stamp file, usage); filtering itself was fine.
    Recoverable,
    /// The input or output stream failed, or the log was malformed.
    Fatal,
}

impl Status {
    /// Process exit code for this status.
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Recoverable => 1,
            Self::Fatal => 2,
        }
    }

    /// Combine two statuses, keeping the worse one.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }

    /// In-place form of [`Status::merge`].
    pub fn worsen(&mut self, other: Self) {
        *self = self.merge(other);
    }

    pub fn is_fatal(self) -> bool {
        self == Self::Fatal
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

// =============================================================================
// Continuation handling
// =============================================================================

/// How lines without a leading `[timestamp]` are attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuationMode {
    /// Only lines starting with whitespace continue the previous message.
    /// Any other line must carry a timestamp once a header has been seen.
    #[default]
    Strict,
    /// Every line that is not a valid header continues the previous message.
    Multiline,
}

impl ContinuationMode {
    /// Mode selected by a `multiline` on/off switch.
    pub fn from_multiline(multiline: bool) -> Self {
        if multiline {
            Self::Multiline
        } else {
            Self::Strict
        }
    }
}

// =============================================================================
// Line classification
// =============================================================================

/// What a single input line is, relative to message boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKind {
    /// Starts a new message with the given timestamp.
    Header(f64),
    /// Belongs to the most recent header.
    Continuation,
    /// Looks like it should be a header but carries no timestamp.
    Unparsed,
}
