// dmesg-recent - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every error knows its severity so the run can fold them into one exit
// status (see `core::model::Status`).

use crate::core::model::Status;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all dmesg-recent operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum DmesgRecentError {
    /// Stamp file could not be read, parsed, or replaced.
    Stamp(StampError),

    /// Filtering the input stream failed.
    Scan(ScanError),

    /// Configuration loading failed.
    Config(ConfigError),
}

impl DmesgRecentError {
    /// Contribution of this error to the process exit status.
    pub fn status(&self) -> Status {
        match self {
            Self::Stamp(_) => Status::Recoverable,
            Self::Scan(_) => Status::Fatal,
            // Config problems fall back to defaults and are only reported.
            Self::Config(_) => Status::Success,
        }
    }
}

impl fmt::Display for DmesgRecentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stamp(e) => write!(f, "{e}"),
            Self::Scan(e) => write!(f, "{e}"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DmesgRecentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stamp(e) => Some(e),
            Self::Scan(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Stamp errors
// ---------------------------------------------------------------------------

/// Errors related to loading or persisting the cursor stamp file.
///
/// All of these are local: the filter still runs (or has already run)
/// and the exit status is raised to at least 1.
#[derive(Debug)]
pub enum StampError {
    /// The stamp file exists but could not be opened or read.
    Read { path: PathBuf, source: io::Error },

    /// The stamp file does not start with a floating-point number.
    Parse { path: PathBuf, content: String },

    /// The temporary stamp file could not be created.
    Create { path: PathBuf, source: io::Error },

    /// Writing the new value to the temporary file failed.
    Write { path: PathBuf, source: io::Error },

    /// Flushing the temporary file to disk before closing it failed.
    Flush { path: PathBuf, source: io::Error },

    /// Renaming the temporary file over the stamp file failed.
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for StampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Error reading stampfile '{}': {source}", path.display())
            }
            Self::Parse { path, content } => write!(
                f,
                "Error reading stampfile '{}': Parse error (found {content:?})",
                path.display()
            ),
            Self::Create { path, source } => write!(
                f,
                "Error opening stampfile '{}' for write: {source}",
                path.display()
            ),
            Self::Write { path, source } => {
                write!(f, "Error writing stampfile '{}': {source}", path.display())
            }
            Self::Flush { path, source } => {
                write!(f, "Error closing stampfile '{}': {source}", path.display())
            }
            Self::Rename { from, to, source } => write!(
                f,
                "Error renaming stampfile '{}' to '{}': {source}",
                from.display(),
                to.display()
            ),
        }
    }
}

impl std::error::Error for StampError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. }
            | Self::Create { source, .. }
            | Self::Write { source, .. }
            | Self::Flush { source, .. }
            | Self::Rename { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

impl From<StampError> for DmesgRecentError {
    fn from(e: StampError) -> Self {
        Self::Stamp(e)
    }
}

// ---------------------------------------------------------------------------
// Scan errors
// ---------------------------------------------------------------------------

/// Errors that abort the scan of the input stream. All are fatal: the
/// cursor is not advanced after any of them.
#[derive(Debug)]
pub enum ScanError {
    /// A non-continuation line has no leading `[timestamp]` (strict mode).
    MalformedHeader { line_number: u64, line: String },

    /// Writing a line to the output stream failed.
    Write { line_number: u64, source: io::Error },

    /// Reading from the input stream failed.
    Read { line_number: u64, source: io::Error },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader { line_number, line } => {
                write!(f, "dmesg parse error at line {line_number}: '{line}'")
            }
            Self::Write { source, .. } => write!(f, "Error writing log: {source}"),
            Self::Read { line_number, source } => {
                write!(f, "Read error after line {line_number}: {source}")
            }
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Write { source, .. } | Self::Read { source, .. } => Some(source),
            Self::MalformedHeader { .. } => None,
        }
    }
}

impl From<ScanError> for DmesgRecentError {
    fn from(e: ScanError) -> Self {
        Self::Scan(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A config value is out of the allowed range.
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Config '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::InvalidValue {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is not valid. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for DmesgRecentError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
