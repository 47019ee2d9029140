// dmesg-recent - util/constants.rs
//
// Single source of truth for named constants and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "dmesg-recent";

/// Application identifier used for the platform config directory.
pub const APP_ID: &str = "dmesg-recent";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Stamp file
// =============================================================================

/// Cursor value used when no stamp file exists or it cannot be read.
pub const INITIAL_CURSOR: f64 = 0.0;

/// Suffix appended to the stamp path to form the sibling temporary file.
pub const DEFAULT_TEMP_SUFFIX: &str = ".tmp";

/// Fractional digits written to the stamp file (`%lf` compatible).
pub const STAMP_PRECISION: usize = 6;

/// Only this many leading bytes of a stamp file are read; the value is a
/// single number at the start of the file.
pub const MAX_STAMP_READ_BYTES: u64 = 4 * 1024; // 4 KB

// =============================================================================
// Scanning
// =============================================================================

/// Initial capacity of the reusable line buffer.
pub const LINE_BUFFER_CAPACITY: usize = 1024;

/// Maximum number of bytes of an offending line quoted in a diagnostic.
pub const DIAGNOSTIC_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration / logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug nor config set one.
///
/// Kept at `warn` so normal runs print nothing but the one-line diagnostics.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Config file name, looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum config file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KB
