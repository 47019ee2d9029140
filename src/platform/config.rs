// dmesg-recent - platform/config.rs
//
// Config directory resolution and config.toml loading with startup
// validation. Uses the `directories` crate for XDG (Linux), AppData
// (Windows) and Library (macOS) compliance.
//
// The config file is optional and advisory: problems are reported as
// warnings and the affected values fall back to their defaults.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for dmesg-recent configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/dmesg-recent/).
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined (e.g. no home directory for a system service).
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::debug!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[filter]` section.
    pub filter: FilterSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[filter]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FilterSection {
    /// Multiline continuation mode when neither -l nor -s is given.
    pub multiline: Option<bool>,
    /// Suffix of the temporary file written next to the stamp file.
    pub temp_suffix: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Default continuation mode is multiline.
    pub multiline: bool,
    /// Temporary stamp file suffix.
    pub temp_suffix: String,
    /// Logging level string (for init before tracing is configured).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            multiline: false,
            temp_suffix: constants::DEFAULT_TEMP_SUFFIX.to_string(),
            log_level: None,
        }
    }
}

/// Load and validate config.toml at `config_path`.
///
/// Returns the config and a list of non-fatal problems. A missing file
/// yields defaults with no warnings. An unreadable or unparseable file
/// yields defaults with one warning. Invalid individual values fall back
/// to their defaults, one warning each.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<ConfigError>) {
    let mut warnings = Vec::new();

    let metadata = match std::fs::metadata(config_path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
            return (AppConfig::default(), warnings);
        }
        Err(source) => {
            warnings.push(ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            });
            return (AppConfig::default(), warnings);
        }
    };

    if metadata.len() > constants::MAX_CONFIG_FILE_SIZE {
        warnings.push(ConfigError::FileTooLarge {
            path: config_path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_CONFIG_FILE_SIZE,
        });
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            warnings.push(ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            });
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            warnings.push(ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source,
            });
            return (AppConfig::default(), warnings);
        }
    };

    tracing::debug!(path = %config_path.display(), "Loaded config.toml");

    let (config, value_warnings) = validate(raw);
    warnings.extend(value_warnings);
    (config, warnings)
}

/// Validate each field of a parsed config, accumulating all problems.
fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    if let Some(multiline) = raw.filter.multiline {
        config.multiline = multiline;
    }

    // -- Filter: temp_suffix --
    if let Some(suffix) = raw.filter.temp_suffix {
        if !suffix.is_empty() && !suffix.contains(['/', '\\']) {
            config.temp_suffix = suffix;
        } else {
            warnings.push(ConfigError::InvalidValue {
                field: "filter.temp_suffix",
                value: suffix,
                expected: "a non-empty suffix without path separators",
            });
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let lower = level.to_lowercase();
        if constants::VALID_LOG_LEVELS.contains(&lower.as_str()) {
            config.log_level = Some(lower);
        } else {
            warnings.push(ConfigError::InvalidValue {
                field: "logging.level",
                value: level,
                expected: "one of error, warn, info, debug, trace",
            });
        }
    }

    (config, warnings)
}
