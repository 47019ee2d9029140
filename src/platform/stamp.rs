// dmesg-recent - platform/stamp.rs
//
// Stamp file persistence: the cursor marking what earlier runs emitted.
//
// Design principles:
// - A missing stamp file is the normal first run, not an error.
// - The file is replaced atomically (write temp → sync → rename) so it is
//   never observed half-written, even if the process dies mid-save.
// - No locking: two instances sharing one stamp file race, and the caller
//   must not run them concurrently.

use crate::core::parser;
use crate::util::constants;
use crate::util::error::StampError;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Load the cursor from `path`.
///
/// Returns `Ok(None)` when the file does not exist. The file is read with a
/// `%lf`-style scan: leading whitespace is skipped and anything after the
/// number is ignored.
pub fn load(path: &Path) -> Result<Option<f64>, StampError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No stamp file; starting from the beginning");
            return Ok(None);
        }
        Err(source) => {
            return Err(StampError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut bytes = Vec::new();
    file.take(constants::MAX_STAMP_READ_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|source| StampError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let content = String::from_utf8_lossy(&bytes);

    match parser::parse_leading_float(&content) {
        Some(cursor) => {
            tracing::debug!(path = %path.display(), cursor, "Stamp file loaded");
            Ok(Some(cursor))
        }
        None => Err(StampError::Parse {
            path: path.to_path_buf(),
            content: content.trim().chars().take(40).collect(),
        }),
    }
}

/// Sibling temporary path used while replacing `path`.
pub fn temp_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Text written to the stamp file for `cursor`.
pub fn format_stamp(cursor: f64) -> String {
    format!("{cursor:.prec$}\n", prec = constants::STAMP_PRECISION)
}

/// Atomically replace the stamp file at `path` with `cursor`.
///
/// The value is written to `path` + `temp_suffix`, synced to disk, and
/// renamed over `path`. On failure the temporary file is removed and the
/// previous stamp file is left as it was.
pub fn save(path: &Path, cursor: f64, temp_suffix: &str) -> Result<(), StampError> {
    let tmp = temp_path(path, temp_suffix);

    let mut file = File::create(&tmp).map_err(|source| StampError::Create {
        path: tmp.clone(),
        source,
    })?;

    let written = file
        .write_all(format_stamp(cursor).as_bytes())
        .map_err(|source| StampError::Write {
            path: tmp.clone(),
            source,
        })
        .and_then(|()| {
            file.sync_all().map_err(|source| StampError::Flush {
                path: tmp.clone(),
                source,
            })
        });
    drop(file);

    let result = written.and_then(|()| {
        std::fs::rename(&tmp, path).map_err(|source| StampError::Rename {
            from: tmp.clone(),
            to: path.to_path_buf(),
            source,
        })
    });

    match result {
        Ok(()) => {
            tracing::debug!(path = %path.display(), cursor, "Stamp file saved");
            Ok(())
        }
        Err(e) => {
            // Ignore any secondary error; the previous stamp is untouched.
            let _ = std::fs::remove_file(&tmp);
            Err(e)
        }
    }
}
