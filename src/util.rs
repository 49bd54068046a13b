//! File helpers shared by snapshots, config and exports.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, VolleyError};

/// Largest snapshot or config file we agree to read (10 MB).
pub const MAX_READ_BYTES: u64 = 10 * 1024 * 1024;

/// Read a UTF-8 file, refusing anything over `max_bytes`.
///
/// A missing or unreadable file is a storage error; an oversized one is
/// reported as a serialization error since it cannot be a valid document.
pub fn read_capped(path: &Path, max_bytes: u64) -> Result<String> {
    let size = fs::metadata(path)
        .map_err(|e| VolleyError::storage(path, e))?
        .len();
    if size > max_bytes {
        return Err(VolleyError::serde(format!(
            "{} is {} bytes, over the {} byte limit",
            path.display(),
            size,
            max_bytes
        )));
    }
    fs::read_to_string(path).map_err(|e| VolleyError::storage(path, e))
}

/// Write bytes to `path` atomically.
///
/// The data goes to a sibling temp file first and is renamed over the
/// target, so readers never observe a half-written file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| VolleyError::storage(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut file = fs::File::create(&temp_path).map_err(|e| VolleyError::storage(&temp_path, e))?;
    let written = file
        .write_all(data)
        .and_then(|_| file.sync_all())
        .map_err(|e| VolleyError::storage(&temp_path, e));
    drop(file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        VolleyError::storage(path, e)
    })
}
