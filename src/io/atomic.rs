//! Write-then-rename file output.
//!
//! Artifacts are written to a `.tmp` sibling and renamed into place, so a
//! failed run never leaves a truncated file under the final name.

use std::fs;
use std::path::Path;

use crate::error::WriteError;

/// Write `bytes` to `path`, creating the parent directory if needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WriteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes).map_err(|source| WriteError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(WriteError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
