// src/export/fs_utils.rs

use crate::errors::{AppError, AppResult};
use crate::ui::messages::info;
use std::fs;
use std::path::Path;

/// Check that `path` can be written.
///
/// - missing file: ok, parent directories are created
/// - existing file with `force`: ok, it will be overwritten
/// - existing file without `force`: error
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if path.exists() {
        if !force {
            return Err(AppError::Export(format!(
                "'{}' already exists (use --force to overwrite)",
                path.display()
            )));
        }
        info(format!("Existing file '{}' will be overwritten.", path.display()));
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
