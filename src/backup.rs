//! Local JSON backups of fetched resources.
//!
//! Every resource is backed up before anything is written to the
//! destination. Writes are atomic temp-then-rename: either the old backup
//! remains intact, or the new one is fully written and fsynced. Existing
//! backup files are overwritten (each run refreshes its backups).

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::MigrateError;

/// Serialize `value` as pretty JSON into `dir/file_name`, atomically.
///
/// Creates `dir` if needed. Returns the final path.
pub fn write_json<T: Serialize>(
    dir: &Path,
    file_name: &str,
    value: &T,
) -> Result<PathBuf, MigrateError> {
    let target_path = dir.join(file_name);

    std::fs::create_dir_all(dir).map_err(|e| MigrateError::Backup {
        path: target_path.clone(),
        detail: format!("failed to create backup directory: {e}"),
    })?;

    let content = serde_json::to_vec_pretty(value).map_err(|e| MigrateError::Backup {
        path: target_path.clone(),
        detail: format!("failed to serialize backup content: {e}"),
    })?;

    // Temp file in the same directory so the rename is atomic.
    let temp_name = format!(".a2am-tmp-{}", uuid::Uuid::new_v4().as_hyphenated());
    let temp_path = dir.join(&temp_name);

    let write_result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&content)?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(MigrateError::Backup {
            path: target_path,
            detail: format!("failed to write temp file: {e}"),
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, &target_path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(MigrateError::Backup {
            path: target_path,
            detail: format!("failed to rename temp file into place: {e}"),
        });
    }

    debug!(path = %target_path.display(), bytes = content.len(), "backup written");
    Ok(target_path)
}
