use std::fs;
use std::path::Path;

use crate::error::{FetchError, Result};

/// Creates `path` and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        log::debug!("Directory already exists: {:?}", path);
        return Ok(());
    }

    log::info!("Creating directory {:?}", path);
    fs::create_dir_all(path).map_err(|source| FetchError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
