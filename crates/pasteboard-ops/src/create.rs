//! Directory creation.

use std::fs;
use std::path::{Path, PathBuf};

use pasteboard_core::OpError;

use crate::rename::validate_name;

/// Create `parent/name` as a new, empty directory.
///
/// Collisions are reported as [`OpError::AlreadyExists`], never renamed
/// around.
pub(crate) fn create_directory(parent: &Path, name: &str) -> Result<PathBuf, OpError> {
    validate_name(name)?;

    let path = parent.join(name);
    fs::create_dir(&path).map_err(|e| OpError::io(&path, &e))?;
    Ok(path)
}
