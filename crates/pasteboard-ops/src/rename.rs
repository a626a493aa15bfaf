//! Rename operation and name validation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pasteboard_core::OpError;

/// Validate a name for use as a single path component.
pub fn validate_name(name: &str) -> Result<(), OpError> {
    let reject = |reason: &str| Err(OpError::invalid_name(name, reason));

    if name.is_empty() {
        return reject("Name cannot be empty");
    }

    if name.len() > 255 {
        return reject("Name is too long (max 255 bytes)");
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return reject(&format!("Name cannot contain '{}'", c.escape_default()));
        }
    }

    #[cfg(target_os = "windows")]
    {
        for c in ['\\', ':', '*', '?', '"', '<', '>', '|'] {
            if name.contains(c) {
                return reject(&format!("Name cannot contain '{}'", c));
            }
        }
    }

    if name == "." || name == ".." {
        return reject("'.' and '..' are reserved names");
    }

    Ok(())
}

/// Rename `path` within its parent directory.
///
/// Returns the new path. An unchanged name is an error, and so is an
/// existing target, since `rename(2)` would silently replace it.
pub(crate) fn rename_entry(path: &Path, new_name: &str) -> Result<PathBuf, OpError> {
    validate_name(new_name)?;

    let current = path
        .file_name()
        .ok_or_else(|| OpError::invalid_name(path.display().to_string(), "Path has no name"))?;
    if current == new_name {
        return Err(OpError::invalid_name(new_name, "Name is unchanged"));
    }

    let parent = path.parent().unwrap_or(Path::new(""));
    let new_path = parent.join(new_name);

    fs::symlink_metadata(path).map_err(|e| OpError::io(path, &e))?;
    match fs::symlink_metadata(&new_path) {
        Ok(_) => return Err(OpError::AlreadyExists { path: new_path }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(OpError::io(&new_path, &e)),
    }

    fs::rename(path, &new_path).map_err(|e| OpError::io(path, &e))?;
    Ok(new_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasteboard_core::OpErrorKind;

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("test.txt").is_ok());
        assert!(validate_name("my-file").is_ok());
        assert!(validate_name(".hidden").is_ok());
        assert!(validate_name("file with spaces").is_ok());
    }

    #[test]
    fn test_validate_name_invalid() {
        for name in ["", "test/file", ".", "..", "nul\0byte"] {
            let err = validate_name(name).unwrap_err();
            assert_eq!(err.kind(), OpErrorKind::InvalidName, "{name:?}");
        }
        assert!(validate_name(&"x".repeat(256)).is_err());
    }
}
