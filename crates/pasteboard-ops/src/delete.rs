//! Permanent deletion.

use std::fs;
use std::path::Path;

use pasteboard_core::{EntryKind, OpError};

/// Remove `path` for good. Directories are removed with their whole subtree.
pub(crate) fn remove_entry(path: &Path, kind: EntryKind) -> Result<(), OpError> {
    let result = match kind {
        EntryKind::Directory => fs::remove_dir_all(path),
        EntryKind::File => fs::remove_file(path),
    };
    result.map_err(|e| OpError::io(path, &e))
}
