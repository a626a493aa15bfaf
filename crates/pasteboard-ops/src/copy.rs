//! Copy primitives for files and directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use pasteboard_core::{EngineConfig, EntryKind, OpError};

/// Maximum directory nesting followed when copying a tree.
const MAX_COPY_DEPTH: usize = 64;

/// Copy `source` to `dest`, which must not exist yet.
///
/// Returns the number of bytes copied.
pub(crate) fn copy_entry(
    source: &Path,
    dest: &Path,
    kind: EntryKind,
    config: &EngineConfig,
) -> Result<u64, OpError> {
    match kind {
        EntryKind::Directory => {
            ensure_not_ancestor(source, dest)?;
            copy_dir_recursive(source, dest, config, 0)
        }
        EntryKind::File => copy_file(source, dest, config),
    }
}

/// Copy one file, keeping permissions and (optionally) timestamps.
fn copy_file(source: &Path, dest: &Path, config: &EngineConfig) -> Result<u64, OpError> {
    let link_meta = fs::symlink_metadata(source).map_err(|e| OpError::io(source, &e))?;

    if link_meta.file_type().is_symlink() && config.copy_symlinks_as_links {
        return copy_symlink(source, dest);
    }

    let bytes = fs::copy(source, dest).map_err(|e| OpError::io(source, &e))?;

    if config.preserve_timestamps {
        copy_times(source, dest)?;
    }

    Ok(bytes)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> Result<u64, OpError> {
    let target = fs::read_link(source).map_err(|e| OpError::io(source, &e))?;
    std::os::unix::fs::symlink(&target, dest).map_err(|e| OpError::io(dest, &e))?;
    Ok(0)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> Result<u64, OpError> {
    fs::copy(source, dest).map_err(|e| OpError::io(source, &e))
}

/// Carry access and modification times from `source` over to `dest`.
fn copy_times(source: &Path, dest: &Path) -> Result<(), OpError> {
    let meta = fs::metadata(source).map_err(|e| OpError::io(source, &e))?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(dest, atime, mtime).map_err(|e| OpError::io(dest, &e))
}

/// Recursively copy a directory.
fn copy_dir_recursive(
    source: &Path,
    dest: &Path,
    config: &EngineConfig,
    depth: usize,
) -> Result<u64, OpError> {
    if depth > MAX_COPY_DEPTH {
        return Err(OpError::other(
            source,
            format!("directory nesting deeper than {MAX_COPY_DEPTH}"),
        ));
    }

    // Single-level create: never merge into a directory that appeared since
    // the destination was resolved.
    fs::create_dir(dest).map_err(|e| OpError::io(dest, &e))?;

    let mut total_bytes = 0u64;
    let entries = fs::read_dir(source).map_err(|e| OpError::io(source, &e))?;

    for entry in entries {
        let entry = entry.map_err(|e| OpError::io(source, &e))?;
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if child_is_dir(&entry, config).map_err(|e| OpError::io(&path, &e))? {
            total_bytes += copy_dir_recursive(&path, &dest_path, config, depth + 1)?;
        } else {
            total_bytes += copy_file(&path, &dest_path, config)?;
        }
    }

    if let Ok(meta) = fs::metadata(source) {
        fs::set_permissions(dest, meta.permissions()).map_err(|e| OpError::io(dest, &e))?;
    }
    if config.preserve_timestamps {
        copy_times(source, dest)?;
    }

    Ok(total_bytes)
}

fn child_is_dir(entry: &fs::DirEntry, config: &EngineConfig) -> std::io::Result<bool> {
    let file_type = entry.file_type()?;
    if file_type.is_symlink() && !config.copy_symlinks_as_links {
        return Ok(fs::metadata(entry.path())?.is_dir());
    }
    Ok(file_type.is_dir())
}

/// Fail if `dest` lies inside the directory `source`.
pub(crate) fn ensure_not_ancestor(source: &Path, dest: &Path) -> Result<(), OpError> {
    let source = fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf());
    let dest = canonical_destination(dest);

    if dest.starts_with(&source) {
        return Err(OpError::other(
            source,
            "cannot paste a directory into itself",
        ));
    }
    Ok(())
}

/// Canonicalize a path that does not exist yet through its parent.
fn canonical_destination(dest: &Path) -> PathBuf {
    match (dest.parent(), dest.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or_else(|_| dest.to_path_buf()),
        _ => dest.to_path_buf(),
    }
}
