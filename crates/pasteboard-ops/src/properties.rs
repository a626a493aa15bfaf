//! Single-entry property queries.

use std::fs::{self, File, Metadata};
use std::path::{self, Path};

use chrono::{DateTime, Utc};
use pasteboard_core::{EntryKind, OpError, PropertiesSnapshot, is_hidden_name};

/// Read the properties of one entry. Side-effect free.
///
/// Symlinks report their target's details when the target is reachable, and
/// the link's own details otherwise.
pub(crate) fn query_properties(path: &Path) -> Result<PropertiesSnapshot, OpError> {
    let link_meta = fs::symlink_metadata(path).map_err(|e| OpError::io(path, &e))?;
    let meta = if link_meta.file_type().is_symlink() {
        fs::metadata(path).unwrap_or(link_meta)
    } else {
        link_meta
    };

    let absolute = path::absolute(path).map_err(|e| OpError::io(path, &e))?;
    let name = absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| absolute.display().to_string());
    let parent_path = absolute.parent().map(Path::to_path_buf).unwrap_or_default();

    let kind = if meta.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    Ok(PropertiesSnapshot {
        hidden: is_hidden(&name, &meta),
        name,
        parent_path,
        kind,
        size_bytes: kind.is_file().then(|| meta.len()),
        created_at: meta.created().ok().map(DateTime::<Utc>::from),
        modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
        readable: is_readable(path, kind),
        writable: !meta.permissions().readonly(),
    })
}

fn is_readable(path: &Path, kind: EntryKind) -> bool {
    match kind {
        EntryKind::Directory => fs::read_dir(path).is_ok(),
        EntryKind::File => File::open(path).is_ok(),
    }
}

#[cfg(windows)]
fn is_hidden(name: &str, meta: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    is_hidden_name(name) || meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(windows))]
fn is_hidden(name: &str, _meta: &Metadata) -> bool {
    is_hidden_name(name)
}
