//! Move primitive with a copy-and-delete fallback across filesystems.

use std::fs;
use std::io;
use std::path::Path;

use pasteboard_core::{EngineConfig, EntryKind, OpError};
use tracing::debug;

use crate::copy::{copy_entry, ensure_not_ancestor};
use crate::delete::remove_entry;

/// Move `source` to `dest`, which must not exist yet.
pub(crate) fn move_entry(
    source: &Path,
    dest: &Path,
    kind: EntryKind,
    config: &EngineConfig,
) -> Result<(), OpError> {
    if kind.is_dir() {
        ensure_not_ancestor(source, dest)?;
    }

    // Try rename first (fast path for same filesystem)
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                target: "pasteboard::engine",
                source = %source.display(),
                "rename crosses devices, copying instead"
            );
            move_by_copy(source, dest, kind, config)
        }
        Err(e) => Err(OpError::io(source, &e)),
    }
}

/// Copy `source` to `dest`, then remove `source`.
///
/// Symlinks are always recreated as links, whatever the copy setting, so a
/// move never replaces a link with its target's content.
fn move_by_copy(
    source: &Path,
    dest: &Path,
    kind: EntryKind,
    config: &EngineConfig,
) -> Result<(), OpError> {
    let config = EngineConfig {
        copy_symlinks_as_links: true,
        ..config.clone()
    };
    copy_entry(source, dest, kind, &config)?;
    remove_entry(source, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dst = temp.path().join("b.txt");
        fs::write(&src, b"a").unwrap();

        move_entry(&src, &dst, EntryKind::File, &EngineConfig::default()).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"a");
    }

    #[test]
    fn test_move_directory_into_itself_fails() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir(&dir).unwrap();

        let err = move_entry(
            &dir,
            &dir.join("dir"),
            EntryKind::Directory,
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), pasteboard_core::OpErrorKind::CrossDeviceOrIo);
        assert!(dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_move_by_copy_keeps_links_when_following_is_configured() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target.txt");
        fs::write(&target, b"payload").unwrap();

        let tree = temp.path().join("tree");
        fs::create_dir(&tree).unwrap();
        std::os::unix::fs::symlink(&target, tree.join("inner-link")).unwrap();
        let top_link = temp.path().join("top-link");
        std::os::unix::fs::symlink(&target, &top_link).unwrap();

        let config = EngineConfig {
            copy_symlinks_as_links: false,
            ..EngineConfig::default()
        };

        let moved_tree = temp.path().join("moved-tree");
        move_by_copy(&tree, &moved_tree, EntryKind::Directory, &config).unwrap();
        let moved_link = temp.path().join("moved-link");
        move_by_copy(&top_link, &moved_link, EntryKind::File, &config).unwrap();

        assert!(!tree.exists());
        assert!(fs::symlink_metadata(&top_link).is_err());
        for link in [moved_tree.join("inner-link"), moved_link] {
            assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
            assert_eq!(fs::read_link(&link).unwrap(), target);
        }
        assert_eq!(fs::read(&target).unwrap(), b"payload");
    }

    #[test]
    fn test_move_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = move_entry(
            &temp.path().join("gone"),
            &temp.path().join("dest"),
            EntryKind::File,
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), pasteboard_core::OpErrorKind::NotFound);
    }
}
