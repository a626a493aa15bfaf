//! Entry kinds and property snapshots.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::OpError;

/// What an entry reference points at, determined once from a single stat.
///
/// Symbolic links are reported as [`EntryKind::File`] so they are copied,
/// moved and deleted as links and never followed into their target's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Regular file, symlink, or any other non-directory.
    File,
    /// Directory.
    Directory,
}

impl EntryKind {
    /// Classify an entry from already-fetched (non-following) metadata.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        if metadata.is_dir() {
            Self::Directory
        } else {
            Self::File
        }
    }

    /// Stat `path` without following symlinks and classify it.
    pub fn of(path: &Path) -> Result<Self, OpError> {
        fs::symlink_metadata(path)
            .map(|m| Self::from_metadata(&m))
            .map_err(|e| OpError::io(path, &e))
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "File"),
            Self::Directory => write!(f, "Directory"),
        }
    }
}

/// Read-only detail of a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertiesSnapshot {
    /// Final path component.
    pub name: String,
    /// Absolute path of the containing directory.
    pub parent_path: PathBuf,
    /// File or directory.
    pub kind: EntryKind,
    /// Size in bytes; `None` for directories.
    pub size_bytes: Option<u64>,
    /// Creation time, where the platform records one. Serialized as RFC 3339.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub modified_at: Option<DateTime<Utc>>,
    /// Whether the current user can read the entry.
    pub readable: bool,
    /// Whether the entry is writable.
    pub writable: bool,
    /// Whether the entry is hidden.
    pub hidden: bool,
}

impl PropertiesSnapshot {
    /// Attribute labels in display order, e.g. `["Read", "Write"]`.
    pub fn attributes(&self) -> Vec<&'static str> {
        let mut attrs = Vec::with_capacity(3);
        if self.readable {
            attrs.push("Read");
        }
        if self.writable {
            attrs.push("Write");
        }
        if self.hidden {
            attrs.push("Hidden");
        }
        attrs
    }
}

/// Whether a file name is hidden by convention on this platform.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}
