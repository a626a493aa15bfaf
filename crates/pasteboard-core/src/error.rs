//! Error types for file operations.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-item failure of a file operation.
///
/// These never abort a batch; they are recorded in the item's result and
/// processing moves on to the next item.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpError {
    /// Source vanished between enumeration and operation.
    #[error("Path not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The OS denied the read, write or delete.
    #[error("Permission denied: {}", .path.display())]
    PermissionDenied { path: PathBuf },

    /// Destination already exists and the operation does not rename around it.
    #[error("Already exists: {}", .path.display())]
    AlreadyExists { path: PathBuf },

    /// Empty, unchanged or otherwise unusable name.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Anything the primitive reported that is not classified above.
    #[error("I/O error at {}: {message}", .path.display())]
    CrossDeviceOrIo { path: PathBuf, message: String },
}

/// Fieldless discriminant of [`OpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    InvalidName,
    CrossDeviceOrIo,
}

impl OpError {
    /// Classify an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: &io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::CrossDeviceOrIo {
                path,
                message: source.to_string(),
            },
        }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unclassified error for a path.
    pub fn other(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CrossDeviceOrIo {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Get the kind of this error.
    pub fn kind(&self) -> OpErrorKind {
        match self {
            Self::NotFound { .. } => OpErrorKind::NotFound,
            Self::PermissionDenied { .. } => OpErrorKind::PermissionDenied,
            Self::AlreadyExists { .. } => OpErrorKind::AlreadyExists,
            Self::InvalidName { .. } => OpErrorKind::InvalidName,
            Self::CrossDeviceOrIo { .. } => OpErrorKind::CrossDeviceOrIo,
        }
    }

    /// The path this error refers to, if it carries one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::PermissionDenied { path }
            | Self::AlreadyExists { path }
            | Self::CrossDeviceOrIo { path, .. } => Some(path),
            Self::InvalidName { .. } => None,
        }
    }
}

/// Request-level malformation. Returned before any item is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RequestError {
    /// The destination path is empty.
    #[error("Destination path is empty")]
    EmptyDestination,

    /// The destination directory does not exist.
    #[error("Destination does not exist: {}", .0.display())]
    DestinationMissing(PathBuf),

    /// The destination exists but is not a directory.
    #[error("Destination is not a directory: {}", .0.display())]
    DestinationNotDirectory(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_error_io_classification() {
        let err = OpError::io(
            "/test/path",
            &io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), OpErrorKind::PermissionDenied);

        let err = OpError::io("/test/path", &io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), OpErrorKind::NotFound);

        let err = OpError::io("/test/path", &io::Error::other("disk full"));
        assert_eq!(err.kind(), OpErrorKind::CrossDeviceOrIo);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_invalid_name_has_no_path() {
        let err = OpError::invalid_name("", "Name cannot be empty");
        assert!(err.path().is_none());
        assert!(err.to_string().contains("Name cannot be empty"));
    }
}
