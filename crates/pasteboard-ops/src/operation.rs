//! Request and per-item result types.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use pasteboard_core::OpError;
use serde::{Deserialize, Serialize};

use crate::clipboard::ClipboardMode;

/// A paste of `sources` into `destination`.
///
/// Owned and independent of the clipboard it was taken from. A source is
/// moved only when `mode` is [`ClipboardMode::Cut`] and the source is in
/// `cut_set`; everything else is copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteRequest {
    /// Items to paste, in order.
    pub sources: Vec<PathBuf>,
    /// Directory to paste into.
    pub destination: PathBuf,
    /// Mode recorded at snapshot time.
    pub mode: ClipboardMode,
    /// Paths that were cut when the snapshot was taken.
    pub cut_set: IndexSet<PathBuf>,
}

impl PasteRequest {
    /// Create a request that copies every source.
    pub fn copy(sources: Vec<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            destination: destination.into(),
            mode: ClipboardMode::Copy,
            cut_set: IndexSet::new(),
        }
    }

    /// Create a request that moves every source.
    pub fn cut(sources: Vec<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        let cut_set = sources.iter().cloned().collect();
        Self {
            sources,
            destination: destination.into(),
            mode: ClipboardMode::Cut,
            cut_set,
        }
    }

    /// Whether `source` should be moved rather than copied.
    pub fn should_move(&self, source: &Path) -> bool {
        self.mode == ClipboardMode::Cut && self.cut_set.contains(source)
    }

    /// Number of items in the request.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the request has no items.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// What was done to an item that succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Copied,
    Moved,
    Deleted,
    Renamed,
    Created,
}

/// How an item ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { action: ItemAction },
    Failed { error: OpError },
}

/// Result of one item in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The item as requested.
    pub source: PathBuf,
    /// Where the item ended up, once a destination was decided.
    pub resolved_destination: Option<PathBuf>,
    /// Success or the reason for failure.
    pub outcome: Outcome,
}

impl OperationResult {
    /// Create a successful result.
    pub fn success(source: PathBuf, destination: Option<PathBuf>, action: ItemAction) -> Self {
        Self {
            source,
            resolved_destination: destination,
            outcome: Outcome::Success { action },
        }
    }

    /// Create a failed result.
    pub fn failed(source: PathBuf, destination: Option<PathBuf>, error: OpError) -> Self {
        Self {
            source,
            resolved_destination: destination,
            outcome: Outcome::Failed { error },
        }
    }

    /// Check if the item succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Whether the item was moved away from its source.
    pub fn moved(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Success {
                action: ItemAction::Moved
            }
        )
    }

    /// The error, if the item failed.
    pub fn error(&self) -> Option<&OpError> {
        match &self.outcome {
            Outcome::Failed { error } => Some(error),
            Outcome::Success { .. } => None,
        }
    }
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.outcome, &self.resolved_destination) {
            (Outcome::Success { action }, Some(dest)) => write!(
                f,
                "{:?}: {} -> {}",
                action,
                self.source.display(),
                dest.display()
            ),
            (Outcome::Success { action }, None) => {
                write!(f, "{:?}: {}", action, self.source.display())
            }
            (Outcome::Failed { error }, _) => {
                write!(f, "Failed: {}: {}", self.source.display(), error)
            }
        }
    }
}
