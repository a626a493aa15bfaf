//! Batch summaries for reporting to the user.

use serde::{Deserialize, Serialize};

use crate::operation::OperationResult;

/// The type of operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Paste,
    Delete,
    Rename,
    CreateDirectory,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paste => write!(f, "Paste"),
            Self::Delete => write!(f, "Delete"),
            Self::Rename => write!(f, "Rename"),
            Self::CreateDirectory => write!(f, "Create directory"),
        }
    }
}

/// Aggregate outcome of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// The type of operation.
    pub operation_type: OperationType,
    /// Number of items requested.
    pub total: usize,
    /// Number of items that succeeded.
    pub succeeded: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Number of successful items that were moved rather than copied.
    pub moved: usize,
    /// Whether the batch stopped early on request.
    pub cancelled: bool,
}

impl BatchSummary {
    /// Summarize the results of a batch of `total` requested items.
    pub fn from_results(
        operation_type: OperationType,
        total: usize,
        results: &[OperationResult],
        cancelled: bool,
    ) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            operation_type,
            total,
            succeeded,
            failed: results.len() - succeeded,
            moved: results.iter().filter(|r| r.moved()).count(),
            cancelled,
        }
    }

    /// Number of items that were never attempted.
    pub fn skipped(&self) -> usize {
        self.total.saturating_sub(self.succeeded + self.failed)
    }

    /// Check if every requested item succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.skipped() == 0
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        let action = match self.operation_type {
            OperationType::Paste => "Pasted",
            OperationType::Delete => "Deleted",
            OperationType::Rename => "Renamed",
            OperationType::CreateDirectory => "Created",
        };

        let mut text = if self.failed == 0 && self.skipped() == 0 {
            format!("{} {} items", action, self.succeeded)
        } else {
            format!("{} {} of {} items", action, self.succeeded, self.total)
        };
        if self.failed > 0 {
            text.push_str(&format!(", {} failed", self.failed));
        }
        if self.cancelled {
            text.push_str(&format!(", cancelled with {} remaining", self.skipped()));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ItemAction;
    use pasteboard_core::OpError;
    use std::path::PathBuf;

    fn ok(action: ItemAction) -> OperationResult {
        OperationResult::success(PathBuf::from("/a"), Some(PathBuf::from("/b")), action)
    }

    fn failed() -> OperationResult {
        OperationResult::failed(
            PathBuf::from("/a"),
            None,
            OpError::NotFound {
                path: PathBuf::from("/a"),
            },
        )
    }

    #[test]
    fn test_summary_all_succeeded() {
        let results = vec![ok(ItemAction::Copied), ok(ItemAction::Moved)];
        let summary = BatchSummary::from_results(OperationType::Paste, 2, &results, false);

        assert!(summary.is_success());
        assert_eq!(summary.moved, 1);
        assert_eq!(summary.summary(), "Pasted 2 items");
    }

    #[test]
    fn test_summary_partial_failure() {
        let mut results: Vec<_> = (0..12).map(|_| ok(ItemAction::Deleted)).collect();
        results.extend((0..3).map(|_| failed()));
        let summary = BatchSummary::from_results(OperationType::Delete, 15, &results, false);

        assert!(!summary.is_success());
        assert_eq!(summary.summary(), "Deleted 12 of 15 items, 3 failed");
    }

    #[test]
    fn test_summary_cancelled() {
        let results = vec![ok(ItemAction::Copied)];
        let summary = BatchSummary::from_results(OperationType::Paste, 4, &results, true);

        assert_eq!(summary.skipped(), 3);
        assert_eq!(
            summary.summary(),
            "Pasted 1 of 4 items, cancelled with 3 remaining"
        );
    }
}
