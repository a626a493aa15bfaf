//! Runs engine batches on a worker and streams per-item results.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use pasteboard_core::RequestError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::engine::{FileOperationEngine, validate_destination};
use crate::operation::{OperationResult, PasteRequest};
use crate::progress::{BatchSummary, OperationType};
use crate::OPERATION_CHANNEL_SIZE;

/// Event sent through the channel while a batch runs.
#[derive(Debug, Clone)]
pub enum OperationEvent {
    /// The batch has started.
    Started {
        operation_type: OperationType,
        total: usize,
    },
    /// One item finished.
    Item {
        index: usize,
        result: OperationResult,
    },
    /// Every item was attempted, or the batch was cancelled between items.
    Complete(BatchSummary),
    /// The request was malformed; no item was attempted.
    Rejected(RequestError),
}

/// Runs [`FileOperationEngine`] calls on tokio's blocking pool.
///
/// Each `start_*` method returns immediately with a receiver. Must be called
/// from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct OperationExecutor {
    engine: Arc<FileOperationEngine>,
}

impl OperationExecutor {
    /// Create an executor around a shared engine.
    pub fn new(engine: Arc<FileOperationEngine>) -> Self {
        Self { engine }
    }

    /// The engine batches run on.
    pub fn engine(&self) -> &FileOperationEngine {
        &self.engine
    }

    /// Start a paste that runs to completion.
    pub fn start_paste(&self, request: PasteRequest) -> mpsc::Receiver<OperationEvent> {
        self.start_paste_with_cancel(request, CancellationToken::new())
    }

    /// Start a paste that stops before the next item once `cancel` fires.
    pub fn start_paste_with_cancel(
        &self,
        request: PasteRequest,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<OperationEvent> {
        let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
        let engine = Arc::clone(&self.engine);

        tokio::task::spawn_blocking(move || {
            let total = request.len();
            let _ = tx.blocking_send(OperationEvent::Started {
                operation_type: OperationType::Paste,
                total,
            });

            if cancel.is_cancelled() {
                let event = match validate_destination(&request.destination) {
                    Ok(()) => OperationEvent::Complete(BatchSummary::from_results(
                        OperationType::Paste,
                        total,
                        &[],
                        true,
                    )),
                    Err(e) => OperationEvent::Rejected(e),
                };
                let _ = tx.blocking_send(event);
                return;
            }

            let outcome =
                engine.paste_with(&request, |index, result| forward(&tx, &cancel, index, result));

            let event = match outcome {
                Ok(results) => OperationEvent::Complete(BatchSummary::from_results(
                    OperationType::Paste,
                    total,
                    &results,
                    results.len() < total,
                )),
                Err(e) => OperationEvent::Rejected(e),
            };
            let _ = tx.blocking_send(event);
        });

        rx
    }

    /// Start a permanent delete that runs to completion.
    pub fn start_delete(&self, paths: Vec<PathBuf>) -> mpsc::Receiver<OperationEvent> {
        self.start_delete_with_cancel(paths, CancellationToken::new())
    }

    /// Start a permanent delete that stops before the next item once `cancel`
    /// fires.
    pub fn start_delete_with_cancel(
        &self,
        paths: Vec<PathBuf>,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<OperationEvent> {
        let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
        let engine = Arc::clone(&self.engine);

        tokio::task::spawn_blocking(move || {
            let total = paths.len();
            let _ = tx.blocking_send(OperationEvent::Started {
                operation_type: OperationType::Delete,
                total,
            });

            let results = if cancel.is_cancelled() {
                Vec::new()
            } else {
                engine.delete_items_with(&paths, |index, result| {
                    forward(&tx, &cancel, index, result)
                })
            };

            let summary = BatchSummary::from_results(
                OperationType::Delete,
                total,
                &results,
                results.len() < total,
            );
            let _ = tx.blocking_send(OperationEvent::Complete(summary));
        });

        rx
    }

    /// Start a rename.
    pub fn start_rename(&self, path: PathBuf, new_name: String) -> mpsc::Receiver<OperationEvent> {
        let engine = Arc::clone(&self.engine);
        Self::start_single(OperationType::Rename, move || engine.rename(&path, &new_name))
    }

    /// Start a directory creation.
    pub fn start_create_directory(
        &self,
        parent: PathBuf,
        name: String,
    ) -> mpsc::Receiver<OperationEvent> {
        let engine = Arc::clone(&self.engine);
        Self::start_single(OperationType::CreateDirectory, move || {
            engine.create_directory(&parent, &name)
        })
    }

    fn start_single<F>(operation_type: OperationType, op: F) -> mpsc::Receiver<OperationEvent>
    where
        F: FnOnce() -> OperationResult + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);

        tokio::task::spawn_blocking(move || {
            let _ = tx.blocking_send(OperationEvent::Started {
                operation_type,
                total: 1,
            });

            let result = op();
            let summary =
                BatchSummary::from_results(operation_type, 1, std::slice::from_ref(&result), false);
            let _ = tx.blocking_send(OperationEvent::Item { index: 0, result });
            let _ = tx.blocking_send(OperationEvent::Complete(summary));
        });

        rx
    }
}

/// Send one item's result and decide whether to go on.
///
/// A dropped receiver does not stop the batch; only the token does.
fn forward(
    tx: &mpsc::Sender<OperationEvent>,
    cancel: &CancellationToken,
    index: usize,
    result: &OperationResult,
) -> ControlFlow<()> {
    let _ = tx.blocking_send(OperationEvent::Item {
        index,
        result: result.clone(),
    });

    if cancel.is_cancelled() {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

/// Drain a receiver until the batch ends, collecting item results in order.
///
/// Returns the results and the final event's summary, or the rejection.
pub async fn collect_events(
    mut rx: mpsc::Receiver<OperationEvent>,
) -> Result<(Vec<OperationResult>, Option<BatchSummary>), RequestError> {
    let mut results = Vec::new();
    let mut summary = None;

    while let Some(event) = rx.recv().await {
        match event {
            OperationEvent::Started { .. } => {}
            OperationEvent::Item { result, .. } => results.push(result),
            OperationEvent::Complete(s) => summary = Some(s),
            OperationEvent::Rejected(e) => return Err(e),
        }
    }

    Ok((results, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn executor() -> OperationExecutor {
        OperationExecutor::new(Arc::new(FileOperationEngine::default()))
    }

    #[tokio::test]
    async fn test_start_paste_streams_items_in_order() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let mut rx = executor().start_paste(PasteRequest::copy(vec![a, b], &dest));

        assert!(matches!(
            rx.recv().await,
            Some(OperationEvent::Started { total: 2, .. })
        ));
        let mut indices = Vec::new();
        let summary = loop {
            match rx.recv().await.unwrap() {
                OperationEvent::Item { index, result } => {
                    assert!(result.is_success());
                    indices.push(index);
                }
                OperationEvent::Complete(summary) => break summary,
                other => panic!("unexpected event: {other:?}"),
            }
        };

        assert_eq!(indices, vec![0, 1]);
        assert_eq!(summary.succeeded, 2);
        assert!(!summary.cancelled);
        assert!(dest.join("a.txt").exists());
        assert!(dest.join("b.txt").exists());
    }

    #[tokio::test]
    async fn test_start_paste_rejected() {
        let temp = TempDir::new().unwrap();
        let rx = executor().start_paste(PasteRequest::copy(
            vec![temp.path().join("a")],
            temp.path().join("missing"),
        ));

        let err = collect_events(rx).await.unwrap_err();
        assert!(matches!(err, RequestError::DestinationMissing(_)));
    }

    #[tokio::test]
    async fn test_cancelled_paste_still_rejects_bad_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        fs::write(&src, b"a").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let rx = executor().start_paste_with_cancel(
            PasteRequest::copy(vec![src.clone()], temp.path().join("missing")),
            cancel,
        );

        let err = collect_events(rx).await.unwrap_err();
        assert!(matches!(err, RequestError::DestinationMissing(_)));
        assert!(src.exists());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_attempts_nothing() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("keep.txt");
        fs::write(&file, b"k").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let rx = executor().start_delete_with_cancel(vec![file.clone()], cancel);

        let (results, summary) = collect_events(rx).await.unwrap();
        assert!(results.is_empty());
        let summary = summary.unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.skipped(), 1);
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_cancel_stops_between_items() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..3)
            .map(|i| {
                let path = temp.path().join(format!("{i}.txt"));
                fs::write(&path, b"x").unwrap();
                path
            })
            .collect();

        let cancel = CancellationToken::new();
        let mut rx = executor().start_delete_with_cancel(paths.clone(), cancel.clone());

        let mut deleted = 0;
        let summary = loop {
            match rx.recv().await.unwrap() {
                OperationEvent::Started { .. } => {}
                OperationEvent::Item { .. } => {
                    deleted += 1;
                    cancel.cancel();
                }
                OperationEvent::Complete(summary) => break summary,
                other => panic!("unexpected event: {other:?}"),
            }
        };

        // The worker may finish more items before it sees the token.
        assert!(deleted >= 1);
        assert_eq!(summary.succeeded, deleted);
        assert_eq!(summary.cancelled, deleted < 3);
        assert_eq!(paths.iter().filter(|p| !p.exists()).count(), deleted);
    }

    #[tokio::test]
    async fn test_start_rename_and_create() {
        let temp = TempDir::new().unwrap();
        let exec = executor();

        let rx = exec.start_create_directory(temp.path().to_path_buf(), "made".to_string());
        let (results, summary) = collect_events(rx).await.unwrap();
        assert!(results[0].is_success());
        assert_eq!(summary.unwrap().operation_type, OperationType::CreateDirectory);

        let rx = exec.start_rename(temp.path().join("made"), "renamed".to_string());
        let (results, _) = collect_events(rx).await.unwrap();
        assert_eq!(
            results[0].resolved_destination.as_deref(),
            Some(temp.path().join("renamed").as_path())
        );
        assert!(temp.path().join("renamed").is_dir());
    }
}
