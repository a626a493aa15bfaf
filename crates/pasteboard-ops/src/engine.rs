//! The file operation engine.
//!
//! Every batch call attempts each item in order and records its outcome; one
//! item failing never stops the rest. Only a malformed request (for instance a
//! destination that is not a directory) fails the call as a whole, and it does
//! so before any item is touched.

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use pasteboard_core::{EngineConfig, EntryKind, OpError, PropertiesSnapshot, RequestError};
use tracing::{debug, info, warn};

use crate::copy::copy_entry;
use crate::create::create_directory;
use crate::delete::remove_entry;
use crate::move_op::move_entry;
use crate::operation::{ItemAction, OperationResult, PasteRequest};
use crate::progress::{BatchSummary, OperationType};
use crate::properties::query_properties;
use crate::rename::rename_entry;
use crate::resolver::PathResolver;

/// Executes paste, delete, rename and create-directory against the local
/// filesystem.
///
/// All methods are synchronous and return once every item has been
/// attempted. Use [`crate::OperationExecutor`] to run batches off the caller's
/// thread.
#[derive(Debug, Clone, Default)]
pub struct FileOperationEngine {
    config: EngineConfig,
    resolver: PathResolver,
}

impl FileOperationEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        let resolver = PathResolver::from_config(&config);
        Self { config, resolver }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The resolver used for paste collisions.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Paste every source of `request` into its destination.
    ///
    /// Sources in the request's cut set are moved; all others are copied.
    /// The engine does not clear any clipboard: after a cut, the caller does.
    pub fn paste(&self, request: &PasteRequest) -> Result<Vec<OperationResult>, RequestError> {
        self.paste_with(request, |_, _| ControlFlow::Continue(()))
    }

    /// Like [`paste`](Self::paste), reporting each item as it finishes.
    ///
    /// Returning [`ControlFlow::Break`] from `on_item` stops the batch before
    /// the next item starts.
    pub fn paste_with<F>(
        &self,
        request: &PasteRequest,
        mut on_item: F,
    ) -> Result<Vec<OperationResult>, RequestError>
    where
        F: FnMut(usize, &OperationResult) -> ControlFlow<()>,
    {
        validate_destination(&request.destination)?;

        let mut results = Vec::with_capacity(request.len());
        let mut cancelled = false;

        for (index, source) in request.sources.iter().enumerate() {
            let result = self.paste_item(request, source);
            log_result(&result);

            let flow = on_item(index, &result);
            results.push(result);
            if flow.is_break() {
                cancelled = index + 1 < request.len();
                break;
            }
        }

        log_summary(&BatchSummary::from_results(
            OperationType::Paste,
            request.len(),
            &results,
            cancelled,
        ));
        Ok(results)
    }

    fn paste_item(&self, request: &PasteRequest, source: &Path) -> OperationResult {
        let Some(name) = source.file_name() else {
            return OperationResult::failed(
                source.to_path_buf(),
                None,
                OpError::invalid_name(source.display().to_string(), "Path has no name"),
            );
        };

        let moving = request.should_move(source);
        let kind = match self.source_kind(source, moving) {
            Ok(kind) => kind,
            Err(e) => return OperationResult::failed(source.to_path_buf(), None, e),
        };

        let dest = match self.resolver.resolve(&request.destination, name, kind) {
            Ok(dest) => dest,
            Err(e) => return OperationResult::failed(source.to_path_buf(), None, e),
        };

        let outcome = if moving {
            move_entry(source, &dest, kind, &self.config).map(|()| ItemAction::Moved)
        } else {
            copy_entry(source, &dest, kind, &self.config).map(|_| ItemAction::Copied)
        };

        match outcome {
            Ok(action) => OperationResult::success(source.to_path_buf(), Some(dest), action),
            Err(e) => OperationResult::failed(source.to_path_buf(), Some(dest), e),
        }
    }

    /// Classify a paste source.
    ///
    /// A copy follows a symlink when links are not kept as links, so a link to
    /// a directory is resolved and copied as a directory. A move always acts
    /// on the link itself.
    fn source_kind(&self, source: &Path, moving: bool) -> Result<EntryKind, OpError> {
        if moving || self.config.copy_symlinks_as_links {
            return EntryKind::of(source);
        }
        fs::metadata(source)
            .map(|m| EntryKind::from_metadata(&m))
            .map_err(|e| OpError::io(source, &e))
    }

    /// Permanently delete every path, directories recursively.
    ///
    /// There is no trash and no confirmation here; callers confirm with the
    /// user first.
    pub fn delete_items(&self, paths: &[PathBuf]) -> Vec<OperationResult> {
        self.delete_items_with(paths, |_, _| ControlFlow::Continue(()))
    }

    /// Like [`delete_items`](Self::delete_items), reporting each item as it
    /// finishes.
    pub fn delete_items_with<F>(&self, paths: &[PathBuf], mut on_item: F) -> Vec<OperationResult>
    where
        F: FnMut(usize, &OperationResult) -> ControlFlow<()>,
    {
        let mut results = Vec::with_capacity(paths.len());
        let mut cancelled = false;

        for (index, path) in paths.iter().enumerate() {
            let outcome = EntryKind::of(path).and_then(|kind| remove_entry(path, kind));
            let result = match outcome {
                Ok(()) => OperationResult::success(path.clone(), None, ItemAction::Deleted),
                Err(e) => OperationResult::failed(path.clone(), None, e),
            };
            log_result(&result);

            let flow = on_item(index, &result);
            results.push(result);
            if flow.is_break() {
                cancelled = index + 1 < paths.len();
                break;
            }
        }

        log_summary(&BatchSummary::from_results(
            OperationType::Delete,
            paths.len(),
            &results,
            cancelled,
        ));
        results
    }

    /// Rename `path` to `new_name` within its directory.
    pub fn rename(&self, path: &Path, new_name: &str) -> OperationResult {
        let result = match rename_entry(path, new_name) {
            Ok(new_path) => {
                OperationResult::success(path.to_path_buf(), Some(new_path), ItemAction::Renamed)
            }
            Err(e) => OperationResult::failed(path.to_path_buf(), None, e),
        };
        log_result(&result);
        result
    }

    /// Create the directory `parent/name`.
    pub fn create_directory(&self, parent: &Path, name: &str) -> OperationResult {
        let result = match create_directory(parent, name) {
            Ok(path) => OperationResult::success(path.clone(), Some(path), ItemAction::Created),
            Err(e) => OperationResult::failed(parent.join(name), None, e),
        };
        log_result(&result);
        result
    }

    /// Read the properties of a single entry.
    pub fn query_properties(&self, path: &Path) -> Result<PropertiesSnapshot, OpError> {
        query_properties(path)
    }

    /// Read the properties of the first entry of a selection.
    ///
    /// Only one item is ever described; the rest of the selection is ignored.
    pub fn query_properties_first(
        &self,
        paths: &[PathBuf],
    ) -> Option<Result<PropertiesSnapshot, OpError>> {
        paths.first().map(|path| query_properties(path))
    }
}

/// Check that `destination` is an existing directory.
pub(crate) fn validate_destination(destination: &Path) -> Result<(), RequestError> {
    if destination.as_os_str().is_empty() {
        return Err(RequestError::EmptyDestination);
    }
    match fs::metadata(destination) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(RequestError::DestinationNotDirectory(
            destination.to_path_buf(),
        )),
        Err(_) => Err(RequestError::DestinationMissing(destination.to_path_buf())),
    }
}

fn log_result(result: &OperationResult) {
    match result.error() {
        None => debug!(target: "pasteboard::engine", "{}", result),
        Some(error) => warn!(
            target: "pasteboard::engine",
            source = %result.source.display(),
            "{}",
            error
        ),
    }
}

fn log_summary(summary: &BatchSummary) {
    info!(
        target: "pasteboard::engine",
        succeeded = summary.succeeded,
        failed = summary.failed,
        "{}",
        summary.summary()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasteboard_core::OpErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_paste_rejects_missing_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        fs::write(&src, b"a").unwrap();

        let request = PasteRequest::copy(vec![src.clone()], temp.path().join("nowhere"));
        let err = FileOperationEngine::default().paste(&request).unwrap_err();
        assert!(matches!(err, RequestError::DestinationMissing(_)));
    }

    #[test]
    fn test_paste_rejects_file_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        fs::write(&src, b"a").unwrap();

        let request = PasteRequest::cut(vec![src.clone()], src.clone());
        let err = FileOperationEngine::default().paste(&request).unwrap_err();
        assert!(matches!(err, RequestError::DestinationNotDirectory(_)));
        assert!(src.exists());
    }

    #[test]
    fn test_paste_rejects_empty_destination() {
        let request = PasteRequest::copy(vec![PathBuf::from("/a")], PathBuf::new());
        let err = FileOperationEngine::default().paste(&request).unwrap_err();
        assert_eq!(err, RequestError::EmptyDestination);
    }

    #[test]
    fn test_paste_root_has_no_name() {
        let temp = TempDir::new().unwrap();
        let request = PasteRequest::copy(vec![PathBuf::from("/")], temp.path());
        let results = FileOperationEngine::default().paste(&request).unwrap();
        assert_eq!(
            results[0].error().map(OpError::kind),
            Some(OpErrorKind::InvalidName)
        );
    }

    #[test]
    fn test_paste_with_stops_between_items() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();
        let sources: Vec<PathBuf> = (0..3)
            .map(|i| {
                let path = temp.path().join(format!("{i}.txt"));
                fs::write(&path, b"x").unwrap();
                path
            })
            .collect();

        let request = PasteRequest::copy(sources, &dest);
        let results = FileOperationEngine::default()
            .paste_with(&request, |index, _| {
                if index == 0 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(dest.join("0.txt").exists());
        assert!(!dest.join("1.txt").exists());
    }

    #[test]
    fn test_query_properties_first_uses_one_item() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        fs::write(&a, b"abc").unwrap();

        let engine = FileOperationEngine::default();
        let props = engine
            .query_properties_first(&[a, temp.path().join("missing")])
            .unwrap()
            .unwrap();
        assert_eq!(props.name, "a");
        assert!(engine.query_properties_first(&[]).is_none());
    }
}
