//! Cut/copy mark state and the system clipboard seam.

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operation::PasteRequest;

/// What a paste of the marked paths should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipboardMode {
    /// Leave sources in place.
    Copy,
    /// Move sources to the destination.
    Cut,
}

impl std::fmt::Display for ClipboardMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "Copy"),
            Self::Cut => write!(f, "Cut"),
        }
    }
}

#[derive(Debug)]
struct Marked {
    paths: IndexSet<PathBuf>,
    mode: ClipboardMode,
}

/// The current set of marked paths and whether they were cut or copied.
///
/// One instance lives for the whole application session and is shared by
/// reference (or `Arc`). Every access goes through a single lock, and paste
/// batches only ever see an owned [`PasteRequest`] snapshot.
#[derive(Debug)]
pub struct ClipboardState {
    inner: Mutex<Marked>,
}

impl ClipboardState {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Marked {
                paths: IndexSet::new(),
                mode: ClipboardMode::Copy,
            }),
        }
    }

    // The guarded data is replaced wholesale on every write, so a panic
    // elsewhere cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, Marked> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the marked set with `paths` in copy mode.
    pub fn mark_copy(&self, paths: impl IntoIterator<Item = PathBuf>) {
        self.mark(paths, ClipboardMode::Copy);
    }

    /// Replace the marked set with `paths` in cut mode.
    pub fn mark_cut(&self, paths: impl IntoIterator<Item = PathBuf>) {
        self.mark(paths, ClipboardMode::Cut);
    }

    /// Replace the marked set. Never merges with the previous mark.
    pub fn mark(&self, paths: impl IntoIterator<Item = PathBuf>, mode: ClipboardMode) {
        let paths: IndexSet<PathBuf> = paths.into_iter().collect();
        debug!(target: "pasteboard::clipboard", count = paths.len(), %mode, "mark");

        let mut marked = self.lock();
        marked.paths = paths;
        marked.mode = mode;
    }

    /// Forget the marked set. Idempotent.
    pub fn clear(&self) {
        let mut marked = self.lock();
        if !marked.paths.is_empty() {
            debug!(target: "pasteboard::clipboard", "clear");
        }
        marked.paths.clear();
        marked.mode = ClipboardMode::Copy;
    }

    /// Whether nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.lock().paths.is_empty()
    }

    /// The current mode, or `None` when nothing is marked.
    pub fn mode(&self) -> Option<ClipboardMode> {
        let marked = self.lock();
        (!marked.paths.is_empty()).then_some(marked.mode)
    }

    /// The marked paths in mark order.
    pub fn marked_paths(&self) -> Vec<PathBuf> {
        self.lock().paths.iter().cloned().collect()
    }

    /// Build an independent paste request for the marked paths.
    ///
    /// Returns `None` when nothing is marked. Later marks or clears do not
    /// affect the returned request.
    pub fn snapshot_for_paste(&self, destination: impl Into<PathBuf>) -> Option<PasteRequest> {
        let marked = self.lock();
        if marked.paths.is_empty() {
            return None;
        }

        Some(PasteRequest {
            sources: marked.paths.iter().cloned().collect(),
            destination: destination.into(),
            mode: marked.mode,
            cut_set: marked.paths.clone(),
        })
    }

    /// Build a paste request for paths read from the system clipboard.
    ///
    /// The system clipboard does not say whether its paths were cut, so a
    /// source is moved only when it exactly matches a path in the current cut
    /// mark. Paths placed there by another application are always copied.
    pub fn snapshot_for_external(
        &self,
        sources: impl IntoIterator<Item = PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Option<PasteRequest> {
        let sources: Vec<PathBuf> = sources.into_iter().collect();
        if sources.is_empty() {
            return None;
        }

        let marked = self.lock();
        let (mode, cut_set) = match marked.mode {
            ClipboardMode::Cut if !marked.paths.is_empty() => {
                (ClipboardMode::Cut, marked.paths.clone())
            }
            _ => (ClipboardMode::Copy, IndexSet::new()),
        };

        Some(PasteRequest {
            sources,
            destination: destination.into(),
            mode,
            cut_set,
        })
    }

    /// Build a paste request from whatever the system clipboard holds.
    pub fn snapshot_from_system(
        &self,
        system: &dyn SystemClipboard,
        destination: impl Into<PathBuf>,
    ) -> io::Result<Option<PasteRequest>> {
        Ok(self.snapshot_for_external(system.paths()?, destination))
    }
}

impl Default for ClipboardState {
    fn default() -> Self {
        Self::new()
    }
}

/// The OS clipboard as a holder of path lists.
///
/// It carries no cut/copy distinction; that lives in [`ClipboardState`].
pub trait SystemClipboard {
    /// Publish `paths`, replacing whatever the clipboard held.
    fn set_paths(&mut self, paths: &[PathBuf]) -> io::Result<()>;

    /// Read the paths currently on the clipboard.
    fn paths(&self) -> io::Result<Vec<PathBuf>>;

    /// Empty the clipboard.
    fn clear(&mut self) -> io::Result<()>;
}

/// An in-process [`SystemClipboard`].
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    paths: Vec<PathBuf>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SystemClipboard for MemoryClipboard {
    fn set_paths(&mut self, paths: &[PathBuf]) -> io::Result<()> {
        self.paths = paths.to_vec();
        Ok(())
    }

    fn paths(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self.paths.clone())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.paths.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_empty_clipboard_has_no_snapshot() {
        let clipboard = ClipboardState::new();
        assert!(clipboard.is_empty());
        assert_eq!(clipboard.mode(), None);
        assert!(clipboard.snapshot_for_paste("/dest").is_none());
    }

    #[test]
    fn test_mark_replaces_previous_set() {
        let clipboard = ClipboardState::new();
        clipboard.mark_cut(paths(&["/a", "/b"]));
        clipboard.mark_copy(paths(&["/c"]));

        assert_eq!(clipboard.marked_paths(), paths(&["/c"]));
        assert_eq!(clipboard.mode(), Some(ClipboardMode::Copy));
    }

    #[test]
    fn test_mark_keeps_first_occurrence_order() {
        let clipboard = ClipboardState::new();
        clipboard.mark_copy(paths(&["/b", "/a", "/b"]));
        assert_eq!(clipboard.marked_paths(), paths(&["/b", "/a"]));
    }

    #[test]
    fn test_mark_with_nothing_empties() {
        let clipboard = ClipboardState::new();
        clipboard.mark_cut(paths(&["/a"]));
        clipboard.mark_cut(Vec::new());
        assert!(clipboard.is_empty());
        assert_eq!(clipboard.mode(), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let clipboard = ClipboardState::new();
        clipboard.mark_cut(paths(&["/a"]));
        clipboard.clear();
        clipboard.clear();
        assert!(clipboard.is_empty());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_marks() {
        let clipboard = ClipboardState::new();
        clipboard.mark_cut(paths(&["/a", "/b"]));
        let request = clipboard.snapshot_for_paste("/dest").unwrap();

        clipboard.mark_copy(paths(&["/c"]));
        clipboard.clear();

        assert_eq!(request.sources, paths(&["/a", "/b"]));
        assert_eq!(request.mode, ClipboardMode::Cut);
        assert!(request.should_move(&PathBuf::from("/a")));
        assert!(!request.should_move(&PathBuf::from("/c")));
    }

    #[test]
    fn test_external_paths_default_to_copy() {
        let clipboard = ClipboardState::new();
        clipboard.mark_cut(paths(&["/mine"]));

        let request = clipboard
            .snapshot_for_external(paths(&["/mine", "/theirs"]), "/dest")
            .unwrap();
        assert!(request.should_move(&PathBuf::from("/mine")));
        assert!(!request.should_move(&PathBuf::from("/theirs")));

        clipboard.mark_copy(paths(&["/mine"]));
        let request = clipboard
            .snapshot_for_external(paths(&["/mine"]), "/dest")
            .unwrap();
        assert_eq!(request.mode, ClipboardMode::Copy);
        assert!(!request.should_move(&PathBuf::from("/mine")));
    }

    #[test]
    fn test_snapshot_from_system_clipboard() {
        let clipboard = ClipboardState::new();
        let mut system = MemoryClipboard::new();
        assert!(clipboard.snapshot_from_system(&system, "/dest").unwrap().is_none());

        system.set_paths(&paths(&["/x"])).unwrap();
        let request = clipboard.snapshot_from_system(&system, "/dest").unwrap().unwrap();
        assert_eq!(request.sources, paths(&["/x"]));
        assert_eq!(request.mode, ClipboardMode::Copy);

        system.clear().unwrap();
        assert!(system.paths().unwrap().is_empty());
    }

    #[test]
    fn test_clipboard_is_shareable_across_threads() {
        let clipboard = std::sync::Arc::new(ClipboardState::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let clipboard = clipboard.clone();
                std::thread::spawn(move || {
                    clipboard.mark_copy(vec![PathBuf::from(format!("/{i}"))]);
                    clipboard.snapshot_for_paste("/dest")
                })
            })
            .collect();

        for handle in handles {
            let request = handle.join().unwrap().unwrap();
            assert_eq!(request.sources.len(), 1);
        }
        assert_eq!(clipboard.marked_paths().len(), 1);
    }
}
