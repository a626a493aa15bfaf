//! Clipboard persistence between command invocations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pasteboard_ops::{ClipboardMode, ClipboardState, SystemClipboard};
use serde::{Deserialize, Serialize};

/// On-disk session contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Session {
    /// Mode of the last mark made by this tool, if any.
    #[serde(default)]
    mode: Option<ClipboardMode>,
    /// Paths of the last mark made by this tool.
    #[serde(default)]
    marked: Vec<PathBuf>,
    /// Paths currently on the shared clipboard. Other tools may write these.
    #[serde(default)]
    clipboard: Vec<PathBuf>,
}

/// A JSON file standing in for the OS clipboard and this tool's mark state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location of the session file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("pasteboard").join("session.json"))
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> io::Result<Session> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Session::default()),
            Err(e) => Err(e),
        }
    }

    fn save(&self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, content)
    }

    /// Load the persisted mark into `clipboard`.
    pub fn restore_into(&self, clipboard: &ClipboardState) -> io::Result<()> {
        let session = self.load()?;
        match session.mode {
            Some(mode) => clipboard.mark(session.marked, mode),
            None => clipboard.clear(),
        }
        Ok(())
    }

    /// Persist the current mark of `clipboard`.
    pub fn save_marks(&self, clipboard: &ClipboardState) -> io::Result<()> {
        let mut session = self.load()?;
        session.mode = clipboard.mode();
        session.marked = clipboard.marked_paths();
        self.save(&session)
    }
}

impl SystemClipboard for SessionStore {
    fn set_paths(&mut self, paths: &[PathBuf]) -> io::Result<()> {
        let mut session = self.load()?;
        session.clipboard = paths.to_vec();
        self.save(&session)
    }

    fn paths(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self.load()?.clipboard)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.save(&Session::default())
    }
}
