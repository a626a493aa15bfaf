//! Collision-free destination naming for paste targets.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pasteboard_core::{EngineConfig, EntryKind, OpError};

/// Computes a destination path that does not collide with an existing entry.
///
/// For a file `report.txt` already present in the destination, tries
/// `report_copy1.txt`, `report_copy2.txt`, ... and returns the first free one.
/// Directories are never split at a dot: `v1.2` becomes `v1.2_copy1`.
///
/// Existence is read from the live filesystem, so call this right before the
/// write that uses its answer.
#[derive(Debug, Clone)]
pub struct PathResolver {
    max_probes: u32,
    marker: String,
}

impl PathResolver {
    /// Create a resolver with the given probe cap and marker.
    pub fn new(max_probes: u32, marker: impl Into<String>) -> Self {
        Self {
            max_probes,
            marker: marker.into(),
        }
    }

    /// Create a resolver from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_collision_probes, config.collision_marker.clone())
    }

    /// Resolve `destination_dir/candidate_name` to a free path.
    pub fn resolve(
        &self,
        destination_dir: &Path,
        candidate_name: &OsStr,
        kind: EntryKind,
    ) -> Result<PathBuf, OpError> {
        let direct = destination_dir.join(candidate_name);
        if !occupied(&direct)? {
            return Ok(direct);
        }

        let (stem, extension) = split_name(candidate_name, kind);
        for n in 1..=self.max_probes {
            let mut name = stem.clone();
            name.push(&self.marker);
            name.push(n.to_string());
            name.push(&extension);

            let probe = destination_dir.join(&name);
            if !occupied(&probe)? {
                return Ok(probe);
            }
        }

        Err(OpError::other(
            direct,
            format!("no free name after {} probes", self.max_probes),
        ))
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Split a name into `(stem, extension)`, the extension keeping its dot.
///
/// Only files have extensions. A leading dot does not start an extension, so
/// `.bashrc` stays whole.
pub fn split_name(name: &OsStr, kind: EntryKind) -> (OsString, OsString) {
    if kind.is_dir() {
        return (name.to_os_string(), OsString::new());
    }

    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            (stem.to_os_string(), dotted)
        }
        _ => (name.to_os_string(), OsString::new()),
    }
}

/// Whether anything, including a dangling symlink, sits at `path`.
fn occupied(path: &Path) -> Result<bool, OpError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(OpError::io(path, &e)),
    }
}
