//! Engine configuration.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on collision-suffix probes.
pub const DEFAULT_MAX_COLLISION_PROBES: u32 = 10_000;

/// Default marker inserted between stem and counter on collision.
pub const DEFAULT_COLLISION_MARKER: &str = "_copy";

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`EngineConfig`].
    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A field holds an unusable value.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration for the file operation engine.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum `_copyN` suffixes probed before giving up.
    #[builder(default = "DEFAULT_MAX_COLLISION_PROBES")]
    pub max_collision_probes: u32,

    /// Carry modification times over to copied files.
    #[builder(default = "true")]
    pub preserve_timestamps: bool,

    /// Copy symlinks as links rather than as their target's content.
    #[builder(default = "true")]
    pub copy_symlinks_as_links: bool,

    /// Marker between stem and counter, e.g. `_copy` in `foo_copy1.txt`.
    #[builder(default = "DEFAULT_COLLISION_MARKER.to_string()")]
    pub collision_marker: String,
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_collision_probes == Some(0) {
            return Err("max_collision_probes must be greater than zero".to_string());
        }
        if let Some(ref marker) = self.collision_marker {
            validate_marker(marker)?;
        }
        Ok(())
    }
}

fn validate_marker(marker: &str) -> Result<(), String> {
    if marker.is_empty() {
        return Err("collision_marker cannot be empty".to_string());
    }
    if marker.contains('/') || marker.contains('\0') {
        return Err("collision_marker cannot contain '/' or NUL".to_string());
    }
    Ok(())
}

impl EngineConfig {
    /// Create a new engine config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Default location of the config file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pasteboard").join("config.toml"))
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, or return defaults if no file exists.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check field values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_collision_probes == 0 {
            return Err(ConfigError::Invalid {
                message: "max_collision_probes must be greater than zero".to_string(),
            });
        }
        validate_marker(&self.collision_marker).map_err(|message| ConfigError::Invalid { message })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_collision_probes: DEFAULT_MAX_COLLISION_PROBES,
            preserve_timestamps: true,
            copy_symlinks_as_links: true,
            collision_marker: DEFAULT_COLLISION_MARKER.to_string(),
        }
    }
}
