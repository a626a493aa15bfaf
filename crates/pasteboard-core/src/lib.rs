//! Core types for pasteboard.
//!
//! This crate provides the fundamental types shared by the operation engine
//! and its front ends: entry kinds, property snapshots, the per-item error
//! taxonomy, and engine configuration.

mod config;
mod entry;
mod error;

pub use config::{
    ConfigError, DEFAULT_COLLISION_MARKER, DEFAULT_MAX_COLLISION_PROBES, EngineConfig,
    EngineConfigBuilder, EngineConfigBuilderError,
};
pub use entry::{EntryKind, PropertiesSnapshot, is_hidden_name};
pub use error::{OpError, OpErrorKind, RequestError};
