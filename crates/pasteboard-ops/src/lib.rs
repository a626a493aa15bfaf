//! File operation engine for pasteboard.
//!
//! This crate provides clipboard-style cut/copy/paste with collision-free
//! naming, permanent deletion, rename and directory creation. Batches report
//! one result per item and keep going when an item fails.
//!
//! # Example
//!
//! ```rust,no_run
//! use pasteboard_ops::{ClipboardState, FileOperationEngine};
//!
//! let clipboard = ClipboardState::new();
//! clipboard.mark_cut(vec!["/tmp/report.txt".into()]);
//!
//! let engine = FileOperationEngine::default();
//! if let Some(request) = clipboard.snapshot_for_paste("/tmp/archive") {
//!     let results = engine.paste(&request).unwrap();
//!     if request.mode == pasteboard_ops::ClipboardMode::Cut {
//!         clipboard.clear();
//!     }
//!     for result in &results {
//!         println!("{result}");
//!     }
//! }
//! ```

mod clipboard;
mod copy;
mod create;
mod delete;
mod engine;
mod executor;
mod move_op;
mod operation;
mod progress;
mod properties;
mod rename;
mod resolver;

pub use clipboard::{ClipboardMode, ClipboardState, MemoryClipboard, SystemClipboard};
pub use engine::FileOperationEngine;
pub use executor::{OperationEvent, OperationExecutor, collect_events};
pub use operation::{ItemAction, OperationResult, Outcome, PasteRequest};
pub use progress::{BatchSummary, OperationType};
pub use rename::validate_name;
pub use resolver::{PathResolver, split_name};

// Re-export core types for convenience
pub use pasteboard_core::{
    EngineConfig, EntryKind, OpError, OpErrorKind, PropertiesSnapshot, RequestError,
};

/// Default channel buffer size for operation events.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
