//! Common types for yolo-weights
//!
//! This crate provides the foundational types shared across the workspace:
//! the error taxonomy, store configuration, format descriptors, and the
//! matrix representations handed to callers.

pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod matrix;

pub use backend::{BackendMatrix, MatrixBackend};
pub use config::{BackendKind, ConfigError, SourceKind, StoreConfig};
pub use error::*;
pub use format::*;
pub use matrix::RowMajorMatrix;
