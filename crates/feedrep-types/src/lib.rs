//! Core type system and error handling for feedrep
//!
//! This crate provides the foundational types shared by every feedrep crate:
//!
//! - **Error handling**: a single error enum with kinds and severity levels
//! - **Core types**: copy statistics, storage types, run identifiers
//! - **Traits**: the pattern compiler capability
//! - **Configuration**: validated worker count and bandwidth values
//!
//! # Features
//!
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use feedrep_types::{CopyStats, Result, StorageType};
//!
//! fn example_operation() -> Result<CopyStats> {
//!     let storage: StorageType = "FILESYSTEM".parse()?;
//!     assert!(storage.marks_completion());
//!     Ok(CopyStats::new())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{BandwidthKb, WorkerCount};
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use traits::*;
pub use types::*;
