//! Bulk copy engine and replication driver for feedrep
//!
//! This crate ties the pieces of a feed replication together: a
//! [`BulkCopyEngine`] moves the data, the pattern resolver works out which
//! fixed path the include path anchors on, and the completion marker signals
//! readiness to downstream consumers.
//!
//! # Features
//!
//! - **Local engine**: bounded worker pool sized by `max_maps`
//! - **Folder sync**: files whose size and modification time match are skipped
//! - **Bandwidth cap**: every worker is held to `map_bandwidth_kb`
//! - **Completion markers**: filesystem feeds get `_SUCCESS` files after the copy
//!
//! # Examples
//!
//! ```rust,no_run
//! use feedrep_engine::{FeedReplicator, LocalCopyEngine, ReplicationRequest};
//! use feedrep_pattern::GlobPatternCompiler;
//! use feedrep_types::StorageType;
//! use std::path::PathBuf;
//!
//! # async fn example() -> feedrep_types::Result<()> {
//! let replicator = FeedReplicator::new(LocalCopyEngine::new(), GlobPatternCompiler::new());
//! let request = ReplicationRequest::new(
//!     vec![PathBuf::from("/data/in")],
//!     "/replica",
//!     StorageType::Filesystem,
//! )
//! .with_include_path("/data/in/clicks/*/hourly");
//!
//! let report = replicator.run(&request).await?;
//! println!("Copied {} files", report.stats.files_copied);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod options;
pub mod replicator;
pub mod throttle;

pub use engine::{BulkCopyEngine, LocalCopyEngine};
pub use options::CopyOptions;
pub use replicator::{FeedReplicator, ReplicationReport, ReplicationRequest};
pub use throttle::Throttle;
