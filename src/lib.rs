// src/lib.rs

//! Shardpool - Windowed, pooled batch loader
//!
//! This crate presents a dataset sharded across record files as a single
//! randomly-indexable sequence of fixed-size batches, while holding only a
//! bounded window of decoded batches in memory.
//!
//! ```text
//! manifest -> ShardIndex -> cumulative offsets -> WindowPlan -> staging
//!          -> SampleBatch pool -> BatchLoader::get -> caller
//! ```
//!
//! The loader reads shards only through the [`ShardStore`] capability; a
//! local-filesystem store ([`FileShardStore`]) backed by a checksummed
//! record-file format ships as the default, and [`ShardWriter`] produces
//! files in that format.
//!
//! # Example
//!
//! ```no_run
//! use shardpool::{BatchLoader, LoaderConfig};
//!
//! let config = LoaderConfig {
//!     batch_size: 32,
//!     pool_size: 8,
//!     sample_shape: vec![28, 28],
//!     ..Default::default()
//! };
//!
//! let mut loader: BatchLoader<f32> = BatchLoader::open("manifest.txt", config).unwrap();
//! let batch = loader.get(0).unwrap();
//! assert_eq!(batch.shape()[1..], [28, 28]);
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod manifest;
pub mod shard;
pub mod tensor;
pub mod window;

// Re-export commonly used types for convenience
pub use config::{LoaderConfig, StoreConfig};
pub use error::{LoaderError, Result};
pub use index::ShardIndex;
pub use loader::BatchLoader;
pub use manifest::Manifest;
pub use shard::{FileShardStore, ShardHeader, ShardReader, ShardStore, ShardWriter};
pub use tensor::{DType, Element, SampleBatch};
pub use window::{CopySegment, WindowPlan};
