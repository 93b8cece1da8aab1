// src/shard/mod.rs

//! Shard store abstraction and the default filesystem implementation.
//!
//! The loader core consumes shards only through the [`ShardStore`] and
//! [`ShardReader`] traits, so alternative stores (or instrumented test
//! doubles) slot in without touching the core. This module also ships the
//! default store: record files with a bincode header and a checksummed
//! little-endian payload, written by [`ShardWriter`].
//!
//! # Example
//!
//! ```no_run
//! use shardpool::shard::{FileShardStore, ShardStore, ShardWriter, DATA_FIELD};
//! use shardpool::DType;
//! use std::path::Path;
//!
//! // Write a shard of 2-element f32 samples
//! let mut writer = ShardWriter::create("train-000.shard", DType::F32, 2).unwrap();
//! writer.write_samples(&1.0f32.to_le_bytes()).unwrap();
//! writer.write_samples(&2.0f32.to_le_bytes()).unwrap();
//! writer.finish().unwrap();
//!
//! // Read it back
//! let store = FileShardStore::default();
//! let mut reader = store.open(Path::new("train-000.shard")).unwrap();
//! let bytes = reader.read_array(DATA_FIELD, DType::F32).unwrap();
//! assert_eq!(bytes.len(), 8);
//! ```

mod file;
mod format;
mod traits;
mod writer;

pub use file::{FileShardReader, FileShardStore, DATA_FIELD, SAMPLE_COUNT_FIELD};
pub use format::{payload_checksum, ShardHeader};
pub use traits::{ShardReader, ShardStore};
pub use writer::ShardWriter;
