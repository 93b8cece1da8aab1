// src/shard/traits.rs

//! Shard store abstraction traits.
//!
//! This module defines the capability seam between the loader core and the
//! record files it reads. The loader only ever talks to shards through
//! these traits, so alternative stores (or test doubles with I/O counters)
//! can be used interchangeably.

use std::path::Path;

use crate::error::Result;
use crate::tensor::DType;

/// A handle to an opened shard.
///
/// Each shard exposes exactly two named entities: the scalar field
/// `"sample_count"` and the bulk field `"data"`. The handle releases its
/// underlying resources on drop, on every exit path including errors.
pub trait ShardReader: Send {
    /// Reads a named scalar field from the shard.
    ///
    /// # Errors
    ///
    /// Returns an error if the field name is unknown or the read fails.
    fn read_scalar(&mut self, name: &str) -> Result<u64>;

    /// Reads an entire named array field as little-endian bytes.
    ///
    /// # Arguments
    ///
    /// * `name` - The field name (`"data"` for the sample array).
    /// * `dtype` - The expected element type of the array.
    ///
    /// # Errors
    ///
    /// Returns an error if the field name is unknown, the stored element
    /// type does not match `dtype`, or the read fails.
    fn read_array(&mut self, name: &str, dtype: DType) -> Result<Vec<u8>>;

    /// The path this shard was opened from.
    fn path(&self) -> &Path;
}

/// The shard store capability.
///
/// Opens shards by path, producing reader handles. Object-safe so the
/// loader can hold `Arc<dyn ShardStore>`.
pub trait ShardStore: Send + Sync {
    /// Opens the shard at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the shard does not exist or cannot be opened.
    fn open(&self, path: &Path) -> Result<Box<dyn ShardReader>>;
}
