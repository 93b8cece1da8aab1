// src/shard/writer.rs

//! Shard file writer.
//!
//! Used by dataset preparation and by test fixtures. The writer buffers
//! the payload in memory, derives the sample count from the configured
//! per-sample element count, and emits the length-prefixed header followed
//! by the payload in one pass on `finish`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::format::{payload_checksum, ShardHeader};
use crate::error::{LoaderError, Result};
use crate::tensor::DType;

/// Writes shard files in the format read by `FileShardStore`.
pub struct ShardWriter {
    path: PathBuf,
    file: File,
    dtype: DType,
    /// Bytes per sample, derived from the per-sample element count.
    sample_stride: usize,
    payload: Vec<u8>,
}

impl ShardWriter {
    /// Creates a shard file at `path`.
    ///
    /// # Arguments
    ///
    /// * `dtype` - Element type of the payload.
    /// * `sample_elems` - Number of elements in one sample (product of the
    ///   per-sample dimensions).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or `sample_elems`
    /// is zero.
    pub fn create(path: impl AsRef<Path>, dtype: DType, sample_elems: usize) -> Result<Self> {
        let path = path.as_ref();
        if sample_elems == 0 {
            return Err(LoaderError::shard(path, "sample_elems must be greater than 0"));
        }

        let file = File::create(path)
            .map_err(|e| LoaderError::shard_with_source(path, "failed to create shard file", e))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            dtype,
            sample_stride: sample_elems * dtype.size_of(),
            payload: Vec::new(),
        })
    }

    /// Appends little-endian sample bytes to the payload.
    ///
    /// `bytes` may hold any number of whole or partial samples; sample
    /// alignment is only checked at `finish`.
    pub fn write_samples(&mut self, bytes: &[u8]) -> Result<()> {
        self.payload.extend_from_slice(bytes);
        Ok(())
    }

    /// Number of complete samples buffered so far.
    pub fn sample_count(&self) -> u64 {
        (self.payload.len() / self.sample_stride) as u64
    }

    /// Writes the header and payload, then flushes and syncs the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffered payload is not a whole number of
    /// samples, or if any write fails.
    pub fn finish(mut self) -> Result<()> {
        if self.payload.len() % self.sample_stride != 0 {
            return Err(LoaderError::shard(
                &self.path,
                format!(
                    "payload of {} bytes is not a multiple of the {}-byte sample stride",
                    self.payload.len(),
                    self.sample_stride
                ),
            ));
        }

        let header = ShardHeader::new(
            self.dtype,
            self.sample_count(),
            self.payload.len() as u64,
            payload_checksum(&self.payload),
        );

        let header_bytes = bincode::serialize(&header)
            .map_err(|e| LoaderError::format_with_source("failed to serialize shard header", e))?;

        let mut writer = BufWriter::new(&mut self.file);
        writer
            .write_all(&(header_bytes.len() as u32).to_le_bytes())
            .and_then(|()| writer.write_all(&header_bytes))
            .and_then(|()| writer.write_all(&self.payload))
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoaderError::shard_with_source(&self.path, "failed to write shard file", e)
            })?;
        drop(writer);

        self.file
            .sync_all()
            .map_err(|e| LoaderError::shard_with_source(&self.path, "failed to sync shard file", e))
    }
}
