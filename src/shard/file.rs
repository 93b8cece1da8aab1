// src/shard/file.rs

//! Local filesystem shard store implementation.
//!
//! This is the default `ShardStore`: shards are files in the format
//! described in [`format`](super::format). Payloads are read with buffered
//! I/O below a size threshold and memory-mapped I/O at or above it.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use super::format::{payload_checksum, ShardHeader};
use super::traits::{ShardReader, ShardStore};
use crate::config::StoreConfig;
use crate::error::{LoaderError, Result};
use crate::tensor::DType;

/// Name of the scalar field holding the shard's sample count.
pub const SAMPLE_COUNT_FIELD: &str = "sample_count";

/// Name of the bulk field holding the shard's sample data.
pub const DATA_FIELD: &str = "data";

/// Local filesystem shard store.
pub struct FileShardStore {
    config: StoreConfig,
}

impl FileShardStore {
    /// Creates a new store with the given I/O options.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }
}

impl Default for FileShardStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl ShardStore for FileShardStore {
    fn open(&self, path: &Path) -> Result<Box<dyn ShardReader>> {
        Ok(Box::new(FileShardReader::open(path, self.config.clone())?))
    }
}

/// A shard file opened for reading.
///
/// The header is parsed and validated once at open; `read_scalar` answers
/// from it without touching the payload.
pub struct FileShardReader {
    path: PathBuf,
    file: File,
    header: ShardHeader,
    payload_offset: u64,
    config: StoreConfig,
}

impl FileShardReader {
    /// Opens a shard file and parses its header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, the header is
    /// truncated or malformed, or the magic/version check fails.
    pub fn open(path: &Path, config: StoreConfig) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| LoaderError::shard_with_source(path, "failed to open shard file", e))?;

        // Header length prefix
        let mut len_bytes = [0u8; 4];
        file.read_exact(&mut len_bytes)
            .map_err(|e| LoaderError::shard_with_source(path, "failed to read header length", e))?;
        let header_len = u32::from_le_bytes(len_bytes) as usize;

        let mut header_bytes = vec![0u8; header_len];
        file.read_exact(&mut header_bytes)
            .map_err(|e| LoaderError::shard_with_source(path, "failed to read header", e))?;

        let header: ShardHeader = bincode::deserialize(&header_bytes)
            .map_err(|e| LoaderError::format_with_source("failed to deserialize shard header", e))?;

        if !header.validate_magic() {
            return Err(LoaderError::format(format!(
                "invalid magic bytes in '{}': expected {:?}, got {:?}",
                path.display(),
                ShardHeader::MAGIC,
                header.magic
            )));
        }

        if !header.validate_version() {
            return Err(LoaderError::format(format!(
                "unsupported shard version in '{}': expected {}, got {}",
                path.display(),
                ShardHeader::VERSION,
                header.version
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            payload_offset: 4 + header_len as u64,
            config,
        })
    }

    /// The parsed shard header.
    pub fn header(&self) -> &ShardHeader {
        &self.header
    }

    fn read_payload(&mut self) -> Result<Vec<u8>> {
        let payload_len = self.header.payload_len as usize;

        let payload = if self.config.use_mmap && self.header.payload_len >= self.config.mmap_threshold
        {
            // SAFETY: The file is opened read-only and the mmap does not
            // outlive this call.
            let mmap = unsafe { Mmap::map(&self.file) }.map_err(|e| {
                LoaderError::shard_with_source(&self.path, "failed to memory-map shard file", e)
            })?;

            let start = self.payload_offset as usize;
            let end = start + payload_len;
            if mmap.len() < end {
                return Err(LoaderError::shard(
                    &self.path,
                    format!(
                        "shard file truncated: expected {} payload bytes, file holds {}",
                        payload_len,
                        mmap.len().saturating_sub(start)
                    ),
                ));
            }
            mmap[start..end].to_vec()
        } else {
            self.file
                .seek(SeekFrom::Start(self.payload_offset))
                .map_err(|e| {
                    LoaderError::shard_with_source(&self.path, "failed to seek to payload", e)
                })?;

            let mut reader = BufReader::with_capacity(self.config.buffer_size, &self.file);
            let mut buf = vec![0u8; payload_len];
            reader.read_exact(&mut buf).map_err(|e| {
                LoaderError::shard_with_source(&self.path, "failed to read shard payload", e)
            })?;
            buf
        };

        let computed = payload_checksum(&payload);
        if computed != self.header.checksum {
            return Err(LoaderError::format(format!(
                "checksum mismatch in '{}': expected {}, got {}",
                self.path.display(),
                self.header.checksum,
                computed
            )));
        }

        Ok(payload)
    }
}

impl ShardReader for FileShardReader {
    fn read_scalar(&mut self, name: &str) -> Result<u64> {
        match name {
            SAMPLE_COUNT_FIELD => Ok(self.header.sample_count),
            _ => Err(LoaderError::shard(
                &self.path,
                format!("unknown scalar field '{name}'"),
            )),
        }
    }

    fn read_array(&mut self, name: &str, dtype: DType) -> Result<Vec<u8>> {
        if name != DATA_FIELD {
            return Err(LoaderError::shard(
                &self.path,
                format!("unknown array field '{name}'"),
            ));
        }

        if dtype != self.header.dtype {
            return Err(LoaderError::format(format!(
                "dtype mismatch in '{}': shard holds {}, requested {}",
                self.path.display(),
                self.header.dtype,
                dtype
            )));
        }

        self.read_payload()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
