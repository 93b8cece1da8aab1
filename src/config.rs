// src/config.rs

//! Configuration management for the batch loader.
//!
//! This module provides configuration parsing from TOML files, environment
//! variable overrides, and validation of configuration values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{LoaderError, Result};

// Top-level loader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    // Number of samples per batch.
    pub batch_size: usize,
    // Number of batch slots held in memory at a time.
    pub pool_size: usize,
    /// Per-sample dimensions, batch axis excluded. A batch returned by the
    /// loader has shape `[len, sample_shape...]` where `len <= batch_size`.
    pub sample_shape: Vec<usize>,
    /// Shard store I/O options.
    pub store: StoreConfig,
}

// Shard store I/O options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    // Buffer size in bytes for buffered reads.
    pub buffer_size: usize,
    // Whether to use memory-mapped I/O for large payloads.
    pub use_mmap: bool,
    // Payload size threshold (bytes) at or above which to use mmap.
    pub mmap_threshold: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            pool_size: 8,
            sample_shape: vec![1],
            store: StoreConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,      // 64 KB
            use_mmap: true,
            mmap_threshold: 1024 * 1024, // 1 MB
        }
    }
}

impl FromStr for LoaderConfig {
    type Err = LoaderError;

    /// Parse configuration from a TOML string.
    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| LoaderError::config_with_source("failed to parse TOML config", e))
    }
}

impl LoaderConfig {
    // Load configuration from a TOML file.
    //
    // # Errors
    //
    // Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoaderError::config_with_source(
                format!("failed to read config file '{}'", path.display()),
                e,
            )
        })?;
        let config: Self = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    // Apply environment variable overrides.
    //
    // Environment variables are prefixed with `SHARDPOOL_` and use
    // underscores to separate nested fields. For example:
    // - `SHARDPOOL_BATCH_SIZE` overrides `batch_size`
    // - `SHARDPOOL_SAMPLE_SHAPE` overrides `sample_shape` (comma-separated)
    // - `SHARDPOOL_STORE_USE_MMAP` overrides `store.use_mmap`
    //
    // Values that fail to parse are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("SHARDPOOL_BATCH_SIZE") {
            if let Ok(v) = val.parse() {
                self.batch_size = v;
            }
        }
        if let Ok(val) = std::env::var("SHARDPOOL_POOL_SIZE") {
            if let Ok(v) = val.parse() {
                self.pool_size = v;
            }
        }
        if let Ok(val) = std::env::var("SHARDPOOL_SAMPLE_SHAPE") {
            let dims: std::result::Result<Vec<usize>, _> =
                val.split(',').map(|d| d.trim().parse()).collect();
            if let Ok(dims) = dims {
                if !dims.is_empty() {
                    self.sample_shape = dims;
                }
            }
        }

        // Store overrides
        if let Ok(val) = std::env::var("SHARDPOOL_STORE_BUFFER_SIZE") {
            if let Ok(v) = val.parse() {
                self.store.buffer_size = v;
            }
        }
        if let Ok(val) = std::env::var("SHARDPOOL_STORE_USE_MMAP") {
            if let Ok(v) = val.parse() {
                self.store.use_mmap = v;
            }
        }
        if let Ok(val) = std::env::var("SHARDPOOL_STORE_MMAP_THRESHOLD") {
            if let Ok(v) = val.parse() {
                self.store.mmap_threshold = v;
            }
        }

        self
    }

    // Validate all configuration values.
    //
    // # Errors
    //
    // Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LoaderError::config("batch_size must be greater than 0"));
        }

        if self.pool_size == 0 {
            return Err(LoaderError::config("pool_size must be greater than 0"));
        }

        if self.sample_shape.is_empty() {
            return Err(LoaderError::config("sample_shape must not be empty"));
        }

        if self.sample_shape.iter().any(|&d| d == 0) {
            return Err(LoaderError::config(
                "sample_shape dimensions must all be greater than 0",
            ));
        }

        if self.store.buffer_size == 0 {
            return Err(LoaderError::config(
                "store.buffer_size must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Number of elements in a single sample.
    pub fn sample_elems(&self) -> usize {
        self.sample_shape.iter().product()
    }

    /// Number of samples covered by one full buffer window.
    pub fn window_samples(&self) -> usize {
        self.batch_size * self.pool_size
    }
}
