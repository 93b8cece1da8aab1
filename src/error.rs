// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {

    #[error("Manifest error at '{path}': {message}")]
    Manifest {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Shard error at '{path}': {message}")]
    Shard {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Shard format error: {message}")]
    Format {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Batch {index} out of range (total batches: {num_batches})")]
    BatchOutOfRange {
        index: u64,
        num_batches: u64,
    },

    #[error("Window error: {message}")]
    Window {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LoaderError>;

// Convenience constructors
impl LoaderError {

    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn manifest_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn shard(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Shard {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn shard_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Shard {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
            source: None,
        }
    }

    pub fn format_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Format {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn batch_out_of_range(index: u64, num_batches: u64) -> Self {
        Self::BatchOutOfRange { index, num_batches }
    }

    pub fn window(message: impl Into<String>) -> Self {
        Self::Window {
            message: message.into(),
        }
    }
}
