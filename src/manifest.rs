// src/manifest.rs

//! Shard manifest parsing.
//!
//! A manifest is a UTF-8 text file with one shard path per line; the line
//! order defines the global sample order. Surrounding whitespace is
//! trimmed and blank lines are skipped.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{LoaderError, Result};

/// An ordered list of shard paths.
#[derive(Debug, Clone)]
pub struct Manifest {
    shards: Vec<PathBuf>,
}

impl Manifest {
    /// Loads a manifest from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            LoaderError::manifest_with_source(path, "failed to open manifest file", e)
        })?;
        Self::from_reader(file)
            .map_err(|e| match e {
                LoaderError::Manifest { message, source, .. } => LoaderError::Manifest {
                    path: path.to_path_buf(),
                    message,
                    source,
                },
                other => other,
            })
    }

    /// Parses a manifest from any reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or yields invalid UTF-8.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut shards = Vec::new();

        for line in BufReader::new(reader).lines() {
            let line = line.map_err(|e| {
                LoaderError::manifest_with_source("<reader>", "failed to read manifest line", e)
            })?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                shards.push(PathBuf::from(trimmed));
            }
        }

        Ok(Self { shards })
    }

    /// Builds a manifest directly from a list of shard paths.
    pub fn from_paths(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            shards: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// The shard paths in global order.
    pub fn shards(&self) -> &[PathBuf] {
        &self.shards
    }

    /// Number of shards listed.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_reader_basic() {
        let manifest = Manifest::from_reader("a.shard\nb.shard\nc.shard\n".as_bytes()).unwrap();
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.shards()[0], PathBuf::from("a.shard"));
        assert_eq!(manifest.shards()[2], PathBuf::from("c.shard"));
    }

    #[test]
    fn test_from_reader_trims_and_skips_blanks() {
        let text = "  a.shard  \n\n\t b.shard\n   \n";
        let manifest = Manifest::from_reader(text.as_bytes()).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.shards()[0], PathBuf::from("a.shard"));
        assert_eq!(manifest.shards()[1], PathBuf::from("b.shard"));
    }

    #[test]
    fn test_from_reader_preserves_order() {
        let manifest = Manifest::from_reader("z.shard\na.shard\n".as_bytes()).unwrap();
        assert_eq!(manifest.shards()[0], PathBuf::from("z.shard"));
        assert_eq!(manifest.shards()[1], PathBuf::from("a.shard"));
    }

    #[test]
    fn test_from_reader_empty() {
        let manifest = Manifest::from_reader("".as_bytes()).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_from_reader_no_trailing_newline() {
        let manifest = Manifest::from_reader("a.shard\nb.shard".as_bytes()).unwrap();
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "shard-000.bin").unwrap();
        writeln!(file, "shard-001.bin").unwrap();

        let manifest = Manifest::from_file(file.path()).unwrap();
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_from_file_not_found() {
        let result = Manifest::from_file("/nonexistent/manifest.txt");
        assert!(result.is_err());
        assert!(matches!(
            result.err().unwrap(),
            LoaderError::Manifest { .. }
        ));
    }

    #[test]
    fn test_from_paths() {
        let manifest = Manifest::from_paths(["x.bin", "y.bin"]);
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.shards()[1], PathBuf::from("y.bin"));
    }
}
