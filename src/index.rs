// src/index.rs

//! Global-to-local sample index across shards.
//!
//! The index snapshots the per-shard sample counts once at build time and
//! answers interval-containment queries over the cumulative offset table.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::manifest::Manifest;
use crate::shard::{ShardStore, SAMPLE_COUNT_FIELD};

/// Cumulative sample index over an ordered list of shards.
///
/// The offset table has `num_shards + 1` entries: entry `i` is the global
/// index of shard `i`'s first sample, and the last entry is the total
/// sample count. The table is non-decreasing by construction.
#[derive(Debug, Clone)]
pub struct ShardIndex {
    paths: Vec<PathBuf>,
    /// Cumulative offsets, `num_shards + 1` entries.
    offsets: Vec<u64>,
}

impl ShardIndex {
    /// Builds the index by reading each shard's sample count.
    ///
    /// Shards are opened in manifest order and released immediately after
    /// the count is read.
    ///
    /// # Errors
    ///
    /// Returns an error if any shard cannot be opened or its count cannot
    /// be read. There is no partial-dataset recovery.
    pub fn build(store: &dyn ShardStore, manifest: &Manifest) -> Result<Self> {
        let mut offsets = Vec::with_capacity(manifest.len() + 1);
        let mut running_total = 0u64;

        for path in manifest.shards() {
            offsets.push(running_total);
            let mut reader = store.open(path)?;
            running_total += reader.read_scalar(SAMPLE_COUNT_FIELD)?;
        }
        offsets.push(running_total);

        tracing::info!(
            shards = manifest.len(),
            total_samples = running_total,
            "shard index built"
        );

        Ok(Self {
            paths: manifest.shards().to_vec(),
            offsets,
        })
    }

    /// Number of shards in the index.
    pub fn num_shards(&self) -> usize {
        self.paths.len()
    }

    /// Total number of samples across all shards.
    pub fn total_samples(&self) -> u64 {
        *self.offsets.last().unwrap_or(&0)
    }

    /// Path of shard `i`.
    pub fn path(&self, shard: usize) -> &Path {
        &self.paths[shard]
    }

    /// Global sample range `[start, end)` covered by shard `i`.
    pub fn shard_range(&self, shard: usize) -> (u64, u64) {
        (self.offsets[shard], self.offsets[shard + 1])
    }

    /// Number of samples in shard `i`.
    pub fn shard_samples(&self, shard: usize) -> u64 {
        self.offsets[shard + 1] - self.offsets[shard]
    }

    /// Maps a global sample index to `(shard_index, local_offset)`.
    ///
    /// Returns `None` if `sample` is at or beyond the total sample count.
    /// Empty shards are skipped: the containing shard is the first whose
    /// interval actually holds the sample.
    pub fn locate(&self, sample: u64) -> Option<(usize, u64)> {
        if sample >= self.total_samples() {
            return None;
        }

        // Linear interval scan over the cumulative table.
        for shard in 0..self.num_shards() {
            if sample < self.offsets[shard + 1] {
                return Some((shard, sample - self.offsets[shard]));
            }
        }

        None
    }

    /// The cumulative offset table.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoaderError, Result};
    use crate::shard::{ShardReader, ShardStore};
    use crate::tensor::DType;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    /// Mock store serving in-memory sample counts.
    struct MockStore {
        counts: Mutex<HashMap<PathBuf, u64>>,
    }

    impl MockStore {
        fn new(counts: &[(&str, u64)]) -> Self {
            Self {
                counts: Mutex::new(
                    counts
                        .iter()
                        .map(|(p, c)| (PathBuf::from(p), *c))
                        .collect(),
                ),
            }
        }
    }

    struct MockReader {
        path: PathBuf,
        count: u64,
    }

    impl ShardReader for MockReader {
        fn read_scalar(&mut self, name: &str) -> Result<u64> {
            match name {
                SAMPLE_COUNT_FIELD => Ok(self.count),
                _ => Err(LoaderError::shard(&self.path, "unknown scalar field")),
            }
        }

        fn read_array(&mut self, _name: &str, _dtype: DType) -> Result<Vec<u8>> {
            Err(LoaderError::shard(&self.path, "no data in mock"))
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl ShardStore for MockStore {
        fn open(&self, path: &Path) -> Result<Box<dyn ShardReader>> {
            let counts = self.counts.lock().unwrap();
            let count = *counts
                .get(path)
                .ok_or_else(|| LoaderError::shard(path, "not found"))?;
            Ok(Box::new(MockReader {
                path: path.to_path_buf(),
                count,
            }))
        }
    }

    fn build_index(counts: &[(&str, u64)]) -> ShardIndex {
        let store = MockStore::new(counts);
        let manifest = Manifest::from_paths(counts.iter().map(|(p, _)| *p));
        ShardIndex::build(&store, &manifest).unwrap()
    }

    #[test]
    fn test_offset_table_shape() {
        let index = build_index(&[("a", 7), ("b", 5), ("c", 3)]);

        assert_eq!(index.num_shards(), 3);
        assert_eq!(index.offsets(), &[0, 7, 12, 15]);
        assert_eq!(index.total_samples(), 15);
    }

    #[test]
    fn test_offset_table_non_decreasing() {
        let index = build_index(&[("a", 4), ("b", 0), ("c", 9), ("d", 0)]);

        for pair in index.offsets().windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(index.total_samples(), 13);
    }

    #[test]
    fn test_locate_within_shards() {
        let index = build_index(&[("a", 7), ("b", 5)]);

        assert_eq!(index.locate(0), Some((0, 0)));
        assert_eq!(index.locate(6), Some((0, 6)));
        assert_eq!(index.locate(7), Some((1, 0)));
        assert_eq!(index.locate(11), Some((1, 4)));
    }

    #[test]
    fn test_locate_out_of_range() {
        let index = build_index(&[("a", 7), ("b", 5)]);

        assert_eq!(index.locate(12), None);
        assert_eq!(index.locate(1000), None);
    }

    #[test]
    fn test_locate_skips_empty_shards() {
        let index = build_index(&[("a", 3), ("empty", 0), ("b", 2)]);

        assert_eq!(index.locate(2), Some((0, 2)));
        // Sample 3 belongs to shard 2, not the empty shard 1
        assert_eq!(index.locate(3), Some((2, 0)));
    }

    #[test]
    fn test_shard_range() {
        let index = build_index(&[("a", 7), ("b", 5)]);

        assert_eq!(index.shard_range(0), (0, 7));
        assert_eq!(index.shard_range(1), (7, 12));
        assert_eq!(index.shard_samples(0), 7);
        assert_eq!(index.shard_samples(1), 5);
    }

    #[test]
    fn test_empty_manifest() {
        let index = build_index(&[]);

        assert_eq!(index.num_shards(), 0);
        assert_eq!(index.total_samples(), 0);
        assert_eq!(index.offsets(), &[0]);
        assert_eq!(index.locate(0), None);
    }

    #[test]
    fn test_build_fails_on_missing_shard() {
        let store = MockStore::new(&[("a", 7)]);
        let manifest = Manifest::from_paths(["a", "missing"]);

        let result = ShardIndex::build(&store, &manifest);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_shard() {
        let index = build_index(&[("only", 4)]);

        assert_eq!(index.total_samples(), 4);
        assert_eq!(index.locate(3), Some((0, 3)));
        assert_eq!(index.locate(4), None);
    }
}
