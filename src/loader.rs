// src/loader.rs

//! The windowed, pooled batch loader.
//!
//! `BatchLoader` presents a sharded dataset as a randomly-indexable
//! sequence of fixed-size batches while holding only one window of
//! `pool_size` decoded batches in memory. An access outside the current
//! window triggers a blocking refill that reads the intersecting shard
//! ranges into a flat staging buffer and repackages it into batch
//! containers.

use std::path::Path;
use std::sync::Arc;

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::index::ShardIndex;
use crate::manifest::Manifest;
use crate::shard::{FileShardStore, ShardStore, DATA_FIELD};
use crate::tensor::{Element, SampleBatch};
use crate::window::WindowPlan;

/// Windowed batch loader over a sharded dataset.
///
/// The loader requires `&mut self` for access, so the single-consumer
/// contract is enforced by the borrow checker. Returned batches are
/// `Arc` handles that stay valid after later refills overwrite their
/// pool slot.
pub struct BatchLoader<T: Element> {
    store: Arc<dyn ShardStore>,
    config: LoaderConfig,
    index: ShardIndex,
    /// Pool slots; `None` only before the slot has ever been populated.
    pool: Vec<Option<Arc<SampleBatch<T>>>>,
    /// Batch index that pool slot 0 currently represents.
    begin_batch: u64,
    /// Populated slots in the current window. Slots at or beyond this are
    /// stale and never returned.
    valid_slots: usize,
}

impl<T: Element> BatchLoader<T> {
    /// Opens a loader over the manifest at `manifest_path` using the
    /// default filesystem shard store.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the manifest cannot be
    /// read, or any shard fails to open during index construction or the
    /// initial window fill.
    pub fn open(manifest_path: impl AsRef<Path>, config: LoaderConfig) -> Result<Self> {
        let manifest = Manifest::from_file(manifest_path)?;
        let store = Arc::new(FileShardStore::new(config.store.clone()));
        Self::with_store(store, &manifest, config)
    }

    /// Opens a loader with an injected shard store capability.
    ///
    /// The index is built once here; shard counts are never re-read.
    /// The pool is filled at batch 0 before this returns, so the first
    /// `get` within the window performs no I/O.
    pub fn with_store(
        store: Arc<dyn ShardStore>,
        manifest: &Manifest,
        config: LoaderConfig,
    ) -> Result<Self> {
        config.validate()?;
        let index = ShardIndex::build(store.as_ref(), manifest)?;

        let mut loader = Self {
            store,
            pool: vec![None; config.pool_size],
            config,
            index,
            begin_batch: 0,
            valid_slots: 0,
        };
        loader.refill(0)?;
        Ok(loader)
    }

    /// Returns the batch at `batch_index`, refilling the window if the
    /// index falls outside it.
    ///
    /// # Errors
    ///
    /// Returns `BatchOutOfRange` if `batch_index >= num_batches`, or a
    /// shard error if a refill fails. A failed refill leaves the previous
    /// window intact.
    pub fn get(&mut self, batch_index: u64) -> Result<Arc<SampleBatch<T>>> {
        if batch_index >= self.num_batches() {
            return Err(LoaderError::batch_out_of_range(
                batch_index,
                self.num_batches(),
            ));
        }

        if batch_index < self.begin_batch
            || batch_index >= self.begin_batch + self.valid_slots as u64
        {
            self.refill(batch_index)?;
        }

        let slot = (batch_index - self.begin_batch) as usize;
        self.pool[slot]
            .clone()
            .ok_or_else(|| LoaderError::window(format!("pool slot {slot} is unpopulated")))
    }

    /// Repopulates the pool so slot 0 holds the batch at `begin_batch`.
    ///
    /// The new window is fully materialized before any loader state is
    /// written, so an error leaves the previous window readable.
    fn refill(&mut self, begin_batch: u64) -> Result<()> {
        let batch_size = self.config.batch_size;
        let begin_offset = begin_batch * batch_size as u64;
        let plan = WindowPlan::compute(
            &self.index,
            begin_offset,
            self.config.window_samples() as u64,
        );

        let bytes_per_sample = self.config.sample_elems() * std::mem::size_of::<T>();

        // Flat staging buffer: per-shard bulk read, then copy the needed
        // sub-range at the running offset.
        let mut staging =
            Vec::with_capacity(plan.total_samples as usize * bytes_per_sample);
        for segment in &plan.segments {
            let path = self.index.path(segment.shard).to_path_buf();
            let mut reader = self.store.open(&path)?;
            let payload = reader.read_array(DATA_FIELD, T::DTYPE)?;

            let start = segment.local_start as usize * bytes_per_sample;
            let end = start + segment.samples as usize * bytes_per_sample;
            if payload.len() < end {
                return Err(LoaderError::shard(
                    &path,
                    format!(
                        "shard payload holds {} bytes, window needs range {start}..{end}",
                        payload.len()
                    ),
                ));
            }
            staging.extend_from_slice(&payload[start..end]);
        }

        // Repackage into batch containers, the last possibly short.
        let mut batches = Vec::with_capacity(self.config.pool_size);
        let batch_stride = batch_size * bytes_per_sample;
        for chunk in staging.chunks(batch_stride) {
            let len = chunk.len() / bytes_per_sample;
            let batch = SampleBatch::from_le_bytes(len, &self.config.sample_shape, chunk)?;
            batches.push(Arc::new(batch));
        }

        tracing::debug!(
            begin_batch,
            valid_slots = batches.len(),
            window_samples = plan.total_samples,
            "window refilled"
        );

        self.valid_slots = batches.len();
        self.begin_batch = begin_batch;
        for (slot, batch) in batches.into_iter().enumerate() {
            self.pool[slot] = Some(batch);
        }

        Ok(())
    }

    /// Total number of samples in the dataset.
    pub fn total_samples(&self) -> u64 {
        self.index.total_samples()
    }

    /// Total number of batches, the last possibly short.
    pub fn num_batches(&self) -> u64 {
        let batch_size = self.config.batch_size as u64;
        self.total_samples().div_ceil(batch_size)
    }

    /// Batch index that pool slot 0 currently represents.
    pub fn begin_batch(&self) -> u64 {
        self.begin_batch
    }

    /// Populated slots in the current window.
    pub fn valid_slots(&self) -> usize {
        self.valid_slots
    }

    /// The loader's configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The cumulative shard index.
    pub fn index(&self) -> &ShardIndex {
        &self.index
    }
}
