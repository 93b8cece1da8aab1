// src/window.rs

//! Window planning: which shard ranges feed a buffer refill.
//!
//! Planning is pure arithmetic over the cumulative offset table, separated
//! from the I/O that executes it so the interval math is testable without
//! a filesystem.

use crate::index::ShardIndex;

/// One contiguous run of samples to copy out of a single shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySegment {
    /// Index of the shard in the manifest.
    pub shard: usize,
    /// First sample to copy, local to the shard.
    pub local_start: u64,
    /// Number of samples to copy.
    pub samples: u64,
}

/// The ordered copy segments for one window refill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    /// Segments in global sample order.
    pub segments: Vec<CopySegment>,
    /// Total samples the window will hold.
    pub total_samples: u64,
}

impl WindowPlan {
    /// Plans the window `[begin, begin + samples)`.
    ///
    /// The window is clamped at the dataset's total sample count: a window
    /// reaching past the end is satisfied partially, and a window starting
    /// at or past the end is empty. Empty shards contribute no segments.
    pub fn compute(index: &ShardIndex, begin: u64, samples: u64) -> Self {
        let end = (begin + samples).min(index.total_samples());

        let (first_shard, _) = match index.locate(begin) {
            Some(loc) => loc,
            None => {
                return Self {
                    segments: Vec::new(),
                    total_samples: 0,
                };
            }
        };

        let mut segments = Vec::new();
        for shard in first_shard..index.num_shards() {
            let (shard_start, shard_end) = index.shard_range(shard);
            if shard_start >= end {
                break;
            }

            let seg_begin = begin.max(shard_start);
            let seg_end = end.min(shard_end);
            if seg_begin < seg_end {
                segments.push(CopySegment {
                    shard,
                    local_start: seg_begin - shard_start,
                    samples: seg_end - seg_begin,
                });
            }
        }

        Self {
            segments,
            total_samples: end - begin,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
