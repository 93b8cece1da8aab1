// src/shard/format.rs

//! Shard file format specification.
//!
//! The shard format is:
//! ```text
//! +------------------------+
//! | Header length (4 bytes)|  <- u32 little-endian
//! +------------------------+
//! | Header (bincode)       |  <- ShardHeader serialized with bincode
//! +------------------------+
//! | Payload                |  <- sample data, flat little-endian
//! +------------------------+
//! ```

use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use crate::tensor::DType;

/// Header for a shard file.
///
/// The header carries everything needed to answer the sample-count query
/// and to verify payload integrity without decoding the payload itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardHeader {
    /// Magic bytes identifying this as a shard file ("SHRD")
    pub magic: [u8; 4],
    /// Format version number
    pub version: u32,
    /// Element type of the payload
    pub dtype: DType,
    /// Number of samples in the payload
    pub sample_count: u64,
    /// Payload length in bytes
    pub payload_len: u64,
    /// XXHash64 checksum of the payload
    pub checksum: u64,
}

impl ShardHeader {
    /// Magic bytes for shard files
    pub const MAGIC: [u8; 4] = *b"SHRD";

    /// Current format version
    pub const VERSION: u32 = 1;

    /// Creates a new shard header.
    pub fn new(dtype: DType, sample_count: u64, payload_len: u64, checksum: u64) -> Self {
        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
            dtype,
            sample_count,
            payload_len,
            checksum,
        }
    }

    /// Validates the header magic bytes.
    pub fn validate_magic(&self) -> bool {
        self.magic == Self::MAGIC
    }

    /// Validates the header version.
    pub fn validate_version(&self) -> bool {
        self.version == Self::VERSION
    }
}

/// Calculates the XXHash64 checksum of a shard payload.
pub fn payload_checksum(data: &[u8]) -> u64 {
    use std::hash::Hasher;
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_new() {
        let header = ShardHeader::new(DType::F32, 100, 400, 12345);

        assert_eq!(header.magic, ShardHeader::MAGIC);
        assert_eq!(header.version, ShardHeader::VERSION);
        assert_eq!(header.dtype, DType::F32);
        assert_eq!(header.sample_count, 100);
        assert_eq!(header.payload_len, 400);
        assert_eq!(header.checksum, 12345);
    }

    #[test]
    fn test_validate_magic() {
        let header = ShardHeader::new(DType::U8, 1, 1, 0);
        assert!(header.validate_magic());

        let mut invalid = header.clone();
        invalid.magic = *b"XXXX";
        assert!(!invalid.validate_magic());
    }

    #[test]
    fn test_validate_version() {
        let header = ShardHeader::new(DType::U8, 1, 1, 0);
        assert!(header.validate_version());

        let mut invalid = header.clone();
        invalid.version = 999;
        assert!(!invalid.validate_version());
    }

    #[test]
    fn test_header_serialization() {
        let header = ShardHeader::new(DType::I64, 7, 56, 98765);

        let encoded = bincode::serialize(&header).unwrap();
        let decoded: ShardHeader = bincode::deserialize(&encoded).unwrap();

        assert_eq!(decoded.magic, header.magic);
        assert_eq!(decoded.version, header.version);
        assert_eq!(decoded.dtype, header.dtype);
        assert_eq!(decoded.sample_count, header.sample_count);
        assert_eq!(decoded.payload_len, header.payload_len);
        assert_eq!(decoded.checksum, header.checksum);
    }

    #[test]
    fn test_payload_checksum() {
        let data = b"hello world";
        let checksum1 = payload_checksum(data);
        let checksum2 = payload_checksum(data);

        // Same data should produce same checksum
        assert_eq!(checksum1, checksum2);

        // Different data should produce different checksum
        let checksum3 = payload_checksum(b"different data");
        assert_ne!(checksum1, checksum3);
    }
}
