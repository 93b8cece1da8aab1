// src/tensor.rs

//! Sample element types and batch containers.
//!
//! Shard payloads are flat little-endian byte arrays. The [`Element`] trait
//! ties a Rust scalar type to its on-disk [`DType`] tag and its
//! little-endian encoding, and [`SampleBatch`] is the decoded, batch-shaped
//! container handed out by the loader.

use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, Result};

/// Element type tag stored in shard headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    F32,
    F64,
    I32,
    I64,
    U8,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_of(&self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F64 => 8,
            DType::I32 => 4,
            DType::I64 => 8,
            DType::U8 => 1,
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::U8 => "u8",
        };
        write!(f, "{name}")
    }
}

/// A scalar type that can be stored in a shard payload.
///
/// Implementations decode and encode single elements in little-endian byte
/// order, matching the shard file format.
pub trait Element: Copy + Send + Sync + 'static {
    /// The on-disk type tag for this element type.
    const DTYPE: DType;

    /// Decodes one element from exactly `size_of::<Self>()` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Appends the little-endian encoding of this element to `out`.
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! element_impl {
    ($ty:ty, $dtype:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

element_impl!(f32, DType::F32);
element_impl!(f64, DType::F64);
element_impl!(i32, DType::I32);
element_impl!(i64, DType::I64);
element_impl!(u8, DType::U8);

/// A decoded batch of samples.
///
/// Axis 0 of `shape` is the batch axis; the remaining axes are the
/// per-sample dimensions. Data is stored flat in row-major order.
#[derive(Debug, Clone)]
pub struct SampleBatch<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Element> SampleBatch<T> {
    /// Decodes a batch from little-endian payload bytes.
    ///
    /// # Arguments
    ///
    /// * `len` - Number of samples in the batch (batch axis length)
    /// * `sample_shape` - Per-sample dimensions, batch axis excluded
    /// * `bytes` - Exactly `len * product(sample_shape) * size_of::<T>()` bytes
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not exactly the expected length.
    pub fn from_le_bytes(len: usize, sample_shape: &[usize], bytes: &[u8]) -> Result<Self> {
        let sample_elems: usize = sample_shape.iter().product();
        let expected = len * sample_elems * std::mem::size_of::<T>();
        if bytes.len() != expected {
            return Err(LoaderError::format(format!(
                "expected {expected} payload bytes for {len} samples, got {}",
                bytes.len()
            )));
        }

        let data = bytes
            .chunks_exact(std::mem::size_of::<T>())
            .map(T::read_le)
            .collect();

        let mut shape = Vec::with_capacity(sample_shape.len() + 1);
        shape.push(len);
        shape.extend_from_slice(sample_shape);

        Ok(Self { shape, data })
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.shape[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full shape including the batch axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flat element data in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The elements of a single sample, or `None` if `index` is out of range.
    pub fn sample(&self, index: usize) -> Option<&[T]> {
        if index >= self.len() {
            return None;
        }
        let stride = self.sample_elems();
        Some(&self.data[index * stride..(index + 1) * stride])
    }

    fn sample_elems(&self) -> usize {
        self.shape[1..].iter().product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_sizes() {
        assert_eq!(DType::F32.size_of(), 4);
        assert_eq!(DType::F64.size_of(), 8);
        assert_eq!(DType::I32.size_of(), 4);
        assert_eq!(DType::I64.size_of(), 8);
        assert_eq!(DType::U8.size_of(), 1);
    }

    #[test]
    fn test_dtype_display() {
        assert_eq!(DType::F32.to_string(), "f32");
        assert_eq!(DType::U8.to_string(), "u8");
    }

    #[test]
    fn test_dtype_matches_element_size() {
        assert_eq!(DType::F32.size_of(), std::mem::size_of::<f32>());
        assert_eq!(DType::F64.size_of(), std::mem::size_of::<f64>());
        assert_eq!(DType::I32.size_of(), std::mem::size_of::<i32>());
        assert_eq!(DType::I64.size_of(), std::mem::size_of::<i64>());
        assert_eq!(DType::U8.size_of(), std::mem::size_of::<u8>());
    }

    #[test]
    fn test_element_roundtrip_f32() {
        let mut bytes = Vec::new();
        1.5f32.write_le(&mut bytes);
        assert_eq!(bytes.len(), 4);
        assert_eq!(f32::read_le(&bytes), 1.5);
    }

    #[test]
    fn test_element_roundtrip_i64() {
        let mut bytes = Vec::new();
        (-42i64).write_le(&mut bytes);
        assert_eq!(bytes.len(), 8);
        assert_eq!(i64::read_le(&bytes), -42);
    }

    #[test]
    fn test_element_roundtrip_u8() {
        let mut bytes = Vec::new();
        200u8.write_le(&mut bytes);
        assert_eq!(bytes, vec![200]);
        assert_eq!(u8::read_le(&bytes), 200);
    }

    fn encode_f32(values: &[f32]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            v.write_le(&mut bytes);
        }
        bytes
    }

    #[test]
    fn test_batch_from_bytes() {
        let bytes = encode_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let batch = SampleBatch::<f32>::from_le_bytes(3, &[2], &bytes).unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.shape(), &[3, 2]);
        assert_eq!(batch.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(batch.sample(0).unwrap(), &[1.0, 2.0]);
        assert_eq!(batch.sample(2).unwrap(), &[5.0, 6.0]);
        assert!(batch.sample(3).is_none());
    }

    #[test]
    fn test_batch_scalar_samples() {
        let bytes = encode_f32(&[7.0, 8.0]);
        let batch = SampleBatch::<f32>::from_le_bytes(2, &[1], &bytes).unwrap();

        assert_eq!(batch.shape(), &[2, 1]);
        assert_eq!(batch.sample(1).unwrap(), &[8.0]);
    }

    #[test]
    fn test_batch_length_mismatch() {
        let bytes = encode_f32(&[1.0, 2.0, 3.0]);
        let result = SampleBatch::<f32>::from_le_bytes(2, &[2], &bytes);

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_batch() {
        let batch = SampleBatch::<f32>::from_le_bytes(0, &[4], &[]).unwrap();

        assert!(batch.is_empty());
        assert_eq!(batch.shape(), &[0, 4]);
        assert!(batch.sample(0).is_none());
    }

    #[test]
    fn test_batch_i64_decode() {
        let mut bytes = Vec::new();
        for v in [10i64, -20, 30] {
            v.write_le(&mut bytes);
        }
        let batch = SampleBatch::<i64>::from_le_bytes(3, &[1], &bytes).unwrap();

        assert_eq!(batch.data(), &[10, -20, 30]);
    }
}
