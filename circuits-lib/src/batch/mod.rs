//! # Batch
//! Program generation and witness encoding for a batch of consecutive block
//! headers.
//!
//! Both halves read the shape of the circuit inputs from [`BatchLayout`], so a
//! generated program and an encoded witness for the same batch size always
//! agree on element order and count.

use std::ops::Range;

use crate::common::{
    constants::{HEADER_SIZE, HEADER_WORD_SIZE},
    errors::RangeError,
    padding::{block_count, SHA256_BLOCK_SIZE},
};

pub mod program;
pub mod witness;

/// Smallest batch the circuit accepts: one intermediate and one final header.
pub const MIN_BATCH_SIZE: usize = 2;

/// Width of a SHA-256 message word in bytes.
pub const SHA_WORD_SIZE: usize = 4;

/// 32-bit words of a SHA-padded header.
pub const INTERMEDIATE_HEADER_WORDS: usize =
    block_count(HEADER_SIZE) * SHA256_BLOCK_SIZE / SHA_WORD_SIZE;

/// 128-bit chunks the final header is split into.
pub const FINAL_HEADER_CHUNKS: usize = HEADER_SIZE / HEADER_WORD_SIZE;

/// Header word holding the epoch head's time and bits.
pub const EPOCH_HEAD_WORD_INDEX: usize = 4;

/// Index of the `time` field among the 32-bit words of a header.
pub const TIME_WORD_INDEX: usize = 68 / SHA_WORD_SIZE;

/// Index of the `bits` field among the 32-bit words of a header.
pub const BITS_WORD_INDEX: usize = 72 / SHA_WORD_SIZE;

/// Order and count of the witness elements for a batch of `batch_size`
/// headers:
///
/// * `[0]` - epoch head time and bits word
/// * `[1]` - previous hash of the first header
/// * `32 * (batch_size - 1)` words of SHA-padded intermediate headers
/// * `5` chunks of the final header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchLayout {
    batch_size: usize,
}

impl BatchLayout {
    pub const EPOCH_HEAD_INDEX: usize = 0;
    pub const PREV_HASH_INDEX: usize = 1;

    pub fn new(batch_size: usize) -> Result<Self, RangeError> {
        if batch_size < MIN_BATCH_SIZE {
            return Err(RangeError::BatchTooSmall {
                min: MIN_BATCH_SIZE,
                actual: batch_size,
            });
        }
        Ok(BatchLayout { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Headers that are passed SHA-padded, every header except the last.
    pub fn intermediate_count(&self) -> usize {
        self.batch_size - 1
    }

    pub fn witness_len(&self) -> usize {
        self.final_range().end
    }

    pub fn intermediate_range(&self) -> Range<usize> {
        let start = Self::PREV_HASH_INDEX + 1;
        start..start + self.intermediate_count() * INTERMEDIATE_HEADER_WORDS
    }

    /// Elements of the `index`th intermediate header, if there is one.
    pub fn intermediate_header_range(&self, index: usize) -> Option<Range<usize>> {
        if index >= self.intermediate_count() {
            return None;
        }
        let start = self.intermediate_range().start + index * INTERMEDIATE_HEADER_WORDS;
        Some(start..start + INTERMEDIATE_HEADER_WORDS)
    }

    pub fn final_range(&self) -> Range<usize> {
        let start = self.intermediate_range().end;
        start..start + FINAL_HEADER_CHUNKS
    }
}
