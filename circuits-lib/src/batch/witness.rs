//! # Batch Input Encoder
//!
//! Turns an epoch head and a batch of headers into the ordered field
//! elements the generated program takes as arguments. See [`BatchLayout`]
//! for the element order.
//!
//! The encoder does not check that the headers link. A batch with a broken
//! link still encodes, and it is the proof (or
//! [`BlockHeader::links_to`]) that rejects it.

use num_bigint::BigUint;
use tracing::debug;

use super::{BatchLayout, EPOCH_HEAD_WORD_INDEX, FINAL_HEADER_CHUNKS, SHA_WORD_SIZE};
use crate::{
    common::{
        constants::HEADER_WORD_SIZE,
        errors::CircuitInputError,
        padding::{pad_bytes, split, split_bytes},
    },
    header_chain::BlockHeader,
};

/// Ordered witness elements for one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WitnessVector {
    layout: BatchLayout,
    elements: Vec<BigUint>,
}

impl WitnessVector {
    pub fn layout(&self) -> BatchLayout {
        self.layout
    }

    pub fn elements(&self) -> &[BigUint] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Packed time and bits of the epoch head.
    pub fn epoch_head_word(&self) -> &BigUint {
        &self.elements[BatchLayout::EPOCH_HEAD_INDEX]
    }

    /// Previous hash of the first header, display order.
    pub fn prev_hash(&self) -> &BigUint {
        &self.elements[BatchLayout::PREV_HASH_INDEX]
    }

    pub fn intermediate_words(&self) -> &[BigUint] {
        &self.elements[self.layout.intermediate_range()]
    }

    pub fn final_chunks(&self) -> &[BigUint] {
        &self.elements[self.layout.final_range()]
    }

    /// Elements as decimal strings, in argument order.
    pub fn to_args(&self) -> Vec<String> {
        self.elements.iter().map(BigUint::to_string).collect()
    }

    pub fn into_elements(self) -> Vec<BigUint> {
        self.elements
    }
}

/// Encodes `headers` for the program generated for `headers.len()`.
///
/// ## Parameters
///
/// * `epoch_head` - First header of the epoch the batch starts in
/// * `headers` - Consecutive headers, at least two
pub fn encode(
    epoch_head: &BlockHeader,
    headers: &[BlockHeader],
) -> Result<WitnessVector, CircuitInputError> {
    let layout = BatchLayout::new(headers.len())?;
    let intermediates = &headers[..layout.intermediate_count()];
    let final_header = &headers[layout.intermediate_count()];

    let mut elements = Vec::with_capacity(layout.witness_len());
    elements.push(BigUint::from_bytes_be(
        &epoch_head.word_at(EPOCH_HEAD_WORD_INDEX)?,
    ));
    elements.extend(split(&headers[0].prev_hash_hex(), 32)?);
    for header in intermediates {
        elements.extend(split_bytes(&pad_bytes(&header.serialize()), SHA_WORD_SIZE)?);
    }
    elements.extend(split_bytes(&final_header.serialize(), HEADER_WORD_SIZE)?);

    debug_assert_eq!(elements.len(), layout.witness_len());
    debug_assert_eq!(layout.final_range().len(), FINAL_HEADER_CHUNKS);
    debug!(
        batch_size = layout.batch_size(),
        elements = elements.len(),
        "Encoded batch witness"
    );

    Ok(WitnessVector { layout, elements })
}
