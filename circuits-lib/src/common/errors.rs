//! # Errors
//!
//! Input errors raised by the codec, the padding helpers and the batch
//! builders. Both kinds are fatal to the single request: malformed input is
//! never retried and out-of-range parameters are rejected before any I/O.

use thiserror::Error;

/// Malformed hex or byte lengths.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Hex length {len} is not a multiple of {unit} characters")]
    UnalignedLength { len: usize, unit: usize },
    #[error("Unit width must be greater than zero")]
    ZeroUnitWidth,
    #[error("Invalid numeric field {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Parameters outside of their accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Batch size must be at least {min}, got {actual}")]
    BatchTooSmall { min: usize, actual: usize },
    #[error("Word index {index} is out of range, a header has {count} words")]
    WordIndexOutOfRange { index: usize, count: usize },
    #[error("End height {end} must be greater than start height {start}")]
    InvertedHeights { start: u64, end: u64 },
}

/// Errors returned by the circuit input builders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CircuitInputError {
    #[error("FormatError: {0}")]
    Format(#[from] FormatError),
    #[error("RangeError: {0}")]
    Range(#[from] RangeError),
}

impl From<hex::FromHexError> for CircuitInputError {
    fn from(e: hex::FromHexError) -> Self {
        CircuitInputError::Format(e.into())
    }
}
