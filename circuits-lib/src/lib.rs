//! # Relay Circuits
//!
//! Pure building blocks for proving that a run of Bitcoin block headers is a
//! valid chain segment inside an arithmetic circuit:
//!
//! - [`header_chain`]: header codec and the difficulty retarget validator.
//! - [`common`]: constants, hashing, endianness and SHA-256 padding helpers.
//! - [`batch`]: program generation and witness encoding for a batch of headers.
//!
//! Nothing in this crate performs I/O.

pub mod batch;
pub mod common;
pub mod header_chain;

pub use batch::{
    program::{generate, BatchProgram},
    witness::{encode, WitnessVector},
    BatchLayout,
};
pub use common::errors::{CircuitInputError, FormatError, RangeError};
pub use header_chain::{
    retarget::{RetargetRule, RetargetValidator, RetargetVerdict},
    BlockHeader, HeaderInfo,
};
