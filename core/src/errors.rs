//! # Errors
//!
//! This module defines errors, returned by the library.

use relay_circuits::{CircuitInputError, FormatError, RangeError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the relay.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RelayError {
    /// Malformed headers or out of range batch parameters
    #[error("CircuitInputError: {0}")]
    CircuitInput(#[from] CircuitInputError),

    /// Returned when the next epoch head does not carry the retargeted bits
    #[error(
        "ConsensusViolation: bits {claimed_bits:08x} do not follow from epoch head bits {head_bits:08x}, expected {expected_bits:08x}"
    )]
    ConsensusViolation {
        head_bits: u32,
        claimed_bits: u32,
        expected_bits: u32,
    },
    /// Returned when a header does not commit to its predecessor
    #[error("BrokenLinkage: header at index {index} has previous hash {actual}, expected {expected}")]
    BrokenLinkage {
        index: usize,
        expected: String,
        actual: String,
    },

    /// The proving backend exited with a non zero status
    #[error("BackendError: `{command}` exited with {status}\nstdout: {stdout}\nstderr: {stderr}")]
    Backend {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },
    /// The proving backend could not be started at all
    #[error("Failed to spawn `{command}`: {source}")]
    BackendSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Missing artifact {0}, setup for this batch size was not executed")]
    MissingArtifact(PathBuf),
    #[error("MalformedProof: {0}")]
    MalformedProof(String),

    #[error("HeaderSourceError: {0}")]
    HeaderSource(String),
    #[error("BitcoinCoreRPCError: {0}")]
    BitcoinRpc(#[from] bitcoincore_rpc::Error),

    #[error("ConfigError: {0}")]
    ConfigError(String),
    #[error("Environment variable {1}: {0}")]
    EnvVarNotSet(std::env::VarError, &'static str),

    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("JsonError: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<FormatError> for RelayError {
    fn from(e: FormatError) -> Self {
        RelayError::CircuitInput(e.into())
    }
}

impl From<RangeError> for RelayError {
    fn from(e: RangeError) -> Self {
        RelayError::CircuitInput(e.into())
    }
}
