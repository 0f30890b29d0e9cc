//! # Proving Backends
//!
//! A proving backend turns a generated batch program into keys, witnesses,
//! proofs and a verifier contract. Every operation reads and writes the files
//! named by [`ArtifactPaths`], so separate processes can run setup and proving
//! for the same batch size.
//!
//! [`ZokratesCli`] drives the `zokrates` binary. Tests can implement
//! [`ProvingBackend`] directly to avoid it.

use crate::config::ArtifactPaths;
use crate::errors::RelayError;
use std::path::{Path, PathBuf};

pub mod proof;
pub mod zokrates;

pub use proof::{BatchOutputs, Proof};
pub use zokrates::ZokratesCli;

/// Compiled program and its ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    pub program: PathBuf,
    pub abi: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub proving_key: PathBuf,
    pub verification_key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub path: PathBuf,
}

/// Solidity verifier exported from a verification key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierContract {
    pub path: PathBuf,
}

fn require(path: &Path) -> Result<PathBuf, RelayError> {
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(RelayError::MissingArtifact(path.to_path_buf()))
    }
}

impl CompiledProgram {
    /// Program of an earlier setup, if its files are still there.
    pub fn existing(paths: &ArtifactPaths) -> Result<Self, RelayError> {
        Ok(Self {
            program: require(&paths.program)?,
            abi: require(&paths.abi)?,
        })
    }
}

impl KeyPair {
    pub fn existing(paths: &ArtifactPaths) -> Result<Self, RelayError> {
        Ok(Self {
            proving_key: require(&paths.proving_key)?,
            verification_key: require(&paths.verification_key)?,
        })
    }
}

pub trait ProvingBackend {
    /// Compiles `paths.code_file` into the program and ABI files.
    fn compile(&self, paths: &ArtifactPaths) -> Result<CompiledProgram, RelayError>;

    /// Generates the proving and verification keys of a compiled program.
    fn setup(
        &self,
        program: &CompiledProgram,
        paths: &ArtifactPaths,
    ) -> Result<KeyPair, RelayError>;

    /// Runs the program on decimal encoded witness arguments.
    fn compute_witness(
        &self,
        program: &CompiledProgram,
        args: &[String],
        paths: &ArtifactPaths,
    ) -> Result<Witness, RelayError>;

    fn prove(
        &self,
        program: &CompiledProgram,
        keys: &KeyPair,
        witness: &Witness,
        paths: &ArtifactPaths,
    ) -> Result<Proof, RelayError>;

    fn export_verifier(
        &self,
        keys: &KeyPair,
        paths: &ArtifactPaths,
    ) -> Result<VerifierContract, RelayError>;
}

impl<T: ProvingBackend + ?Sized> ProvingBackend for &T {
    fn compile(&self, paths: &ArtifactPaths) -> Result<CompiledProgram, RelayError> {
        (**self).compile(paths)
    }

    fn setup(
        &self,
        program: &CompiledProgram,
        paths: &ArtifactPaths,
    ) -> Result<KeyPair, RelayError> {
        (**self).setup(program, paths)
    }

    fn compute_witness(
        &self,
        program: &CompiledProgram,
        args: &[String],
        paths: &ArtifactPaths,
    ) -> Result<Witness, RelayError> {
        (**self).compute_witness(program, args, paths)
    }

    fn prove(
        &self,
        program: &CompiledProgram,
        keys: &KeyPair,
        witness: &Witness,
        paths: &ArtifactPaths,
    ) -> Result<Proof, RelayError> {
        (**self).prove(program, keys, witness, paths)
    }

    fn export_verifier(
        &self,
        keys: &KeyPair,
        paths: &ArtifactPaths,
    ) -> Result<VerifierContract, RelayError> {
        (**self).export_verifier(keys, paths)
    }
}
