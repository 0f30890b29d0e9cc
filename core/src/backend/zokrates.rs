//! # ZoKrates Command Line Backend
//!
//! Runs the `zokrates` binary once per operation. Output is captured and any
//! non zero exit status is turned into [`RelayError::Backend`].

use super::{CompiledProgram, KeyPair, Proof, ProvingBackend, VerifierContract, Witness};
use crate::config::{ArtifactPaths, ProvingScheme, RelayConfig};
use crate::errors::RelayError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Curve the verifier contract is exported for.
pub const DEFAULT_CURVE: &str = "bn128";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZokratesCli {
    bin_path: PathBuf,
    stdlib_path: PathBuf,
    scheme: ProvingScheme,
    curve: String,
}

fn create_parent_dir(path: &Path) -> Result<(), RelayError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(())
}

impl ZokratesCli {
    pub fn new(bin_path: PathBuf, stdlib_path: PathBuf, scheme: ProvingScheme) -> Self {
        Self {
            bin_path,
            stdlib_path,
            scheme,
            curve: DEFAULT_CURVE.to_string(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            config.zokrates.bin_path.clone(),
            config.zokrates.stdlib_path.clone(),
            config.context.proving_scheme,
        )
    }

    pub fn with_curve(mut self, curve: impl Into<String>) -> Self {
        self.curve = curve.into();
        self
    }

    pub fn scheme(&self) -> ProvingScheme {
        self.scheme
    }

    fn compile_args(&self, paths: &ArtifactPaths) -> Vec<OsString> {
        vec![
            "compile".into(),
            "-i".into(),
            paths.code_file.clone().into(),
            "-o".into(),
            paths.program.clone().into(),
            "-s".into(),
            paths.abi.clone().into(),
            "--stdlib-path".into(),
            self.stdlib_path.clone().into(),
        ]
    }

    fn setup_args(&self, program: &CompiledProgram, paths: &ArtifactPaths) -> Vec<OsString> {
        vec![
            "setup".into(),
            "-i".into(),
            program.program.clone().into(),
            "-p".into(),
            paths.proving_key.clone().into(),
            "-v".into(),
            paths.verification_key.clone().into(),
            "-s".into(),
            self.scheme.as_str().into(),
        ]
    }

    fn compute_witness_args(
        &self,
        program: &CompiledProgram,
        args: &[String],
        paths: &ArtifactPaths,
    ) -> Vec<OsString> {
        let mut cmd: Vec<OsString> = vec![
            "compute-witness".into(),
            "-i".into(),
            program.program.clone().into(),
            "-o".into(),
            paths.witness.clone().into(),
            "-a".into(),
        ];
        cmd.extend(args.iter().map(OsString::from));
        cmd
    }

    fn prove_args(
        &self,
        program: &CompiledProgram,
        keys: &KeyPair,
        witness: &Witness,
        paths: &ArtifactPaths,
    ) -> Vec<OsString> {
        vec![
            "generate-proof".into(),
            "-i".into(),
            program.program.clone().into(),
            "-p".into(),
            keys.proving_key.clone().into(),
            "-w".into(),
            witness.path.clone().into(),
            "-s".into(),
            self.scheme.as_str().into(),
            "-j".into(),
            paths.proof.clone().into(),
        ]
    }

    fn export_verifier_args(&self, keys: &KeyPair, paths: &ArtifactPaths) -> Vec<OsString> {
        vec![
            "export-verifier".into(),
            "-i".into(),
            keys.verification_key.clone().into(),
            "-s".into(),
            self.scheme.as_str().into(),
            "-c".into(),
            self.curve.clone().into(),
            "-o".into(),
            paths.contract_file.clone().into(),
        ]
    }

    /// Runs the binary and returns its stdout.
    fn run(&self, args: Vec<OsString>) -> Result<String, RelayError> {
        let command = format!(
            "{} {}",
            self.bin_path.display(),
            args.first()
                .map(|op| op.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        tracing::debug!("Running {command}");

        let output = Command::new(&self.bin_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| RelayError::BackendSpawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(RelayError::Backend {
                command,
                status: output.status.to_string(),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::trace!("{command} finished: {stdout}");
        Ok(stdout)
    }
}

impl ProvingBackend for ZokratesCli {
    fn compile(&self, paths: &ArtifactPaths) -> Result<CompiledProgram, RelayError> {
        create_parent_dir(&paths.program)?;
        create_parent_dir(&paths.abi)?;
        self.run(self.compile_args(paths))?;

        Ok(CompiledProgram {
            program: paths.program.clone(),
            abi: paths.abi.clone(),
        })
    }

    fn setup(
        &self,
        program: &CompiledProgram,
        paths: &ArtifactPaths,
    ) -> Result<KeyPair, RelayError> {
        create_parent_dir(&paths.proving_key)?;
        create_parent_dir(&paths.verification_key)?;
        self.run(self.setup_args(program, paths))?;

        Ok(KeyPair {
            proving_key: paths.proving_key.clone(),
            verification_key: paths.verification_key.clone(),
        })
    }

    fn compute_witness(
        &self,
        program: &CompiledProgram,
        args: &[String],
        paths: &ArtifactPaths,
    ) -> Result<Witness, RelayError> {
        create_parent_dir(&paths.witness)?;
        self.run(self.compute_witness_args(program, args, paths))?;

        Ok(Witness {
            path: paths.witness.clone(),
        })
    }

    fn prove(
        &self,
        program: &CompiledProgram,
        keys: &KeyPair,
        witness: &Witness,
        paths: &ArtifactPaths,
    ) -> Result<Proof, RelayError> {
        create_parent_dir(&paths.proof)?;
        self.run(self.prove_args(program, keys, witness, paths))?;

        Proof::from_file(&paths.proof)
    }

    fn export_verifier(
        &self,
        keys: &KeyPair,
        paths: &ArtifactPaths,
    ) -> Result<VerifierContract, RelayError> {
        create_parent_dir(&paths.contract_file)?;
        self.run(self.export_verifier_args(keys, paths))?;

        Ok(VerifierContract {
            path: paths.contract_file.clone(),
        })
    }
}
