//! # Configuration Options
//!
//! This module defines configuration options.
//!
//! This module is base for `cli` module and not dependent on it. Therefore,
//! this module can be used independently.
//!
//! ## Configuration File
//!
//! Configuration options can be read from a TOML file. File contents are
//! described in `RelayConfig` struct. Artifact locations for one batch size
//! are derived from it with [`RelayConfig::for_batch`].

use crate::errors::RelayError;
use relay_circuits::{batch::program::program_file_name, BatchLayout, RetargetRule};
use secrecy::SecretString;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::{fs::File, io::Read, path::PathBuf};

pub mod env;

/// Configuration options for the relay binaries and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub zokrates: ZokratesConfig,
    pub context: ContextConfig,
    #[serde(default)]
    pub retarget: RetargetConfig,
    /// Bitcoin Core connection, only needed when headers are fetched over RPC.
    #[serde(default)]
    pub rpc: Option<RpcConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ZokratesConfig {
    /// Path of the ZoKrates binary.
    pub bin_path: PathBuf,
    /// Path of the ZoKrates standard library.
    pub stdlib_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContextConfig {
    pub proving_scheme: ProvingScheme,
    /// Every other directory is relative to this one.
    pub root_dir: PathBuf,
    #[serde(default)]
    pub code: CodeConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub contract: ContractConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CodeConfig {
    pub code_dir: PathBuf,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            code_dir: PathBuf::from("code"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataConfig {
    /// Parent of the per batch `batch{n}` directories.
    pub data_dir: PathBuf,
    pub program_file_name: String,
    pub abi_file_name: String,
    pub vkey_file_name: String,
    pub pkey_file_name: String,
    pub witness_file_name: String,
    pub proof_file_name: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            program_file_name: "zok".to_string(),
            abi_file_name: "abi.json".to_string(),
            vkey_file_name: "verification.key".to_string(),
            pkey_file_name: "proving.key".to_string(),
            witness_file_name: "witness".to_string(),
            proof_file_name: "proof.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContractConfig {
    pub contract_dir: PathBuf,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            contract_dir: PathBuf::from("contract"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct RetargetConfig {
    #[serde(default)]
    pub rule: RetargetRule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Bitcoin remote procedure call URL.
    pub url: String,
    /// Bitcoin RPC user.
    pub user: SecretString,
    /// Bitcoin RPC user password.
    pub password: SecretString,
}

/// Proving schemes supported by the ZoKrates backend.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProvingScheme {
    #[default]
    G16,
    Pghr13,
    Gm17,
    Marlin,
}

impl ProvingScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvingScheme::G16 => "g16",
            ProvingScheme::Pghr13 => "pghr13",
            ProvingScheme::Gm17 => "gm17",
            ProvingScheme::Marlin => "marlin",
        }
    }
}

impl fmt::Display for ProvingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProvingScheme {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g16" => Ok(ProvingScheme::G16),
            "pghr13" => Ok(ProvingScheme::Pghr13),
            "gm17" => Ok(ProvingScheme::Gm17),
            "marlin" => Ok(ProvingScheme::Marlin),
            other => Err(RelayError::ConfigError(format!(
                "Unknown proving scheme: {other}"
            ))),
        }
    }
}

/// File locations of every artifact belonging to one batch size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub batch_size: usize,
    pub code_file: PathBuf,
    pub data_dir: PathBuf,
    pub program: PathBuf,
    pub abi: PathBuf,
    pub verification_key: PathBuf,
    pub proving_key: PathBuf,
    pub witness: PathBuf,
    pub proof: PathBuf,
    pub contract_file: PathBuf,
}

impl RelayConfig {
    /// Read contents of a TOML file and generate a `RelayConfig`.
    pub fn try_parse_file(path: PathBuf) -> Result<Self, RelayError> {
        let mut contents = String::new();

        let mut file = match File::open(path.clone()) {
            Ok(f) => f,
            Err(e) => return Err(RelayError::ConfigError(e.to_string())),
        };

        if let Err(e) = file.read_to_string(&mut contents) {
            return Err(RelayError::ConfigError(e.to_string()));
        }

        tracing::trace!("Using configuration file: {:?}", path);

        RelayConfig::try_parse_from(contents)
    }

    /// Try to parse a `RelayConfig` from given TOML formatted string and
    /// generate a `RelayConfig`.
    pub fn try_parse_from(input: String) -> Result<Self, RelayError> {
        match toml::from_str::<RelayConfig>(&input) {
            Ok(c) => Ok(c),
            Err(e) => Err(RelayError::ConfigError(e.to_string())),
        }
    }

    /// Artifact locations for a batch of `batch_size` headers:
    ///
    /// - `{root}/{code_dir}/validate_batch{n}.zok`
    /// - `{root}/{data_dir}/batch{n}/` holding program, keys, witness and proof
    /// - `{root}/{contract_dir}/verifier{n}.sol`
    pub fn for_batch(&self, batch_size: usize) -> Result<ArtifactPaths, RelayError> {
        BatchLayout::new(batch_size)?;

        let context = &self.context;
        let data_dir = context
            .root_dir
            .join(&context.data.data_dir)
            .join(format!("batch{batch_size}"));

        Ok(ArtifactPaths {
            batch_size,
            code_file: context
                .root_dir
                .join(&context.code.code_dir)
                .join(program_file_name(batch_size)),
            program: data_dir.join(&context.data.program_file_name),
            abi: data_dir.join(&context.data.abi_file_name),
            verification_key: data_dir.join(&context.data.vkey_file_name),
            proving_key: data_dir.join(&context.data.pkey_file_name),
            witness: data_dir.join(&context.data.witness_file_name),
            proof: data_dir.join(&context.data.proof_file_name),
            contract_file: context
                .root_dir
                .join(&context.contract.contract_dir)
                .join(format!("verifier{batch_size}.sol")),
            data_dir,
        })
    }
}
