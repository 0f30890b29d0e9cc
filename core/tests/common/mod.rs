//! # Common utilities for tests

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use zk_relay_core::backend::{
    CompiledProgram, KeyPair, Proof, ProvingBackend, VerifierContract, Witness,
};
use zk_relay_core::config::ArtifactPaths;
use zk_relay_core::{HeaderSource, RelayConfig, RelayError};

pub const GENESIS: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";
pub const BLOCK_1: &str = "010000006fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000982051fd1e4ba744bbbe680e1fee14677ba1a3c3540bf7b1cdb606e857233e0e61bc6649ffff001d01e36299";
pub const BLOCK_2: &str = "010000004860eb18bf1b1620e37e9490fc8a427514416fd75159ab86688e9a8300000000d5fdcc541e25de1c7a5addedf24858b8bb665c9f36ef744ee42c316022c90f9bb0bc6649ffff001d08d2bd61";

pub const PROOF_JSON: &str = r#"{
  "scheme": "g16",
  "curve": "bn128",
  "proof": {
    "a": ["0x01", "0x02"],
    "b": [["0x03", "0x04"], ["0x05", "0x06"]],
    "c": ["0x07", "0x08"]
  },
  "inputs": [
    "0x00000000000000000000000000000000000000000000000000000000000000aa",
    "0x00000000000000000000000000000000ffff0000000000000000000000000000"
  ]
}"#;

/// Headers kept in memory, counting every lookup.
#[derive(Debug, Default)]
pub struct MemoryHeaderSource {
    headers: HashMap<u64, String>,
    lookups: Cell<usize>,
}

impl MemoryHeaderSource {
    pub fn with_headers(headers: &[(u64, &str)]) -> Self {
        Self {
            headers: headers
                .iter()
                .map(|(height, raw)| (*height, raw.to_string()))
                .collect(),
            lookups: Cell::new(0),
        }
    }

    /// Genesis, block 1 and block 2 at their real heights.
    pub fn first_blocks() -> Self {
        Self::with_headers(&[(0, GENESIS), (1, BLOCK_1), (2, BLOCK_2)])
    }

    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl HeaderSource for MemoryHeaderSource {
    fn header_at_height(&self, height: u64) -> Result<String, RelayError> {
        self.lookups.set(self.lookups.get() + 1);
        self.headers
            .get(&height)
            .cloned()
            .ok_or_else(|| RelayError::HeaderSource(format!("No header at height {height}")))
    }
}

/// Records every call and writes placeholder artifacts where ZoKrates would
/// write real ones.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: RefCell<Vec<String>>,
    pub witness_args: RefCell<Vec<String>>,
}

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

impl RecordingBackend {
    fn record(&self, call: &str, paths: &ArtifactPaths) {
        self.calls
            .borrow_mut()
            .push(format!("{call} {}", paths.batch_size));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ProvingBackend for RecordingBackend {
    fn compile(&self, paths: &ArtifactPaths) -> Result<CompiledProgram, RelayError> {
        self.record("compile", paths);
        assert!(paths.code_file.exists(), "program was not written");
        touch(&paths.program);
        touch(&paths.abi);

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
        self.record("setup", paths);
        assert_eq!(program.program, paths.program);
        touch(&paths.proving_key);
        touch(&paths.verification_key);

        Ok(KeyPair {
            proving_key: paths.proving_key.clone(),
            verification_key: paths.verification_key.clone(),
        })
    }

    fn compute_witness(
        &self,
        _program: &CompiledProgram,
        args: &[String],
        paths: &ArtifactPaths,
    ) -> Result<Witness, RelayError> {
        self.record("compute_witness", paths);
        *self.witness_args.borrow_mut() = args.to_vec();
        touch(&paths.witness);

        Ok(Witness {
            path: paths.witness.clone(),
        })
    }

    fn prove(
        &self,
        _program: &CompiledProgram,
        keys: &KeyPair,
        witness: &Witness,
        paths: &ArtifactPaths,
    ) -> Result<Proof, RelayError> {
        self.record("prove", paths);
        assert!(keys.proving_key.exists());
        assert!(witness.path.exists());
        std::fs::write(&paths.proof, PROOF_JSON)?;

        Proof::from_file(&paths.proof)
    }

    fn export_verifier(
        &self,
        _keys: &KeyPair,
        paths: &ArtifactPaths,
    ) -> Result<VerifierContract, RelayError> {
        self.record("export_verifier", paths);
        touch(&paths.contract_file);

        Ok(VerifierContract {
            path: paths.contract_file.clone(),
        })
    }
}

/// Configuration with every artifact under `root`.
pub fn config_under(root: &Path) -> RelayConfig {
    RelayConfig::try_parse_from(format!(
        r#"
        [zokrates]
        bin_path = "zokrates"
        stdlib_path = "stdlib"

        [context]
        proving_scheme = "g16"
        root_dir = "{}"
        "#,
        root.display()
    ))
    .unwrap()
}
