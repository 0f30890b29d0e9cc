//! # Relay
//!
//! Ties a [`HeaderSource`] and a [`ProvingBackend`] together. The relay
//! fetches header batches, encodes them into witness arguments for the
//! program of their batch size, drives the backend through setup and proving
//! and rejects epoch transitions with invalid difficulty retargets.
//!
//! Setup and proving are independent stages. Setup for a batch size writes
//! the program, keys and verifier contract once; proving reuses them for
//! every batch of that size and fails with [`RelayError::MissingArtifact`]
//! when setup never ran.

use crate::backend::{
    CompiledProgram, KeyPair, Proof, ProvingBackend, VerifierContract,
};
use crate::config::RelayConfig;
use crate::errors::RelayError;
use crate::header_source::HeaderSource;
use relay_circuits::common::constants::BLOCKS_PER_EPOCH;
use relay_circuits::{
    encode, generate, BlockHeader, RangeError, RetargetValidator, RetargetVerdict, WitnessVector,
};
use std::path::PathBuf;

/// Headers of one batch and the head of the epoch the batch starts in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBatch {
    pub epoch_head: BlockHeader,
    pub headers: Vec<BlockHeader>,
}

impl HeaderBatch {
    pub fn encode(&self) -> Result<WitnessVector, RelayError> {
        Ok(encode(&self.epoch_head, &self.headers)?)
    }
}

/// Height of the first block of the epoch `height` belongs to.
pub fn epoch_head_height(height: u64) -> u64 {
    height / BLOCKS_PER_EPOCH * BLOCKS_PER_EPOCH
}

/// Checks that every header commits to the hash of the one before it.
pub fn check_linkage(headers: &[BlockHeader]) -> Result<(), RelayError> {
    for (index, pair) in headers.windows(2).enumerate() {
        let [prev, header] = pair else { continue };

        if !header.links_to(prev) {
            return Err(RelayError::BrokenLinkage {
                index: index + 1,
                expected: prev.block_hash_hex(),
                actual: header.prev_hash_hex(),
            });
        }
    }

    Ok(())
}

/// Runs `validator` over an epoch transition and turns an invalid verdict
/// into [`RelayError::ConsensusViolation`].
pub fn validate_retarget(
    validator: &RetargetValidator,
    epoch_head: &BlockHeader,
    epoch_tail: &BlockHeader,
    next_epoch_head: &BlockHeader,
) -> Result<RetargetVerdict, RelayError> {
    let verdict = validator.validate_epoch(epoch_head, epoch_tail, next_epoch_head);
    if verdict.valid {
        return Ok(verdict);
    }

    tracing::warn!(
        head_bits = %format!("{:08x}", epoch_head.bits),
        claimed_bits = %format!("{:08x}", next_epoch_head.bits),
        expected_bits = %format!("{:08x}", verdict.expected_bits),
        "Next epoch head violates the retarget rule"
    );
    Err(RelayError::ConsensusViolation {
        head_bits: epoch_head.bits,
        claimed_bits: next_epoch_head.bits,
        expected_bits: verdict.expected_bits,
    })
}

#[derive(Debug, Clone)]
pub struct Relay<S, B> {
    source: S,
    backend: B,
    config: RelayConfig,
    validator: RetargetValidator,
}

impl<S, B> Relay<S, B> {
    pub fn new(source: S, backend: B, config: RelayConfig) -> Self {
        let validator = RetargetValidator::new(config.retarget.rule);

        Self {
            source,
            backend,
            config,
            validator,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn validator(&self) -> &RetargetValidator {
        &self.validator
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<S: HeaderSource, B> Relay<S, B> {
    pub fn fetch_header(&self, height: u64) -> Result<BlockHeader, RelayError> {
        let raw = self.source.header_at_height(height)?;
        Ok(BlockHeader::from_raw_hex(&raw)?.with_height(height))
    }

    /// Fetches headers `start..=end` and the head of the epoch `start`
    /// belongs to. Heights are checked before anything is fetched.
    pub fn fetch_batch(&self, start: u64, end: u64) -> Result<HeaderBatch, RelayError> {
        if end <= start {
            return Err(RangeError::InvertedHeights { start, end }.into());
        }

        let epoch_head = self.fetch_header(epoch_head_height(start))?;
        let headers = (start..=end)
            .map(|height| self.fetch_header(height))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            start,
            end,
            epoch_head = epoch_head_height(start),
            "Fetched header batch"
        );
        Ok(HeaderBatch {
            epoch_head,
            headers,
        })
    }

    /// Witness arguments for the batch `start..=end`. Linkage is not
    /// checked here.
    pub fn build_input(&self, start: u64, end: u64) -> Result<WitnessVector, RelayError> {
        self.fetch_batch(start, end)?.encode()
    }

    /// Validates the transition from epoch `epoch` to the next one.
    pub fn validate_epoch_transition(&self, epoch: u64) -> Result<RetargetVerdict, RelayError> {
        let head_height = epoch * BLOCKS_PER_EPOCH;
        let epoch_head = self.fetch_header(head_height)?;
        let epoch_tail = self.fetch_header(head_height + BLOCKS_PER_EPOCH - 1)?;
        let next_epoch_head = self.fetch_header(head_height + BLOCKS_PER_EPOCH)?;

        self.validate_retarget(&epoch_head, &epoch_tail, &next_epoch_head)
    }
}

impl<S, B> Relay<S, B> {
    /// Same as the free [`validate_retarget`], with the configured rule.
    pub fn validate_retarget(
        &self,
        epoch_head: &BlockHeader,
        epoch_tail: &BlockHeader,
        next_epoch_head: &BlockHeader,
    ) -> Result<RetargetVerdict, RelayError> {
        validate_retarget(&self.validator, epoch_head, epoch_tail, next_epoch_head)
    }
}

impl<S, B: ProvingBackend> Relay<S, B> {
    /// Writes the program for `batch_size` headers to its code file.
    pub fn write_program(&self, batch_size: usize) -> Result<PathBuf, RelayError> {
        let paths = self.config.for_batch(batch_size)?;
        let program = generate(batch_size)?;

        if let Some(parent) = paths.code_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&paths.code_file, program.as_str())?;

        tracing::debug!("Wrote program to {:?}", paths.code_file);
        Ok(paths.code_file)
    }

    /// Writes, compiles and sets up the program for `batch_size` headers,
    /// then exports its verifier contract.
    pub fn setup_and_export_verifier(
        &self,
        batch_size: usize,
    ) -> Result<VerifierContract, RelayError> {
        let paths = self.config.for_batch(batch_size)?;
        self.write_program(batch_size)?;

        tracing::info!(batch_size, "Compiling program");
        let program = self.backend.compile(&paths)?;
        tracing::info!(batch_size, "Running setup");
        let keys = self.backend.setup(&program, &paths)?;
        let contract = self.backend.export_verifier(&keys, &paths)?;

        tracing::info!(batch_size, "Exported verifier to {:?}", contract.path);
        Ok(contract)
    }
}

impl<S: HeaderSource, B: ProvingBackend> Relay<S, B> {
    /// Proves the batch `start..=end` with the artifacts of an earlier
    /// [`Self::setup_and_export_verifier`] for the same batch size.
    pub fn build_input_and_prove(&self, start: u64, end: u64) -> Result<Proof, RelayError> {
        let batch = self.fetch_batch(start, end)?;
        check_linkage(&batch.headers)?;
        let witness = batch.encode()?;

        let paths = self.config.for_batch(witness.layout().batch_size())?;
        let program = CompiledProgram::existing(&paths)?;
        let keys = KeyPair::existing(&paths)?;

        tracing::info!(start, end, "Computing witness");
        let witness = self
            .backend
            .compute_witness(&program, &witness.to_args(), &paths)?;
        tracing::info!(start, end, "Generating proof");
        self.backend.prove(&program, &keys, &witness, &paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";
    const BLOCK_1: &str = "010000006fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000982051fd1e4ba744bbbe680e1fee14677ba1a3c3540bf7b1cdb606e857233e0e61bc6649ffff001d01e36299";
    const BLOCK_2: &str = "010000004860eb18bf1b1620e37e9490fc8a427514416fd75159ab86688e9a8300000000d5fdcc541e25de1c7a5addedf24858b8bb665c9f36ef744ee42c316022c90f9bb0bc6649ffff001d08d2bd61";

    fn header(raw: &str) -> BlockHeader {
        BlockHeader::from_raw_hex(raw).unwrap()
    }

    #[test]
    fn epoch_heads() {
        assert_eq!(epoch_head_height(0), 0);
        assert_eq!(epoch_head_height(2015), 0);
        assert_eq!(epoch_head_height(2016), 2016);
        assert_eq!(epoch_head_height(645_121), 645_120);
    }

    #[test]
    fn linked_headers() {
        check_linkage(&[header(GENESIS), header(BLOCK_1), header(BLOCK_2)]).unwrap();
        check_linkage(&[header(BLOCK_1)]).unwrap();
        check_linkage(&[]).unwrap();
    }

    #[test]
    fn broken_linkage() {
        let genesis = header(GENESIS);

        match check_linkage(&[genesis, header(BLOCK_2)]) {
            Err(RelayError::BrokenLinkage {
                index,
                expected,
                actual,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(expected, genesis.block_hash_hex());
                assert_eq!(
                    actual,
                    "00000000839a8e6886ab5951d76f411475428afc90947ee320161bbf18eb6048"
                );
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn retarget_violation() {
        // Genesis bits carried into block 2 are not what a retarget over
        // genesis..block 1 produces.
        let validator = RetargetValidator::default();

        match validate_retarget(&validator, &header(GENESIS), &header(BLOCK_1), &header(BLOCK_2)) {
            Err(RelayError::ConsensusViolation {
                head_bits,
                claimed_bits,
                expected_bits,
            }) => {
                assert_eq!(head_bits, 0x1d00ffff);
                assert_eq!(claimed_bits, 0x1d00ffff);
                assert_eq!(expected_bits, 0x1c620593);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
