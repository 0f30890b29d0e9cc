//! # Proof Files
//!
//! Parsing of the `proof.json` written by `zokrates generate-proof`.

use crate::errors::RelayError;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Group elements of a proof, as hex strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProofPoints {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proof {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
    pub proof: ProofPoints,
    /// Public inputs followed by the program outputs.
    pub inputs: Vec<String>,
}

/// Values returned by the batch program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutputs {
    /// Hash of the last header in the batch, display order.
    pub final_block_hash: BigUint,
    /// Target the next epoch has to satisfy.
    pub updated_target: BigUint,
}

impl BatchOutputs {
    pub fn final_block_hash_hex(&self) -> String {
        format!("{:064x}", self.final_block_hash)
    }
}

impl Proof {
    pub fn from_json(json: &str) -> Result<Self, RelayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, RelayError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Proof points in the order a verifier contract takes them:
    /// `a`, then `b` row by row, then `c`.
    pub fn flatten(&self) -> Vec<String> {
        let ProofPoints { a, b, c } = &self.proof;
        a.iter()
            .chain(b.iter().flatten())
            .chain(c.iter())
            .cloned()
            .collect()
    }

    /// The two program outputs, read from the tail of `inputs`.
    pub fn outputs(&self) -> Result<BatchOutputs, RelayError> {
        match self.inputs.as_slice() {
            [.., final_block_hash, updated_target] => Ok(BatchOutputs {
                final_block_hash: parse_field_element(final_block_hash)?,
                updated_target: parse_field_element(updated_target)?,
            }),
            _ => Err(RelayError::MalformedProof(format!(
                "Expected at least 2 inputs, got {}",
                self.inputs.len()
            ))),
        }
    }
}

/// Parses `0x` prefixed hex or decimal field elements.
fn parse_field_element(value: &str) -> Result<BigUint, RelayError> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(value.as_bytes(), 10),
    };
    parsed.ok_or_else(|| RelayError::MalformedProof(format!("Invalid field element: {value}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PROOF_JSON: &str = r#"{
      "scheme": "g16",
      "curve": "bn128",
      "proof": {
        "a": ["0x01", "0x02"],
        "b": [["0x03", "0x04"], ["0x05", "0x06"]],
        "c": ["0x07", "0x08"]
      },
      "inputs": [
        "0x0000000000000000000000000000000021738a2d8b7b435fea071017acc0cd5c",
        "0x000000000000000000015d97e4f3e544f5285016a6d027985f85ea4cab47e54c",
        "0x000000000000000000000000000000000000000000000000000000000000000a",
        "0x00000000000000000000000000000000000000000000000000000000000000ff"
      ]
    }"#;

    #[test]
    fn parse_proof() {
        let proof = Proof::from_json(PROOF_JSON).unwrap();

        assert_eq!(proof.scheme.as_deref(), Some("g16"));
        assert_eq!(proof.inputs.len(), 4);
        assert_eq!(
            proof.flatten(),
            vec!["0x01", "0x02", "0x03", "0x04", "0x05", "0x06", "0x07", "0x08"]
        );
    }

    #[test]
    fn parse_proof_without_scheme() {
        let json = r#"{
          "proof": {"a": ["0x1", "0x2"], "b": [["0x3", "0x4"], ["0x5", "0x6"]], "c": ["0x7", "0x8"]},
          "inputs": ["12", "34"]
        }"#;
        let proof = Proof::from_json(json).unwrap();

        assert_eq!(proof.scheme, None);
        let outputs = proof.outputs().unwrap();
        assert_eq!(outputs.final_block_hash, BigUint::from(12u32));
        assert_eq!(outputs.updated_target, BigUint::from(34u32));
    }

    #[test]
    fn proof_outputs() {
        let outputs = Proof::from_json(PROOF_JSON).unwrap().outputs().unwrap();

        assert_eq!(outputs.updated_target, BigUint::from(255u32));
        assert_eq!(outputs.final_block_hash, BigUint::from(10u32));
        assert_eq!(
            outputs.final_block_hash_hex(),
            "000000000000000000000000000000000000000000000000000000000000000a"
        );
    }

    #[test]
    fn malformed_proofs() {
        let mut proof = Proof::from_json(PROOF_JSON).unwrap();
        proof.inputs.truncate(1);
        assert!(matches!(proof.outputs(), Err(RelayError::MalformedProof(_))));

        proof.inputs = vec!["0x01".to_string(), "0xzz".to_string()];
        assert!(matches!(proof.outputs(), Err(RelayError::MalformedProof(_))));

        assert!(matches!(
            Proof::from_json(r#"{"inputs": []}"#),
            Err(RelayError::Json(_))
        ));
    }
}
