//! # Header Codec
//! Parsing and serialization of 80-byte Bitcoin block headers.
//!
//! A [`BlockHeader`] always stores its hashes in wire order, exactly as they
//! appear in the serialized header. Display order values (the ones printed by
//! block explorers and returned by Bitcoin Core RPC) are produced on demand
//! through [`crate::common::endian`].

use bitcoin::{
    block::{Header, Version},
    hashes::Hash,
    BlockHash, CompactTarget, TxMerkleNode,
};
use serde::{Deserialize, Serialize};

use crate::common::{
    constants::{HEADER_SIZE, HEADER_WORD_SIZE},
    endian::{hash_to_wire_bytes, strip_hex_prefix, to_display_hex},
    errors::{FormatError, RangeError},
    hashes::calculate_double_sha256,
};

pub mod retarget;

/// Number of [`HEADER_WORD_SIZE`] byte words in a serialized header.
pub const HEADER_WORD_COUNT: usize = HEADER_SIZE / HEADER_WORD_SIZE;

/// A Bitcoin block header.
///
/// ## Fields
///
/// * `version` - Block version
/// * `prev_block_hash` - Hash of the previous block, wire order
/// * `merkle_root` - Merkle root of the block transactions, wire order
/// * `time` - Block timestamp as Unix time
/// * `bits` - Compact representation of the difficulty target
/// * `nonce` - Proof-of-work nonce
/// * `height` - Optional metadata, not part of the serialized header
///
/// Two headers are equal when their serialized forms are equal; `height` is
/// ignored.
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

impl PartialEq for BlockHeader {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

impl Eq for BlockHeader {}

impl BlockHeader {
    /// Parses a serialized header. Fails unless `bytes` is exactly 80 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let bytes: &[u8; HEADER_SIZE] =
            bytes.try_into().map_err(|_| FormatError::LengthMismatch {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            })?;

        let mut prev_block_hash = [0u8; 32];
        prev_block_hash.copy_from_slice(&bytes[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&bytes[36..68]);

        Ok(BlockHeader {
            version: i32::from_le_bytes(read_4(bytes, 0)),
            prev_block_hash,
            merkle_root,
            time: u32::from_le_bytes(read_4(bytes, 68)),
            bits: u32::from_le_bytes(read_4(bytes, 72)),
            nonce: u32::from_le_bytes(read_4(bytes, 76)),
            height: None,
        })
    }

    /// Parses a 160 character hex header, with or without a `0x` prefix.
    pub fn from_raw_hex(raw: &str) -> Result<Self, FormatError> {
        let bytes = hex::decode(strip_hex_prefix(raw))?;
        Self::from_bytes(&bytes)
    }

    /// Serializes the header in wire order.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.version.to_le_bytes());
        bytes[4..36].copy_from_slice(&self.prev_block_hash);
        bytes[36..68].copy_from_slice(&self.merkle_root);
        bytes[68..72].copy_from_slice(&self.time.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.bits.to_le_bytes());
        bytes[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    /// Lowercase hex of the serialized header.
    pub fn raw_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    /// Double SHA256 of the serialized header, wire order. This is the value
    /// the next header carries as its `prev_block_hash`.
    pub fn compute_block_hash(&self) -> [u8; 32] {
        calculate_double_sha256(&self.serialize())
    }

    /// Double SHA256 of the serialized header, display order.
    pub fn double_hash(&self) -> [u8; 32] {
        let mut hash = self.compute_block_hash();
        hash.reverse();
        hash
    }

    /// Block hash as display order hex.
    pub fn block_hash_hex(&self) -> String {
        to_display_hex(&self.compute_block_hash())
    }

    /// Previous block hash as display order hex.
    pub fn prev_hash_hex(&self) -> String {
        to_display_hex(&self.prev_block_hash)
    }

    /// Merkle root as display order hex.
    pub fn merkle_root_hex(&self) -> String {
        to_display_hex(&self.merkle_root)
    }

    /// Returns the `index`th 16-byte slice of the serialized header.
    ///
    /// Word 4 holds the tail of the merkle root followed by `time`, `bits` and
    /// `nonce`.
    pub fn word_at(&self, index: usize) -> Result<[u8; HEADER_WORD_SIZE], RangeError> {
        if index >= HEADER_WORD_COUNT {
            return Err(RangeError::WordIndexOutOfRange {
                index,
                count: HEADER_WORD_COUNT,
            });
        }
        let start = index * HEADER_WORD_SIZE;
        let mut word = [0u8; HEADER_WORD_SIZE];
        word.copy_from_slice(&self.serialize()[start..start + HEADER_WORD_SIZE]);
        Ok(word)
    }

    /// Whether this header's `prev_block_hash` commits to `prev`.
    pub fn links_to(&self, prev: &BlockHeader) -> bool {
        self.prev_block_hash == prev.compute_block_hash()
    }

    pub fn with_height(mut self, height: u64) -> Self {
        self.height = Some(height);
        self
    }

    /// Builds a header from the verbose `getblockheader` JSON shape.
    pub fn from_info(info: &HeaderInfo) -> Result<Self, FormatError> {
        let prev_block_hash = match &info.previous_block_hash {
            Some(hash) => hash_to_wire_bytes(hash)?,
            None => [0u8; 32],
        };

        Ok(BlockHeader {
            version: parse_hex_u32("versionHex", &info.version_hex)? as i32,
            prev_block_hash,
            merkle_root: hash_to_wire_bytes(&info.merkle_root)?,
            time: info.time,
            bits: parse_hex_u32("bits", &info.bits)?,
            nonce: info.nonce,
            height: info.height,
        })
    }

    /// Exports the header in the verbose `getblockheader` JSON shape. The
    /// previous hash is omitted when it is all zeros, as for genesis.
    pub fn to_info(&self) -> HeaderInfo {
        HeaderInfo {
            version_hex: format!("{:08x}", self.version as u32),
            previous_block_hash: (self.prev_block_hash != [0u8; 32])
                .then(|| self.prev_hash_hex()),
            merkle_root: self.merkle_root_hex(),
            time: self.time,
            bits: format!("{:08x}", self.bits),
            nonce: self.nonce,
            height: self.height,
        }
    }
}

/// Header fields as returned by Bitcoin Core's verbose `getblockheader`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HeaderInfo {
    #[serde(rename = "versionHex")]
    pub version_hex: String,
    #[serde(
        rename = "previousblockhash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_block_hash: Option<String>,
    #[serde(rename = "merkleroot")]
    pub merkle_root: String,
    pub time: u32,
    pub bits: String,
    pub nonce: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

impl TryFrom<&HeaderInfo> for BlockHeader {
    type Error = FormatError;

    fn try_from(info: &HeaderInfo) -> Result<Self, Self::Error> {
        BlockHeader::from_info(info)
    }
}

impl From<Header> for BlockHeader {
    fn from(header: Header) -> Self {
        BlockHeader {
            version: header.version.to_consensus(),
            prev_block_hash: header.prev_blockhash.to_byte_array(),
            merkle_root: header.merkle_root.to_byte_array(),
            time: header.time,
            bits: header.bits.to_consensus(),
            nonce: header.nonce,
            height: None,
        }
    }
}

impl From<BlockHeader> for Header {
    fn from(val: BlockHeader) -> Self {
        Header {
            version: Version::from_consensus(val.version),
            prev_blockhash: BlockHash::from_byte_array(val.prev_block_hash),
            merkle_root: TxMerkleNode::from_byte_array(val.merkle_root),
            time: val.time,
            bits: CompactTarget::from_consensus(val.bits),
            nonce: val.nonce,
        }
    }
}

fn read_4(bytes: &[u8; HEADER_SIZE], offset: usize) -> [u8; 4] {
    [
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]
}

fn parse_hex_u32(field: &'static str, value: &str) -> Result<u32, FormatError> {
    u32::from_str_radix(strip_hex_prefix(value), 16).map_err(|_| FormatError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
