/// Size of a serialized block header in bytes.
pub const HEADER_SIZE: usize = 80;

/// Size of a serialized block header as a hex string.
pub const HEADER_HEX_LEN: usize = HEADER_SIZE * 2;

/// Width of one circuit input word used by `BlockHeader::word_at`.
pub const HEADER_WORD_SIZE: usize = 16;

/// Number of blocks between two difficulty retargets.
pub const BLOCKS_PER_EPOCH: u64 = 2016;

/// Expected block interval in seconds.
pub const TARGET_BLOCK_SPACING: u32 = 600;

/// Expected duration of an epoch in seconds (2016 * 600).
pub const TARGET_TIME_DELTA: u32 = BLOCKS_PER_EPOCH as u32 * TARGET_BLOCK_SPACING;

/// Compact encoding of the mainnet proof-of-work limit.
pub const MAX_TARGET_BITS: u32 = 0x1d00ffff;

/// Bit size of the BN254 scalar field the proving backend works over.
/// Fixed-width loops inside the circuit are bounded by this value.
pub const FIELD_BITS: u64 = 254;
