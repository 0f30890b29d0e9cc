//! # SHA Padding & Word Splitter
//!
//! The circuit evaluates SHA-256 on pre-padded message blocks, so the host
//! applies the padding rule itself and hands the padded message over as an
//! array of fixed-width big-endian words.

use num_bigint::BigUint;

use super::{endian::strip_hex_prefix, errors::FormatError};

/// Size of one SHA-256 message block in bytes.
pub const SHA256_BLOCK_SIZE: usize = 64;

/// Size of the big-endian bit length suffix in bytes.
const LENGTH_SUFFIX_SIZE: usize = 8;

/// Number of 512-bit blocks a message of `byte_len` bytes occupies after
/// padding: `ceil((bit_len + 65) / 512)`.
pub const fn block_count(byte_len: usize) -> usize {
    (byte_len + 1 + LENGTH_SUFFIX_SIZE).div_ceil(SHA256_BLOCK_SIZE)
}

/// Applies the SHA-256 padding rule: a single `0x80` byte, zero bytes, then
/// the 64-bit big-endian bit length of the original message.
pub fn pad_bytes(message: &[u8]) -> Vec<u8> {
    let padded_len = block_count(message.len()) * SHA256_BLOCK_SIZE;
    let bit_len = (message.len() as u64) * 8;

    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(message);
    padded.push(0x80);
    padded.resize(padded_len - LENGTH_SUFFIX_SIZE, 0);
    padded.extend_from_slice(&bit_len.to_be_bytes());
    padded
}

/// Hex string variant of [`pad_bytes`].
pub fn pad(value: &str) -> Result<String, FormatError> {
    let message = hex::decode(strip_hex_prefix(value))?;
    Ok(hex::encode(pad_bytes(&message)))
}

/// Splits bytes into big-endian unsigned integers of `unit_bytes` each.
pub fn split_bytes(bytes: &[u8], unit_bytes: usize) -> Result<Vec<BigUint>, FormatError> {
    if unit_bytes == 0 {
        return Err(FormatError::ZeroUnitWidth);
    }
    if bytes.len() % unit_bytes != 0 {
        return Err(FormatError::UnalignedLength {
            len: bytes.len() * 2,
            unit: unit_bytes * 2,
        });
    }

    Ok(bytes
        .chunks_exact(unit_bytes)
        .map(BigUint::from_bytes_be)
        .collect())
}

/// Parses a hex string as consecutive big-endian integers of `unit_bytes`
/// each. Fails if the hex length is not a multiple of `unit_bytes * 2`.
pub fn split(value: &str, unit_bytes: usize) -> Result<Vec<BigUint>, FormatError> {
    if unit_bytes == 0 {
        return Err(FormatError::ZeroUnitWidth);
    }
    let value = strip_hex_prefix(value);
    if value.len() % (unit_bytes * 2) != 0 {
        return Err(FormatError::UnalignedLength {
            len: value.len(),
            unit: unit_bytes * 2,
        });
    }

    split_bytes(&hex::decode(value)?, unit_bytes)
}

/// Inverse of [`split`]: renders every word zero-padded to `unit_bytes * 2`
/// hex characters and concatenates them.
pub fn join(words: &[BigUint], unit_bytes: usize) -> String {
    let width = unit_bytes * 2;
    words
        .iter()
        .map(|word| format!("{word:0width$x}"))
        .collect()
}

/// Splits bytes into 32-bit big-endian words.
pub fn to_u32_words(bytes: &[u8]) -> Result<Vec<u32>, FormatError> {
    if bytes.len() % 4 != 0 {
        return Err(FormatError::UnalignedLength {
            len: bytes.len() * 2,
            unit: 8,
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    const GENESIS_HEADER: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";

    #[test]
    fn test_block_count() {
        assert_eq!(block_count(0), 1);
        assert_eq!(block_count(55), 1);
        assert_eq!(block_count(56), 2);
        assert_eq!(block_count(64), 2);
        assert_eq!(block_count(80), 2);
        assert_eq!(block_count(119), 2);
        assert_eq!(block_count(120), 3);
    }

    #[test]
    fn test_pad_header() {
        let padded = pad(GENESIS_HEADER).unwrap();
        assert_eq!(padded.len(), 256);
        assert!(padded.starts_with(GENESIS_HEADER));
        assert_eq!(&padded[160..162], "80");
        assert!(padded[162..252].chars().all(|c| c == '0'));
        // 640 bits
        assert_eq!(&padded[252..], "0280");
    }

    #[test]
    fn test_pad_single_block() {
        let value = "a76dd73790def7b57776f22fa211d19cf43121a709a37eaeda17230eaac258f5";
        let expected = format!("{value}80{}0100", "00".repeat(29));
        assert_eq!(pad(value).unwrap(), expected);
        assert_eq!(pad(&format!("0x{value}")).unwrap(), expected);
    }

    #[test]
    fn test_pad_empty() {
        let expected = format!("80{}", "00".repeat(63));
        assert_eq!(pad("").unwrap(), expected);
    }

    #[test]
    fn test_pad_rejects_malformed_hex() {
        assert!(pad("abc").is_err());
        assert!(pad("0g").is_err());
    }

    #[test]
    fn test_padding_length_properties() {
        let mut rng = SmallRng::seed_from_u64(0x5a5a);
        for len in 0..300 {
            let message: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let padded = pad_bytes(&message);

            let added = padded.len() - message.len();
            assert!((9..=72).contains(&added), "len {len} added {added}");
            assert_eq!((padded.len() * 8) % 512, 0);
            assert_eq!(padded.len() / SHA256_BLOCK_SIZE, block_count(len));
            assert_eq!(&padded[..len], &message[..]);
            assert_eq!(padded[len], 0x80);
            assert_eq!(
                u64::from_be_bytes(padded[padded.len() - 8..].try_into().unwrap()),
                len as u64 * 8
            );
        }
    }

    #[test]
    fn test_split_words() {
        let words = split("0000000100000002ffffffff", 4).unwrap();
        assert_eq!(
            words,
            vec![
                BigUint::from(1u32),
                BigUint::from(2u32),
                BigUint::from(u32::MAX)
            ]
        );

        let chunks = split(GENESIS_HEADER, 16).unwrap();
        assert_eq!(chunks.len(), 5);
        assert_eq!(
            chunks[4],
            BigUint::parse_bytes(b"4b1e5e4a29ab5f49ffff001d1dac2b7c", 16).unwrap()
        );
    }

    #[test]
    fn test_split_rejects_unaligned_input() {
        assert_eq!(
            split("00000001000000", 4),
            Err(FormatError::UnalignedLength { len: 14, unit: 8 })
        );
        assert_eq!(split(GENESIS_HEADER, 0), Err(FormatError::ZeroUnitWidth));
        assert_eq!(
            split(GENESIS_HEADER, 32),
            Err(FormatError::UnalignedLength {
                len: 160,
                unit: 64
            })
        );
        assert!(split("zz", 1).is_err());
    }

    #[test]
    fn test_split_then_join_reproduces_input() {
        let mut rng = SmallRng::seed_from_u64(7);
        for unit in [1usize, 4, 16, 32] {
            for units in 0..12 {
                let bytes: Vec<u8> = (0..unit * units).map(|_| rng.gen()).collect();
                // Leading zero bytes are the interesting case for re-padding.
                let mut bytes = bytes;
                if let Some(first) = bytes.first_mut() {
                    *first = 0;
                }
                let value = hex::encode(&bytes);
                let words = split(&value, unit).unwrap();
                assert_eq!(words.len(), units);
                assert_eq!(join(&words, unit), value);
            }
        }
    }

    #[test]
    fn test_to_u32_words() {
        let padded = pad_bytes(&hex::decode(GENESIS_HEADER).unwrap());
        let words = to_u32_words(&padded).unwrap();
        assert_eq!(words.len(), 32);
        assert_eq!(words[0], 0x0100_0000);
        assert_eq!(words[20], 0x8000_0000);
        assert_eq!(words[31], 640);
        assert!(to_u32_words(&[0u8; 3]).is_err());
    }
}
