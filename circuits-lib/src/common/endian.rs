//! # Byte Order
//!
//! Hashes travel in two byte orders: wire order, as serialized inside a
//! header and as produced by SHA256, and display order, the reversed form
//! printed by block explorers and Bitcoin Core RPC. Every conversion between
//! the two goes through [`to_wire_bytes`] or [`to_display_hex`].

use super::errors::FormatError;

/// Removes an optional `0x` prefix.
pub fn strip_hex_prefix(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

/// Converts a display order hex string into wire order bytes.
pub fn to_wire_bytes(display_hex: &str) -> Result<Vec<u8>, FormatError> {
    let mut bytes = hex::decode(strip_hex_prefix(display_hex))?;
    bytes.reverse();
    Ok(bytes)
}

/// Converts wire order bytes into a lowercase display order hex string.
pub fn to_display_hex(wire_bytes: &[u8]) -> String {
    let reversed: Vec<u8> = wire_bytes.iter().rev().copied().collect();
    hex::encode(reversed)
}

/// Decodes a display order hash into its 32 wire order bytes.
pub fn hash_to_wire_bytes(display_hex: &str) -> Result<[u8; 32], FormatError> {
    let bytes = to_wire_bytes(display_hex)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| FormatError::LengthMismatch {
            expected: 32,
            actual,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const GENESIS_HASH_DISPLAY: &str =
        "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
    const GENESIS_HASH_WIRE: [u8; 32] =
        hex!("6fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000");

    #[test]
    fn test_to_wire_bytes() {
        assert_eq!(
            to_wire_bytes(GENESIS_HASH_DISPLAY).unwrap(),
            GENESIS_HASH_WIRE.to_vec()
        );
        assert_eq!(
            to_wire_bytes(&format!("0x{GENESIS_HASH_DISPLAY}")).unwrap(),
            GENESIS_HASH_WIRE.to_vec()
        );
        assert_eq!(to_wire_bytes("").unwrap(), Vec::<u8>::new());
        assert_eq!(to_wire_bytes("112233").unwrap(), vec![0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_to_wire_bytes_rejects_malformed_hex() {
        assert!(to_wire_bytes("abc").is_err());
        assert!(to_wire_bytes("zz").is_err());
    }

    #[test]
    fn test_to_display_hex() {
        assert_eq!(to_display_hex(&GENESIS_HASH_WIRE), GENESIS_HASH_DISPLAY);
        assert_eq!(to_display_hex(&[]), "");
        assert_eq!(to_display_hex(&[0x33, 0x22, 0x11]), "112233");
    }

    /// Converting twice in the same direction must not cancel out.
    #[test]
    fn test_conversions_are_inverse_not_idempotent() {
        let wire = to_wire_bytes(GENESIS_HASH_DISPLAY).unwrap();
        assert_eq!(to_display_hex(&wire), GENESIS_HASH_DISPLAY);
        assert_ne!(hex::encode(&wire), GENESIS_HASH_DISPLAY);
    }

    #[test]
    fn test_hash_to_wire_bytes() {
        assert_eq!(
            hash_to_wire_bytes(GENESIS_HASH_DISPLAY).unwrap(),
            GENESIS_HASH_WIRE
        );
        assert_eq!(
            hash_to_wire_bytes("1122"),
            Err(FormatError::LengthMismatch {
                expected: 32,
                actual: 2
            })
        );
    }
}
