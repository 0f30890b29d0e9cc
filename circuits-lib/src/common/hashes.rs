use sha2::{Digest, Sha256};

/// SHA256(SHA256(input)), in the byte order the hasher produces.
pub fn calculate_double_sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::default();
    hasher.update(input);
    let result = hasher.finalize_reset();
    hasher.update(result);
    hasher.finalize().into()
}
