//! # Common Module
//! Constants and helpers shared by the header codec, the retarget validator
//! and the batch encoder: Bitcoin and circuit constants, double SHA256,
//! wire/display byte order conversion and SHA-256 message padding.

pub mod constants;
pub mod endian;
pub mod errors;
pub mod hashes;
pub mod padding;
