//! # zk-relay
//!
//! Host side of a header relay that proves runs of Bitcoin block headers
//! with ZoKrates programs.
//!
//! The pure pieces, header codec, retarget validator, program generator and
//! witness encoder, live in `relay-circuits`. This crate adds everything that
//! touches the outside world:
//!
//! - [`header_source`]: where headers come from
//! - [`backend`]: the proving backend and its artifacts
//! - [`relay`]: fetch, encode, setup and prove
//! - [`config`] and [`cli`]: the `zk-relay` binary

pub mod backend;
pub mod cli;
pub mod config;
pub mod errors;
pub mod header_source;
pub mod relay;
pub mod utils;

pub use backend::{BatchOutputs, Proof, ProvingBackend, ZokratesCli};
pub use config::RelayConfig;
pub use errors::RelayError;
pub use header_source::{DirectoryHeaderSource, HeaderSource, RpcHeaderSource};
pub use relay::{check_linkage, validate_retarget, HeaderBatch, Relay};
