//! # Header Sources
//!
//! Where the relay gets raw block headers from. The relay only needs one
//! operation, the serialized header at a height, so any node client or test
//! fixture can stand in through [`HeaderSource`].

use crate::config::RpcConfig;
use crate::errors::RelayError;
use bitcoincore_rpc::{Auth, Client, RpcApi};
use relay_circuits::BlockHeader;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::path::PathBuf;

pub trait HeaderSource {
    /// Returns the raw 160 character hex of the header at `height`.
    fn header_at_height(&self, height: u64) -> Result<String, RelayError>;
}

impl<T: HeaderSource + ?Sized> HeaderSource for Box<T> {
    fn header_at_height(&self, height: u64) -> Result<String, RelayError> {
        (**self).header_at_height(height)
    }
}

impl<T: HeaderSource + ?Sized> HeaderSource for &T {
    fn header_at_height(&self, height: u64) -> Result<String, RelayError> {
        (**self).header_at_height(height)
    }
}

#[derive(Debug, Deserialize)]
struct HeaderFile {
    hex: String,
}

/// Reads headers from `mainnet_{height}.json` files holding a `hex` field.
#[derive(Debug, Clone)]
pub struct DirectoryHeaderSource {
    dir: PathBuf,
}

impl DirectoryHeaderSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, height: u64) -> PathBuf {
        self.dir.join(format!("mainnet_{height}.json"))
    }
}

impl HeaderSource for DirectoryHeaderSource {
    fn header_at_height(&self, height: u64) -> Result<String, RelayError> {
        let path = self.path_for(height);
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            RelayError::HeaderSource(format!("Can't read {}: {e}", path.display()))
        })?;
        let file: HeaderFile = serde_json::from_str(&contents)?;

        tracing::trace!(height, "Read header from {:?}", path);
        Ok(file.hex)
    }
}

/// Fetches headers from Bitcoin Core.
pub struct RpcHeaderSource {
    client: Client,
}

impl RpcHeaderSource {
    pub fn new(url: &str, user: String, password: String) -> Result<Self, RelayError> {
        let client = Client::new(url, Auth::UserPass(user, password))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &RpcConfig) -> Result<Self, RelayError> {
        Self::new(
            &config.url,
            config.user.expose_secret().to_string(),
            config.password.expose_secret().to_string(),
        )
    }
}

impl HeaderSource for RpcHeaderSource {
    fn header_at_height(&self, height: u64) -> Result<String, RelayError> {
        let hash = self.client.get_block_hash(height)?;
        // Non verbose `getblockheader` returns the serialized header as hex.
        let raw: String = self.client.call(
            "getblockheader",
            &[serde_json::Value::String(hash.to_string()), false.into()],
        )?;

        tracing::trace!(height, %hash, "Fetched header over RPC");
        Ok(BlockHeader::from_raw_hex(&raw)?.raw_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_1: &str = "010000006fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000982051fd1e4ba744bbbe680e1fee14677ba1a3c3540bf7b1cdb606e857233e0e61bc6649ffff001d01e36299";

    #[test]
    fn read_header_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("mainnet_1.json"),
            format!(r#"{{"hex": "{BLOCK_1}", "height": 1}}"#),
        )
        .unwrap();

        let source = DirectoryHeaderSource::new(dir.path());
        assert_eq!(source.header_at_height(1).unwrap(), BLOCK_1);

        let boxed: Box<dyn HeaderSource> = Box::new(source.clone());
        assert_eq!(boxed.header_at_height(1).unwrap(), BLOCK_1);
    }

    #[test]
    fn missing_header_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryHeaderSource::new(dir.path());

        assert!(matches!(
            source.header_at_height(2),
            Err(RelayError::HeaderSource(_))
        ));
    }

    #[test]
    fn malformed_header_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mainnet_3.json"), r#"{"raw": "00"}"#).unwrap();
        let source = DirectoryHeaderSource::new(dir.path());

        assert!(matches!(
            source.header_at_height(3),
            Err(RelayError::Json(_))
        ));
    }
}
