//! # Environment Variable Support For [`RelayConfig`]

use super::{
    ContextConfig, ProvingScheme, RelayConfig, RetargetConfig, RpcConfig, ZokratesConfig,
};
use crate::errors::RelayError;
use relay_circuits::RetargetRule;
use std::{fmt::Display, str::FromStr};

pub fn read_string_from_env(env_var: &'static str) -> Result<String, RelayError> {
    std::env::var(env_var).map_err(|e| RelayError::EnvVarNotSet(e, env_var))
}

pub fn read_string_from_env_then_parse<T: FromStr>(env_var: &'static str) -> Result<T, RelayError>
where
    T::Err: Display,
{
    read_string_from_env(env_var)?
        .parse::<T>()
        .map_err(|e| RelayError::ConfigError(format!("Failed to parse {env_var}: {e}")))
}

/// Returns `None` if `env_var` is not set, and the error otherwise.
fn read_optional_string_from_env(env_var: &'static str) -> Result<Option<String>, RelayError> {
    match read_string_from_env(env_var) {
        Ok(value) => Ok(Some(value)),
        Err(RelayError::EnvVarNotSet(std::env::VarError::NotPresent, _)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn parse_retarget_rule(rule: &str) -> Result<RetargetRule, RelayError> {
    match rule {
        "bitcoin-consensus" => Ok(RetargetRule::BitcoinConsensus),
        "ceiling-only" => Ok(RetargetRule::CeilingOnly),
        other => Err(RelayError::ConfigError(format!(
            "Unknown retarget rule: {other}"
        ))),
    }
}

impl RelayConfig {
    /// Builds a `RelayConfig` from environment variables. Directory and file
    /// names under `ROOT_DIR` use their defaults.
    ///
    /// Required: `ZOKRATES_BIN_PATH`, `ZOKRATES_STDLIB_PATH`,
    /// `PROVING_SCHEME`, `ROOT_DIR`.
    ///
    /// Optional: `RETARGET_RULE`, and `BITCOIN_RPC_URL` together with
    /// `BITCOIN_RPC_USER` and `BITCOIN_RPC_PASSWORD`.
    pub fn from_env() -> Result<Self, RelayError> {
        let zokrates = ZokratesConfig {
            bin_path: read_string_from_env("ZOKRATES_BIN_PATH")?.into(),
            stdlib_path: read_string_from_env("ZOKRATES_STDLIB_PATH")?.into(),
        };

        let context = ContextConfig {
            proving_scheme: read_string_from_env_then_parse::<ProvingScheme>("PROVING_SCHEME")?,
            root_dir: read_string_from_env("ROOT_DIR")?.into(),
            code: Default::default(),
            data: Default::default(),
            contract: Default::default(),
        };

        let retarget = match read_optional_string_from_env("RETARGET_RULE")? {
            Some(rule) => RetargetConfig {
                rule: parse_retarget_rule(&rule)?,
            },
            None => RetargetConfig::default(),
        };

        let rpc = match read_optional_string_from_env("BITCOIN_RPC_URL")? {
            Some(url) => Some(RpcConfig {
                url,
                user: read_string_from_env("BITCOIN_RPC_USER")?.into(),
                password: read_string_from_env("BITCOIN_RPC_PASSWORD")?.into(),
            }),
            None => None,
        };

        Ok(RelayConfig {
            zokrates,
            context,
            retarget,
            rpc,
        })
    }
}
