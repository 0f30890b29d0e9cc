//! # Command Line Interface
//!
//! This module defines command line interface for the `zk-relay` binary.
//! `Clap` is used for easy generation of help messages and handling
//! arguments.
//!
//! `generate`, `encode` and `validate-target` work without a configuration.
//! `setup` and `prove` read one from the file given with `--config`, or from
//! environment variables when no file is given.

use crate::backend::ZokratesCli;
use crate::config::RelayConfig;
use crate::errors::RelayError;
use crate::header_source::{DirectoryHeaderSource, HeaderSource, RpcHeaderSource};
use crate::relay::{self, Relay};
use clap::{Parser, Subcommand};
use relay_circuits::{encode, generate, BlockHeader, RetargetRule, RetargetValidator};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

/// Proves runs of Bitcoin block headers with ZoKrates.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// TOML formatted configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Verbosity level, ranging from 0 (none) to 5 (highest)
    #[arg(short, long, global = true, default_value_t = 3)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print or write the program for a batch size.
    Generate {
        #[arg(short, long)]
        batch: usize,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the witness arguments of a batch, one per line.
    Encode {
        /// Raw hex of the head of the epoch the batch starts in.
        #[arg(long)]
        epoch_head: String,
        /// Raw hex of every header in the batch, in order.
        #[arg(required = true, num_args = 2..)]
        headers: Vec<String>,
    },
    /// Compile the program for a batch size, run setup and export its
    /// verifier contract.
    Setup {
        #[arg(short, long)]
        batch: usize,
    },
    /// Prove the headers between two heights, both inclusive.
    Prove {
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
        /// Read `mainnet_{height}.json` files from this directory instead of
        /// the configured Bitcoin RPC.
        #[arg(long)]
        headers_dir: Option<PathBuf>,
    },
    /// Check the bits of a next epoch head against the retarget rule.
    ValidateTarget {
        #[arg(long)]
        epoch_head: String,
        #[arg(long)]
        epoch_tail: String,
        #[arg(long)]
        next_epoch_head: String,
        /// Defaults to `bitcoin-consensus`.
        #[arg(long, value_parser = parse_rule)]
        rule: Option<RetargetRule>,
    },
}

fn parse_rule(rule: &str) -> Result<RetargetRule, String> {
    match rule {
        "bitcoin-consensus" => Ok(RetargetRule::BitcoinConsensus),
        "ceiling-only" => Ok(RetargetRule::CeilingOnly),
        other => Err(format!("unknown retarget rule {other}")),
    }
}

/// Parse all the command line arguments.
pub fn parse() -> Result<Args, RelayError> {
    parse_from(std::env::args())
}

/// Parse given iterator. This is good for isolated environments, like tests.
pub fn parse_from<I, T>(itr: I) -> Result<Args, RelayError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(itr) {
        Ok(c) => Ok(c),
        Err(e) => Err(RelayError::ConfigError(e.to_string())),
    }
}

/// Reads the configuration file if one is given, environment variables
/// otherwise.
pub fn get_configuration(args: &Args) -> Result<RelayConfig, RelayError> {
    match &args.config {
        Some(config_file) => RelayConfig::try_parse_file(config_file.clone()),
        None => {
            tracing::info!("No configuration file is given, using environment variables...");
            RelayConfig::from_env()
        }
    }
}

fn parse_header(raw: &str) -> Result<BlockHeader, RelayError> {
    Ok(BlockHeader::from_raw_hex(raw)?)
}

/// Runs the subcommand, writing results to `out`.
pub fn run(args: Args, out: &mut impl Write) -> Result<(), RelayError> {
    match &args.command {
        Command::Generate { batch, out: file } => {
            let program = generate(*batch)?;
            match file {
                Some(file) => {
                    std::fs::write(file, program.as_str())?;
                    writeln!(out, "{}", file.display())?;
                }
                None => write!(out, "{program}")?,
            }
        }
        Command::Encode {
            epoch_head,
            headers,
        } => {
            let epoch_head = parse_header(epoch_head)?;
            let headers = headers
                .iter()
                .map(|raw| parse_header(raw))
                .collect::<Result<Vec<_>, _>>()?;

            for arg in encode(&epoch_head, &headers)?.to_args() {
                writeln!(out, "{arg}")?;
            }
        }
        Command::Setup { batch } => {
            let config = get_configuration(&args)?;
            let relay = Relay::new((), ZokratesCli::from_config(&config), config);

            let contract = relay.setup_and_export_verifier(*batch)?;
            writeln!(out, "{}", contract.path.display())?;
        }
        Command::Prove {
            start,
            end,
            headers_dir,
        } => {
            let config = get_configuration(&args)?;
            let source: Box<dyn HeaderSource> = match (headers_dir, &config.rpc) {
                (Some(dir), _) => Box::new(DirectoryHeaderSource::new(dir)),
                (None, Some(rpc)) => Box::new(RpcHeaderSource::from_config(rpc)?),
                (None, None) => {
                    return Err(RelayError::ConfigError(
                        "Either --headers-dir or an [rpc] section is required".to_string(),
                    ))
                }
            };
            let relay = Relay::new(source, ZokratesCli::from_config(&config), config);

            let proof = relay.build_input_and_prove(*start, *end)?;
            let outputs = proof.outputs()?;
            let report = serde_json::json!({
                "proof": proof.flatten(),
                "inputs": proof.inputs,
                "final_block_hash": outputs.final_block_hash_hex(),
                "updated_target": format!("{:064x}", outputs.updated_target),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Command::ValidateTarget {
            epoch_head,
            epoch_tail,
            next_epoch_head,
            rule,
        } => {
            let validator = RetargetValidator::new(rule.unwrap_or_default());
            let verdict = relay::validate_retarget(
                &validator,
                &parse_header(epoch_head)?,
                &parse_header(epoch_tail)?,
                &parse_header(next_epoch_head)?,
            )?;

            writeln!(out, "valid: {}", verdict.valid)?;
            writeln!(out, "expected bits: {:08x}", verdict.expected_bits)?;
            writeln!(out, "next target: {:064x}", verdict.next_target)?;
        }
    }

    Ok(())
}
