//! Indexer configuration, read from the process environment (and an
//! optional `.env` file loaded by `main`).
//!
//! | Variable             | Default                                  |
//! |----------------------|------------------------------------------|
//! | `RPC_URL`            | `https://soroban-testnet.stellar.org`    |
//! | `CONTRACT_ID`        | required                                 |
//! | `DATABASE_URL`       | `sqlite:./pmp_events.db`                 |
//! | `API_PORT`           | `3001`                                   |
//! | `POLL_INTERVAL_SECS` | `5`                                      |
//! | `EVENTS_PER_PAGE`    | `100`                                    |
//! | `START_LEDGER`       | `0`                                      |
//! | `RPC_TIMEOUT_SECS`   | `30`                                     |

use std::str::FromStr;

use crate::errors::{IndexerError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    /// Address of the deployed `PerpetualMotionProtocol` contract (strkey).
    pub contract_id: String,
    pub database_url: String,
    pub api_port: u16,
    pub poll_interval_secs: u64,
    pub events_per_page: u32,
    /// Ledger to scan from when no cursor has been saved yet.
    pub start_ledger: u32,
    pub rpc_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contract_id = lookup("CONTRACT_ID").filter(|v| !v.trim().is_empty()).ok_or_else(|| {
            IndexerError::Config("CONTRACT_ID environment variable is required".to_string())
        })?;

        Ok(Config {
            rpc_url: lookup("RPC_URL")
                .unwrap_or_else(|| "https://soroban-testnet.stellar.org".to_string()),
            contract_id,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./pmp_events.db".to_string()),
            api_port: parse_or(&lookup, "API_PORT", 3001)?,
            poll_interval_secs: parse_or(&lookup, "POLL_INTERVAL_SECS", 5)?,
            events_per_page: parse_or(&lookup, "EVENTS_PER_PAGE", 100)?,
            start_ledger: parse_or(&lookup, "START_LEDGER", 0)?,
            rpc_timeout_secs: parse_or(&lookup, "RPC_TIMEOUT_SECS", 30)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IndexerError::Config(format!("Invalid {key}: {raw:?}"))),
        None => Ok(default),
    }
}
