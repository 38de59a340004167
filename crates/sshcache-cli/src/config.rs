//! Runtime configuration for the `sshcache` binary.
//!
//! Every setting comes from a flag, then its environment variable, then a
//! built-in default:
//! - `--db` / `SSHCACHE_DB_PATH`: SQLite database file path (default: "sshcache.db")
//! - `--timeout` / `SSHCACHE_KNOWN_HOSTS_TIMEOUT`: seconds a refreshed host
//!   stays valid (default: 180)
//! - `--now`: reference time in unix seconds (default: the system clock)

use std::time::{SystemTime, UNIX_EPOCH};

use clap::Args;

use sshcache_hosts::names::DEFAULT_KNOWN_HOSTS_TIMEOUT;

use crate::error::CliError;

pub const DEFAULT_DB_PATH: &str = "sshcache.db";

/// Flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Path to the cache database file.
    #[arg(long, global = true, env = "SSHCACHE_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db: String,

    /// Seconds a host's known_hosts data stays valid after a refresh.
    /// Negative values expire the host immediately.
    #[arg(
        long,
        global = true,
        env = "SSHCACHE_KNOWN_HOSTS_TIMEOUT",
        default_value_t = DEFAULT_KNOWN_HOSTS_TIMEOUT,
        allow_negative_numbers = true
    )]
    pub timeout: i64,

    /// Reference time in unix seconds (default: now).
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub now: Option<i64>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: String,
    pub timeout: i64,
    pub now: i64,
}

impl CliConfig {
    pub fn resolve(args: &GlobalArgs) -> Result<Self, CliError> {
        let now = match args.now {
            Some(now) => now,
            None => system_now()?,
        };
        Ok(CliConfig {
            db_path: args.db.clone(),
            timeout: args.timeout,
            now,
        })
    }
}

fn system_now() -> Result<i64, CliError> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| CliError::Config(format!("system clock is before the unix epoch: {}", e)))?;
    i64::try_from(elapsed.as_secs())
        .map_err(|_| CliError::Config("system clock is out of range".into()))
}
