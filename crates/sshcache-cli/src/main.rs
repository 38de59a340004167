//! SSH host cache CLI.
//!
//! Provides the `sshcache` binary for inspecting and maintaining a cache of
//! SSH host identities stored in a SQLite database. `get` and `list` print
//! JSON to stdout, `known-hosts` prints OpenSSH known_hosts lines. Logs go
//! to stderr and are filtered with `RUST_LOG` (default: warn).

mod config;
mod error;

use std::io::{self, Write};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sshcache_core::Attributes;
use sshcache_hosts::names::ATTR_SSH_PUBLIC_KEY;
use sshcache_hosts::{
    delete_host, get_host, list_valid_host_records, refresh_expiry, render_known_hosts,
    store_host, HostRecord,
};
use sshcache_storage::SqliteStore;

use crate::config::{CliConfig, GlobalArgs};
use crate::error::CliError;

/// Cache of SSH host identities.
#[derive(Debug, Parser)]
#[command(name = "sshcache", about = "Cache of SSH host identities")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Store (create or replace) a host, then refresh its expiry.
    Store {
        /// Primary host name.
        name: String,

        /// Alias to merge into the stored alias list.
        #[arg(long)]
        alias: Option<String>,

        /// Public key line; may be repeated.
        #[arg(long = "key")]
        keys: Vec<String>,

        /// Extra attribute as NAME=VALUE; may be repeated.
        #[arg(long = "attr", value_parser = parse_attr)]
        attrs: Vec<(String, String)>,
    },

    /// Refresh a host's known_hosts expiry without touching anything else.
    Refresh {
        name: String,
    },

    /// Print one host as JSON.
    Get {
        name: String,

        /// Only return these attributes; may be repeated.
        #[arg(long = "attr")]
        wanted: Vec<String>,
    },

    /// Print every host valid at the reference time as JSON.
    List,

    /// Delete a host.
    Delete {
        name: String,
    },

    /// Print known_hosts lines for every valid host.
    KnownHosts,
}

fn parse_attr(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let stdout = io::stdout();
    let exit_code = match run(&cli, &mut stdout.lock()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

/// Executes one subcommand against the configured database, writing its
/// output to `out`.
fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let config = CliConfig::resolve(&cli.global)?;
    debug!(db = %config.db_path, now = config.now, "opening host cache");
    let mut store = SqliteStore::new(&config.db_path).map_err(|source| CliError::Open {
        path: config.db_path.clone(),
        source,
    })?;

    match &cli.command {
        Commands::Store {
            name,
            alias,
            keys,
            attrs,
        } => {
            let mut payload = Attributes::new();
            for key in keys {
                payload.add_string(ATTR_SSH_PUBLIC_KEY, key.as_str())?;
            }
            for (attr, value) in attrs {
                payload.add_string(attr, value.as_str())?;
            }
            store_host(&mut store, name, alias.as_deref(), config.now, payload)?;
            refresh_expiry(&mut store, name, config.now, config.timeout)?;
        }
        Commands::Refresh { name } => {
            refresh_expiry(&mut store, name, config.now, config.timeout)?;
        }
        Commands::Get { name, wanted } => {
            let wanted: Vec<&str> = wanted.iter().map(String::as_str).collect();
            let projection = (!wanted.is_empty()).then_some(wanted.as_slice());
            let entry =
                get_host(&store, name, projection)?.ok_or_else(|| CliError::NotFound(name.clone()))?;
            let record = HostRecord::try_from(entry)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
        }
        Commands::List => {
            let records = list_valid_host_records(&store, config.now)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
        }
        Commands::Delete { name } => {
            delete_host(&mut store, name)?;
        }
        Commands::KnownHosts => {
            let records = list_valid_host_records(&store, config.now)?;
            write!(out, "{}", render_known_hosts(&records))?;
        }
    }
    Ok(())
}
