//! codecell CLI - Command line interface for codecell
//!
//! Drives a file-backed substrate from the command line: direct writes that
//! print the assigned address, keyed writes against the write-once namespace,
//! and ranged reads of either.

use clap::{Parser, Subcommand};
use codecell::{Address, DirectStore, FileSubstrate, Key, KeyedStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codecell")]
#[command(about = "Write-once byte storage addressed by deployed code cells")]
#[command(version)]
struct Cli {
    /// Path to the store file
    #[arg(short, long, default_value = "store.ccell")]
    database: PathBuf,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new store file
    Init,

    // === Direct Commands ===
    /// Store data, printing the assigned address
    Write {
        /// Data as a hex string (ignored if --file is given)
        #[arg(default_value = "")]
        data: String,
        /// Read the data from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Read data back by address
    Read {
        /// The address, 40 hex chars
        address: String,
        /// First byte to return
        #[arg(short, long)]
        start: Option<usize>,
        /// One past the last byte to return (clamped to the data)
        #[arg(short, long)]
        end: Option<usize>,
    },

    // === Keyed Commands ===
    /// Store data under a key (one write per key, ever)
    Put {
        /// The key (string, or 64 hex chars with --fixed)
        key: String,
        /// Data as a hex string (ignored if --file is given)
        #[arg(default_value = "")]
        data: String,
        /// Treat the key as a fixed 32-byte hex key
        #[arg(long)]
        fixed: bool,
        /// Read the data from a file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Read data back by key
    Get {
        /// The key (string, or 64 hex chars with --fixed)
        key: String,
        /// Treat the key as a fixed 32-byte hex key
        #[arg(long)]
        fixed: bool,
        /// First byte to return
        #[arg(short, long)]
        start: Option<usize>,
        /// One past the last byte to return (clamped to the data)
        #[arg(short, long)]
        end: Option<usize>,
    },

    /// Print the address a key resolves to, without touching the store
    Addr {
        /// The key (string, or 64 hex chars with --fixed)
        key: String,
        /// Treat the key as a fixed 32-byte hex key
        #[arg(long)]
        fixed: bool,
    },

    /// Show store status
    Status,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let substrate = FileSubstrate::create(&cli.database)?;
            substrate.sync()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "message": format!("Created store at {}", cli.database.display())
                }),
            );
        }

        Commands::Write { data, file } => {
            let payload = read_payload(&data, file.as_deref())?;
            let substrate = FileSubstrate::open_or_create(&cli.database)?;
            let store = DirectStore::new(&substrate);
            let address = store.write(&payload)?;
            substrate.sync()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "address": address.to_hex(),
                    "size": payload.len()
                }),
            );
        }

        Commands::Read {
            address,
            start,
            end,
        } => {
            let address = Address::from_hex(&address)?;
            let substrate = FileSubstrate::open(&cli.database)?;
            let store = DirectStore::new(&substrate);
            let data = store.read_slice(&address, start.unwrap_or(0), end)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "address": address.to_hex(),
                    "size": data.len(),
                    "data": hex::encode(&data)
                }),
            );
        }

        Commands::Put {
            key,
            data,
            fixed,
            file,
        } => {
            let key = parse_key(&key, fixed)?;
            let payload = read_payload(&data, file.as_deref())?;
            let substrate = FileSubstrate::open_or_create(&cli.database)?;
            let store = KeyedStore::new(&substrate);
            let address = store.write(key.clone(), &payload)?;
            substrate.sync()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "key": key.to_string(),
                    "address": address.to_hex(),
                    "size": payload.len()
                }),
            );
        }

        Commands::Get {
            key,
            fixed,
            start,
            end,
        } => {
            let key = parse_key(&key, fixed)?;
            let substrate = FileSubstrate::open(&cli.database)?;
            let store = KeyedStore::new(&substrate);
            let data = store.read_slice(key.clone(), start.unwrap_or(0), end)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "key": key.to_string(),
                    "size": data.len(),
                    "data": hex::encode(&data)
                }),
            );
        }

        Commands::Addr { key, fixed } => {
            let key = parse_key(&key, fixed)?;
            let substrate = FileSubstrate::open_or_create(&cli.database)?;
            let store = KeyedStore::new(&substrate);
            output(
                &cli.format,
                &serde_json::json!({
                    "key": key.to_string(),
                    "address": store.address_of(key.clone()).to_hex()
                }),
            );
        }

        Commands::Status => {
            let substrate = FileSubstrate::open(&cli.database)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "store": cli.database.display().to_string(),
                    "deployer": codecell::Substrate::deployer(&substrate).to_hex(),
                    "units": substrate.unit_count()
                }),
            );
        }
    }

    Ok(())
}

fn parse_key(key: &str, fixed: bool) -> anyhow::Result<Key> {
    if fixed {
        Ok(Key::fixed_from_hex(key)?)
    } else {
        Ok(Key::from(key))
    }
}

fn read_payload(data: &str, file: Option<&std::path::Path>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => Ok(std::fs::read(path)?),
        None => Ok(hex::decode(data.trim_start_matches("0x"))?),
    }
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(value).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(value).unwrap());
        }
    }
}
