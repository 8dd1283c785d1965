//! Account management CLI.
//!
//! ```text
//! authorizer new [--dir DIR]            generate an encrypted key file
//! authorizer inspect [--key-file PATH]  decrypt a key file, print its address
//! authorizer metadata --key-file PATH   print a key file's non-secret fields
//! ```
//!
//! The passphrase is read from the environment variable named by
//! `--passphrase-env` (or `keystore.passphrase_env` in the config file).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use eth_authorizer::config::{load_config, AuthorizerConfig};
use eth_authorizer::credential::{self, CredentialError, ErrorKind, KeyFileMetadata};
use eth_authorizer::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "authorizer")]
#[command(about = "Manage encrypted Ethereum signing accounts", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment variable holding the key file passphrase
    #[arg(long)]
    passphrase_env: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new account and store it as an encrypted key file
    New {
        /// Directory to write the key file to (default: keystore.dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Decrypt a key file and print the account address
    Inspect {
        /// Key file to decrypt (default: keystore.key_file)
        #[arg(short, long)]
        key_file: Option<PathBuf>,
    },
    /// Print the non-secret fields of a key file
    Metadata {
        #[arg(short, long)]
        key_file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AuthorizerConfig::default(),
    };
    if let Some(var) = cli.passphrase_env {
        config.keystore.passphrase_env = var;
    }

    init_logging(&config.logging)?;

    let output = match cli.command {
        Commands::New { dir } => {
            let dir = dir.unwrap_or_else(|| config.keystore.dir.clone());
            let passphrase = credential::passphrase_from_env(&config.keystore.passphrase_env)?;
            let handle = credential::generate_key_file(&dir, &passphrase)?;
            serde_json::to_value(&handle)?
        }
        Commands::Inspect { key_file } => {
            let key_file = key_file
                .or_else(|| config.keystore.key_file.clone())
                .ok_or_else(|| {
                    CredentialError::new(
                        ErrorKind::Configuration,
                        "locate key file: pass --key-file or set keystore.key_file",
                    )
                })?;
            let passphrase = credential::passphrase_from_env(&config.keystore.passphrase_env)?;
            let key = credential::load_key(&key_file, &passphrase)?;
            json!({
                "address": key.address(),
                "path": key_file,
            })
        }
        Commands::Metadata { key_file } => {
            let metadata = KeyFileMetadata::read(&key_file)?;
            json!({
                "id": metadata.id,
                "version": metadata.version,
                "address": metadata.address,
                "path": key_file,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
