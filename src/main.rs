use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hdkeytree::network::{self, Network, NetworkPrefixes};
use hdkeytree::{CurveAdapter, LibSecp256k1, Secp256kFun};

/// Result from a command, separating human output from copy-paste result
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Human-readable output with explanations
    pub output: String,
    /// Clean JSON result for copy-pasting
    pub result: String,
}

mod commands;

#[derive(Parser)]
#[command(name = "hdkeytree")]
#[command(about = "BIP-32 hierarchical deterministic key derivation", long_about = None)]
struct Cli {
    /// Network whose version bytes are used (bitcoin, testnet, signet, regtest)
    #[arg(long, global = true, default_value = "bitcoin")]
    network: Network,

    /// JSON file with custom version bytes; overrides --network
    #[arg(long, global = true)]
    network_file: Option<PathBuf>,

    /// Elliptic-curve backend
    #[arg(long, global = true, value_enum, default_value_t = Backend::Secp256kfun)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Pure Rust secp256kfun
    Secp256kfun,
    /// libsecp256k1 through the bitcoin crate
    Libsecp256k1,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random master key
    Generate {
        /// Also create a BIP-39 mnemonic with this many words (12, 15, 18, 21 or 24)
        #[arg(long)]
        words: Option<usize>,

        /// BIP-39 passphrase, only used with --words
        #[arg(long, default_value = "")]
        passphrase: String,
    },

    /// Build the master key for a hex seed
    FromSeed {
        /// Seed hex
        #[arg(long)]
        seed: String,
    },

    /// Build the master key for a BIP-39 mnemonic
    FromMnemonic {
        /// Space-separated mnemonic words
        #[arg(long)]
        words: String,

        /// Optional BIP-39 passphrase
        #[arg(long, default_value = "")]
        passphrase: String,
    },

    /// Derive a child key along a path (e.g. m/44'/0'/0'/0/0)
    Derive {
        /// Extended key (xprv/xpub)
        #[arg(long)]
        key: String,

        /// Derivation path relative to the key
        #[arg(long)]
        path: String,

        /// Output only the public half of the child
        #[arg(long, default_value = "false")]
        public: bool,
    },

    /// Decode an extended key and show its fields
    Inspect {
        /// Extended key (xprv/xpub)
        #[arg(long)]
        key: String,
    },

    /// Convert an extended private key into its extended public key
    Neuter {
        /// Extended private key
        #[arg(long)]
        key: String,
    },

    /// Parse a derivation path into raw indices
    DecodePath {
        /// Derivation path
        #[arg(long)]
        path: String,
    },
}

fn load_network(network: Network, file: Option<&Path>) -> Result<NetworkPrefixes> {
    let Some(file) = file else {
        return Ok(network.prefixes());
    };
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read network file {}", file.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid network file {}", file.display()))
}

fn run<C: CurveAdapter>(command: Commands, network: &NetworkPrefixes, curve: C) -> Result<()> {
    let cmd_result = match command {
        Commands::Generate { words, passphrase } => {
            commands::generate_core(words, &passphrase, network, curve)?
        }
        Commands::FromSeed { seed } => commands::from_seed_core(&seed, network, curve)?,
        Commands::FromMnemonic { words, passphrase } => {
            commands::from_mnemonic_core(&words, &passphrase, network, curve)?
        }
        Commands::Derive { key, path, public } => {
            commands::derive_core(&key, &path, public, network, curve)?
        }
        Commands::Inspect { key } => commands::inspect_core(&key, network, curve)?,
        Commands::Neuter { key } => commands::neuter_core(&key, network, curve)?,
        Commands::DecodePath { path } => commands::decode_path_core(&path)?,
    };

    println!("{}", cmd_result.output);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Copy this JSON:");
    println!("{}\n", cmd_result.result);
    Ok(())
}

fn main() -> Result<()> {
    hdkeytree::logging::init().context("Failed to install logger")?;
    let cli = Cli::parse();

    let prefixes = load_network(cli.network, cli.network_file.as_deref())?;
    network::set_default(prefixes).context("Failed to set default network")?;
    let network = network::default_network();

    match cli.backend {
        Backend::Secp256kfun => run(cli.command, &network, Secp256kFun),
        Backend::Libsecp256k1 => run(cli.command, &network, LibSecp256k1::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_network_by_name() {
        let prefixes = load_network(Network::Testnet, None).unwrap();
        assert_eq!(prefixes, NetworkPrefixes::TESTNET);
    }

    #[test]
    fn test_load_network_file() {
        let path =
            std::env::temp_dir().join(format!("hdkeytree-net-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"hd_private_version":"01020304","hd_public_version":"05060708"}"#,
        )
        .unwrap();

        let prefixes = load_network(Network::Bitcoin, Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(prefixes.hd_private_version(), [1, 2, 3, 4]);
        assert_eq!(prefixes.hd_public_version(), [5, 6, 7, 8]);
    }

    #[test]
    fn test_load_network_missing_file() {
        let err = load_network(Network::Bitcoin, Some(Path::new("/nonexistent/net.json")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read network file"));
    }

    #[test]
    fn test_cli_parses_global_options() {
        let cli = Cli::try_parse_from([
            "hdkeytree",
            "inspect",
            "--key",
            "xpub",
            "--network",
            "regtest",
            "--backend",
            "libsecp256k1",
        ])
        .unwrap();
        assert_eq!(cli.network, Network::Testnet);
        assert_eq!(cli.backend, Backend::Libsecp256k1);
        assert!(matches!(cli.command, Commands::Inspect { .. }));

        let bad = ["hdkeytree", "--network", "dogecoin", "decode-path", "--path", "m"];
        assert!(Cli::try_parse_from(bad).is_err());
    }
}
