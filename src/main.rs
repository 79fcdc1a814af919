//! verkle-hash - command-line access to the native verkle Pedersen hash
//!
//! Resolves and loads the platform library the same way embedding
//! applications do, which makes it useful for checking a deployment.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use verkle_bindings::config::BindingConfig;
use verkle_bindings::ffi::{LibraryResolver, NativeBinding};
use verkle_bindings::{keys, PedersenHasher};

#[derive(Parser)]
#[command(name = "verkle-hash")]
#[command(version)]
#[command(about = "Pedersen hash via the native verkle library", long_about = None)]
struct Cli {
    /// Config file (default: verkle.toml searched upward from the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Deployment root containing runtimes/ (overrides config)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the stem hash (or tree key) of an address and tree index
    Hash {
        /// Address as hex, 20 or 32 bytes
        #[arg(short, long)]
        address: String,

        /// Tree index as a decimal u64 or little-endian hex (up to 32 bytes)
        #[arg(short, long, default_value = "0")]
        index: String,

        /// Leaf sub-index; prints the tree key instead of the stem hash
        #[arg(short, long)]
        sub_index: Option<u8>,
    },

    /// Print the native library path resolved for this host
    Path {
        /// Logical library name (overrides config)
        #[arg(short, long)]
        library: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let root = cli.root.unwrap_or_else(|| config.deployment_root());

    match cli.command {
        Commands::Hash {
            address,
            index,
            sub_index,
        } => {
            let address = parse_address(&address)?;
            let index = parse_tree_index(&index)?;

            let binding = NativeBinding::new(config.native.library.clone(), root);
            let mut hasher =
                PedersenHasher::with_binding(&binding).context("Failed to create hasher")?;

            let digest = match sub_index {
                Some(sub_index) => hasher.tree_key(&address, &index, sub_index)?,
                None => hasher.hash_to_array(&address, &index)?,
            };
            hasher.release();

            println!("{}", hex::encode(digest));
        }
        Commands::Path { library } => {
            let name = library.unwrap_or(config.native.library);
            let resolver = LibraryResolver::new(name);
            let relative = resolver.resolve_library_path()?;
            println!("{}", root.join(relative).display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<BindingConfig> {
    match path {
        Some(path) => BindingConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => BindingConfig::load_from_cwd().context("Failed to load verkle.toml"),
    }
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim_start_matches("0x").trim_start_matches("0X");
    hex::decode(trimmed).with_context(|| format!("Invalid hex: {}", input))
}

fn parse_address(input: &str) -> Result<[u8; verkle_bindings::ffi::ADDRESS_LEN]> {
    let bytes = parse_hex(input)?;
    keys::address32_from_slice(&bytes)
        .ok_or_else(|| anyhow!("Address must be 20 or 32 bytes, got {}", bytes.len()))
}

fn parse_tree_index(input: &str) -> Result<[u8; verkle_bindings::ffi::TREE_INDEX_LEN]> {
    if let Ok(value) = input.parse::<u64>() {
        return Ok(keys::tree_index_le(value));
    }
    let bytes = parse_hex(input)?;
    match keys::tree_index_from_le_slice(&bytes) {
        Some(index) => Ok(index),
        None => bail!("Tree index must be at most 32 bytes, got {}", bytes.len()),
    }
}
