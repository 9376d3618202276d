//! # bindec — Binding Codec CLI
//!
//! Single entry point for converting between typed objects and normalized
//! trees against a schema descriptor document.
//!
//! ## Usage
//!
//! ```bash
//! bindec inspect --schema schemas/library.schema.yaml
//! bindec encode --schema schemas/library.schema.yaml --input library.json
//! bindec decode --schema schemas/library.schema.yaml --input node.json --path path.json
//! bindec path --schema schemas/library.schema.yaml --normalized path.json --extension LibraryStats
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bindec_cli::convert::{run_decode, run_encode, DecodeArgs, EncodeArgs};
use bindec_cli::inspect::{run_inspect, InspectArgs};
use bindec_cli::load_config;
use bindec_cli::path::{run_path, PathArgs};

/// Binding codec: typed trees ↔ normalized trees.
#[derive(Parser, Debug)]
#[command(name = "bindec", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Codec configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize the roots and contexts of a schema document.
    Inspect(InspectArgs),

    /// Encode a typed object into a normalized path and node.
    Encode(EncodeArgs),

    /// Decode a normalized node into a typed path and object.
    Decode(DecodeArgs),

    /// Translate a typed path to a normalized path, or the reverse.
    Path(PathArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info"),
        2 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Inspect(args) => run_inspect(args, &config),
        Commands::Encode(args) => run_encode(args, &config),
        Commands::Decode(args) => run_decode(args, &config),
        Commands::Path(args) => run_path(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
