//! # Path Subcommand
//!
//! Translates a typed path to a normalized path, or the reverse. Reverse
//! translation only descends into the augmentations named with
//! `--extension`.

use std::path::PathBuf;

use anyhow::Result;
use bindec_codec::CodecConfig;
use bindec_core::{NormalizedPath, TypeName, TypedPath};
use clap::{ArgGroup, Args};

use crate::{load_registry, print_json, read_json, SchemaArgs};

/// Arguments for the path subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("direction").required(true).args(["typed", "normalized"])))]
pub struct PathArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Typed path as JSON; printed as a normalized path.
    #[arg(long)]
    pub typed: Option<PathBuf>,

    /// Normalized path as JSON; printed as a typed path.
    #[arg(long)]
    pub normalized: Option<PathBuf>,

    /// Augmentation type the normalized path may descend into. Repeatable.
    #[arg(long = "extension", requires = "normalized")]
    pub extensions: Vec<String>,
}

/// Execute the path subcommand.
pub fn run_path(args: &PathArgs, config: &CodecConfig) -> Result<u8> {
    let registry = load_registry(&args.schema, config)?;
    if let Some(file) = &args.typed {
        let typed: TypedPath = read_json(file)?;
        let normalized = registry.to_normalized_path(&typed)?;
        println!("{normalized}");
        print_json(&normalized)?;
    } else if let Some(file) = &args.normalized {
        let normalized: NormalizedPath = read_json(file)?;
        let candidates: Vec<TypeName> = args.extensions.iter().map(TypeName::new).collect();
        let typed = registry.from_normalized_path(&normalized, &candidates)?;
        println!("{typed}");
        print_json(&typed)?;
    }
    Ok(0)
}
