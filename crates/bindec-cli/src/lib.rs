//! # bindec-cli — Binding Codec Command-Line Interface
//!
//! Loads a schema descriptor document, builds a codec generation over it and
//! runs one conversion. Inputs and outputs are JSON.
//!
//! ## Subcommands
//!
//! - `inspect`: Summarize the roots and contexts of a schema document
//! - `encode`: Typed object → normalized path and node
//! - `decode`: Normalized path and node → typed path and object
//! - `path`: Translate a path in either direction
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in their modules.
//! - Handlers delegate to `bindec-codec`; no conversion logic here.

pub mod convert;
pub mod inspect;
pub mod path;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bindec_codec::{CodecConfig, CodecRegistry};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The schema document every subcommand operates on.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Schema descriptor document (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    pub schema: PathBuf,
}

/// Load the codec configuration, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    match path {
        Some(path) => CodecConfig::load(path)
            .with_context(|| format!("failed to load codec config {}", path.display())),
        None => Ok(CodecConfig::default()),
    }
}

/// Load a schema document and build the first generation over it.
pub fn load_registry(schema: &SchemaArgs, config: &CodecConfig) -> Result<CodecRegistry> {
    let index = bindec_schema::load_path(&schema.schema)
        .with_context(|| format!("failed to load schema {}", schema.schema.display()))?;
    CodecRegistry::with_config(index, config.clone())
        .with_context(|| format!("schema {} does not build a codec", schema.schema.display()))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
