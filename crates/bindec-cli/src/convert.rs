//! # Encode and Decode Subcommands
//!
//! ```bash
//! bindec encode --schema schemas/library.schema.yaml --input library.json
//! bindec decode --schema schemas/library.schema.yaml --input node.json --path path.json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use bindec_codec::CodecConfig;
use bindec_core::{NormalizedNode, NormalizedPath, TypedObject, TypedPath};
use clap::Args;
use serde::Serialize;

use crate::{load_registry, print_json, read_json, SchemaArgs};

/// Arguments for the encode subcommand.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Typed object as JSON.
    #[arg(long)]
    pub input: PathBuf,

    /// Typed path of the object as JSON. Derived from the object when it is
    /// a top-level type.
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the decode subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Normalized node as JSON.
    #[arg(long)]
    pub input: PathBuf,

    /// Normalized path of the node as JSON.
    #[arg(long)]
    pub path: PathBuf,
}

#[derive(Serialize)]
struct Encoded {
    path: NormalizedPath,
    node: NormalizedNode,
}

#[derive(Serialize)]
struct Decoded {
    path: TypedPath,
    object: TypedObject,
}

/// Execute the encode subcommand.
pub fn run_encode(args: &EncodeArgs, config: &CodecConfig) -> Result<u8> {
    let registry = load_registry(&args.schema, config)?;
    let object: TypedObject = read_json(&args.input)?;
    let (path, node) = match &args.path {
        Some(path) => registry.to_normalized(&read_json(path)?, &object)?,
        None => registry.to_normalized_root(&object)?,
    };
    tracing::info!(path = %path, "encoded {}", object.type_name());
    print_json(&Encoded { path, node })?;
    Ok(0)
}

/// Execute the decode subcommand.
pub fn run_decode(args: &DecodeArgs, config: &CodecConfig) -> Result<u8> {
    let registry = load_registry(&args.schema, config)?;
    let node: NormalizedNode = read_json(&args.input)?;
    let path: NormalizedPath = read_json(&args.path)?;
    let (path, object) = registry.from_normalized(&path, &node)?;
    tracing::info!(path = %path, "decoded {}", object.type_name());
    print_json(&Decoded { path, object })?;
    Ok(0)
}
