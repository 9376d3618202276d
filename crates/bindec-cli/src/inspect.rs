//! # Inspect Subcommand
//!
//! Builds a generation over a schema document and reports what it contains.

use anyhow::Result;
use bindec_codec::CodecConfig;
use clap::Args;

use crate::{load_registry, SchemaArgs};

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs, config: &CodecConfig) -> Result<u8> {
    let registry = load_registry(&args.schema, config)?;
    let generation = registry.generation();
    let index = generation.index();
    let tree = generation.tree();

    println!("schema:       {}", args.schema.schema.display());
    println!("generation:   {}", generation.token());
    println!("schema nodes: {}", index.node_count());
    println!("types:        {}", index.types().count());
    println!("identities:   {}", index.identity_table().len());
    println!(
        "contexts:     {} published, {} constructed",
        tree.cached_contexts(),
        tree.constructed_contexts()
    );
    println!("roots:");
    for root in index.roots() {
        match index.resolve_schema_node(root) {
            Some(node) => println!("  {:<20} {} {}", root.as_str(), node.kind.name(), node.qname),
            None => println!("  {root}"),
        }
    }
    Ok(0)
}
