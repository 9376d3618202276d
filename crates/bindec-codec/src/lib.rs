//! # bindec-codec — Typed Tree ↔ Normalized Tree Codec
//!
//! Converts instances of generated types into schema-agnostic normalized
//! trees and back, and translates typed paths to normalized paths and back.
//! The schema is only known at run time, through a [`SchemaIndex`].
//!
//! ## Architecture
//!
//! ```text
//! CodecRegistry ──> GenerationManager ──> Generation { SchemaIndex, CodecTree }
//!                                                                   │
//!                                   CodecPrototype slot per type <──┘
//!                                              │
//!                       DataObjectContext / ChoiceContext ──> ValueCodec per leaf
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Interpreter, not code generation.** Each context is a table of child
//!    codecs built from the type descriptor's accessors.
//!
//! 2. **Recursion through slots.** Contexts refer to child types through
//!    lazily filled [`CodecPrototype`] slots, so cyclic schemas build in one
//!    pass.
//!
//! 3. **Generations are values.** A schema reload builds a new
//!    [`Generation`]; callers holding the old one keep using it.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - Conversions never block and never perform I/O.
//! - No `panic!()` or `.unwrap()` outside tests.
//!
//! [`SchemaIndex`]: bindec_schema::SchemaIndex

pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod path;
pub mod registry;
pub mod tree;
pub mod value;

pub use config::CodecConfig;
pub use context::{
    ChoiceContext, CodecPrototype, DataObjectContext, DataObjectShape, ListKeyCodec,
    NodeCodecContext,
};
pub use error::{CodecError, ConfigError};
pub use generation::{Generation, GenerationManager, GenerationToken};
pub use path::ExtensionScope;
pub use registry::CodecRegistry;
pub use tree::CodecTree;
pub use value::ValueCodec;
