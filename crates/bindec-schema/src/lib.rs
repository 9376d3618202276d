//! # bindec-schema — Schema Index
//!
//! The immutable reverse index between schema nodes and the generated types
//! that represent them. The codec consumes this index; it never builds or
//! mutates one.
//!
//! ## What the index answers
//!
//! - [`SchemaIndex::resolve_schema_node`]: which schema node a generated type
//!   stands for.
//! - [`SchemaIndex::key_extractor`]: how to read the key out of a list entry.
//! - [`SchemaIndex::identity_table`]: which generated identity type a
//!   qualified identity name maps to.
//!
//! ## Loading (`document`)
//!
//! A generator normally supplies the index. For tooling and tests the
//! [`document`] module reads the same metadata from a YAML or JSON descriptor
//! document and derives omitted generated names with the usual binding
//! naming rules.
//!
//! ## Crate Policy
//!
//! - Depends only on `bindec-core` internally.
//! - The index performs no schema validation. A descriptor that names a
//!   missing schema node is accepted here and rejected by the codec when it
//!   builds contexts.

pub mod descriptor;
pub mod document;
pub mod error;
pub mod index;
pub mod node;

pub use descriptor::{Accessor, AccessorTarget, FieldKeyExtractor, KeyExtractor, TypeDescriptor};
pub use document::{load_path, SchemaDocument};
pub use error::{KeyExtractionError, SchemaIndexError};
pub use index::{SchemaIndex, SchemaIndexBuilder};
pub use node::{BitDef, EnumMember, LeafType, SchemaNode, SchemaNodeKind, SchemaPath, UnionMember};
