//! # bindec-core — Foundational Types for the Binding Codec
//!
//! This crate is the bedrock of bindec. It defines the two tree vocabularies
//! the codec translates between, and nothing else:
//!
//! - **Normalized trees** ([`NormalizedNode`], [`NormalizedPath`]): the generic,
//!   schema-agnostic labeled tree used for storage, transport and diffing.
//!   Nodes are tagged by [`QName`] (or name + key for list entries) and are
//!   structurally comparable.
//! - **Typed trees** ([`TypedObject`], [`TypedPath`]): instances of generated
//!   types, identified by [`TypeName`], exposing their values through named
//!   accessors.
//!
//! ## Key Design Principles
//!
//! 1. **Structural equality is semantic equality.** Children of containers are
//!    an unordered set; they are stored canonically so `==` ignores insertion
//!    order. System-ordered lists compare as sets, user-ordered lists compare
//!    as sequences.
//!
//! 2. **No bare strings for identities.** Qualified names and generated type
//!    names are newtypes with validated parsing.
//!
//! 3. **Everything is immutable once built.** Trees are assembled through
//!    builders and shared freely across threads.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bindec-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod normalized;
pub mod path;
pub mod qname;
pub mod typed;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::ParseError;
pub use normalized::{
    ChoiceNode, ContainerNode, DataChildren, LeafNode, LeafSetNode, ListOrdering, MapEntryNode,
    MapNode, NormalizedNode, UnkeyedListNode,
};
pub use path::{KeyPredicate, KeyPredicates, NormalizedPath, PathArgument};
pub use qname::QName;
pub use typed::{
    KeyComponent, TypeName, TypedKey, TypedObject, TypedObjectBuilder, TypedPath,
    TypedPathArgument, TypedValue, UnionValue,
};
pub use value::{Decimal64, NormalizedValue};
