//! # Node Codec Contexts
//!
//! A context owns the mapping for one schema node that has a generated type:
//! containers, list entries, cases and augmentations
//! ([`DataObjectContext`]), and choices ([`ChoiceContext`]).
//!
//! ## Construction
//!
//! Contexts never hold other contexts directly. A child is reached through a
//! [`CodecPrototype`], a slot that is registered in the codec tree before any
//! context for it exists and is filled on first use. Building a context
//! therefore touches only the schema index, never another context, so a
//! recursive schema cannot recurse during construction.
//!
//! Two threads may fill the same slot at once. Both build equivalent
//! contexts from the same inputs; the first to publish wins and the loser's
//! copy is dropped.

mod choice;
mod data_object;
mod key;

use std::sync::{Arc, OnceLock};

use bindec_core::TypeName;
use bindec_schema::SchemaNodeKind;

use crate::error::CodecError;
use crate::tree::CodecTree;

pub use choice::ChoiceContext;
pub use data_object::{DataObjectContext, DataObjectShape};
pub use key::ListKeyCodec;

pub(crate) use data_object::{ChildStep, PathChild, PathChildKind};

/// The codec for one generated type.
#[derive(Debug)]
pub enum NodeCodecContext {
    DataObject(DataObjectContext),
    Choice(ChoiceContext),
}

impl NodeCodecContext {
    /// Build the context for `ty`. Fails with `SchemaMismatch` when the type
    /// cannot be resolved to a schema node of a kind that carries a type.
    pub(crate) fn build(tree: &CodecTree, ty: &TypeName) -> Result<Self, CodecError> {
        let index = tree.index();
        let descriptor = index
            .descriptor(ty)
            .ok_or_else(|| CodecError::mismatch(ty, "no type descriptor"))?;
        let node = index.resolve_schema_node(ty).ok_or_else(|| {
            CodecError::mismatch(ty, format!("no schema node at {}", descriptor.schema()))
        })?;
        match &node.kind {
            SchemaNodeKind::Choice => Ok(Self::Choice(ChoiceContext::build(tree, descriptor, node)?)),
            SchemaNodeKind::Leaf { .. } | SchemaNodeKind::LeafList { .. } => Err(CodecError::mismatch(
                ty,
                format!("{} is a {} and has no generated type", node.path, node.kind.name()),
            )),
            _ => Ok(Self::DataObject(DataObjectContext::build(tree, descriptor, node)?)),
        }
    }

    pub fn type_name(&self) -> &TypeName {
        match self {
            Self::DataObject(ctx) => ctx.type_name(),
            Self::Choice(ctx) => ctx.type_name(),
        }
    }

    pub fn as_data_object(&self) -> Result<&DataObjectContext, CodecError> {
        match self {
            Self::DataObject(ctx) => Ok(ctx),
            Self::Choice(ctx) => Err(CodecError::IncorrectNesting(format!(
                "{} is a choice, not a data object",
                ctx.type_name()
            ))),
        }
    }

    pub fn as_choice(&self) -> Result<&ChoiceContext, CodecError> {
        match self {
            Self::Choice(ctx) => Ok(ctx),
            Self::DataObject(ctx) => Err(CodecError::IncorrectNesting(format!(
                "{} is not a choice",
                ctx.type_name()
            ))),
        }
    }

    /// Types this context can hand off to: children, cases, augmentations.
    pub(crate) fn referenced_types(&self) -> Vec<TypeName> {
        match self {
            Self::DataObject(ctx) => ctx.referenced_types(),
            Self::Choice(ctx) => ctx.case_types().cloned().collect(),
        }
    }
}

/// A lazily filled slot for the context of one type.
#[derive(Debug)]
pub struct CodecPrototype {
    ty: TypeName,
    context: OnceLock<Arc<NodeCodecContext>>,
}

impl CodecPrototype {
    pub(crate) fn new(ty: TypeName) -> Self {
        Self {
            ty,
            context: OnceLock::new(),
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.ty
    }

    pub fn is_built(&self) -> bool {
        self.context.get().is_some()
    }

    /// The context for this slot, building and publishing it on first use.
    pub fn get(&self, tree: &CodecTree) -> Result<Arc<NodeCodecContext>, CodecError> {
        if let Some(ctx) = self.context.get() {
            return Ok(Arc::clone(ctx));
        }
        let built = Arc::new(NodeCodecContext::build(tree, &self.ty)?);
        tree.record_construction();
        tracing::trace!(ty = %self.ty, "constructed codec context");
        match self.context.set(Arc::clone(&built)) {
            Ok(()) => Ok(built),
            Err(_) => {
                tracing::trace!(ty = %self.ty, "lost construction race; using published context");
                Ok(self.context.get().map(Arc::clone).unwrap_or(built))
            }
        }
    }
}
