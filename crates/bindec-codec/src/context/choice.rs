//! Choices: a typed case object ↔ a normalized choice node.
//!
//! The active case is not named in the normalized tree. On decode it is
//! recovered from the first child some case (or an augmentation of a case)
//! declares.

use std::collections::HashMap;
use std::sync::Arc;

use bindec_core::{ChoiceNode, QName, TypeName, TypedObject};
use bindec_schema::{SchemaNode, TypeDescriptor};

use super::CodecPrototype;
use crate::error::CodecError;
use crate::tree::CodecTree;

#[derive(Debug)]
pub struct ChoiceContext {
    ty: TypeName,
    qname: QName,
    cases: Vec<Arc<CodecPrototype>>,
    by_case_type: HashMap<TypeName, usize>,
    by_child_qname: HashMap<QName, usize>,
}

impl ChoiceContext {
    pub(crate) fn build(
        tree: &CodecTree,
        descriptor: &TypeDescriptor,
        node: &SchemaNode,
    ) -> Result<Self, CodecError> {
        let index = tree.index();
        let ty = descriptor.name();
        let mut cases = Vec::with_capacity(descriptor.cases().len());
        let mut by_case_type = HashMap::new();
        let mut by_child_qname = HashMap::new();
        for (i, case) in descriptor.cases().iter().enumerate() {
            let case_descriptor = index.descriptor(case).ok_or_else(|| {
                CodecError::mismatch(ty, format!("case {case} has no type descriptor"))
            })?;
            let augmenting = case_descriptor
                .augmentations()
                .iter()
                .filter_map(|aug| index.descriptor(aug))
                .flat_map(|aug| aug.accessors());
            for accessor in case_descriptor.accessors().iter().chain(augmenting) {
                by_child_qname.entry(accessor.qname.clone()).or_insert(i);
            }
            by_case_type.insert(case.clone(), i);
            cases.push(tree.prototype(case)?);
        }
        Ok(Self {
            ty: ty.clone(),
            qname: node.qname.clone(),
            cases,
            by_case_type,
            by_child_qname,
        })
    }

    pub fn type_name(&self) -> &TypeName {
        &self.ty
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn case_types(&self) -> impl Iterator<Item = &TypeName> {
        self.cases.iter().map(|c| c.type_name())
    }

    /// The case that declares the child `name`.
    pub(crate) fn case_for_child(&self, name: &QName) -> Option<&Arc<CodecPrototype>> {
        self.by_child_qname.get(name).map(|&i| &self.cases[i])
    }

    pub(crate) fn case(&self, ty: &TypeName) -> Option<&Arc<CodecPrototype>> {
        self.by_case_type.get(ty).map(|&i| &self.cases[i])
    }

    pub fn encode(&self, tree: &CodecTree, case: &TypedObject) -> Result<ChoiceNode, CodecError> {
        let prototype = self.case(case.type_name()).ok_or_else(|| {
            CodecError::IncorrectNesting(format!(
                "{} is not a case of {}",
                case.type_name(),
                self.ty
            ))
        })?;
        let ctx = prototype.get(tree)?;
        Ok(ChoiceNode::with_children(
            self.qname.clone(),
            ctx.as_data_object()?.encode_children(tree, case)?,
        ))
    }

    pub fn decode(&self, tree: &CodecTree, node: &ChoiceNode) -> Result<TypedObject, CodecError> {
        let prototype = node
            .children
            .iter()
            .find_map(|child| self.case_for_child(child.name()))
            .ok_or_else(|| {
                CodecError::IncorrectNesting(format!(
                    "choice {} has no child belonging to a case of {}",
                    node.name, self.ty
                ))
            })?;
        let ctx = prototype.get(tree)?;
        ctx.as_data_object()?.decode_children(tree, &node.children)
    }
}
