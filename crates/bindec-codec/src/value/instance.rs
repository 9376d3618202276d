//! Path references. The target is resolved through the owning codec tree
//! each time a value is converted, never while contexts are being built.

use std::sync::Weak;

use bindec_core::{NormalizedValue, TypedValue};

use super::ValueCodec;
use crate::error::CodecError;
use crate::path::ExtensionScope;
use crate::tree::CodecTree;

/// Instance-identifier codec: typed path ↔ normalized path.
#[derive(Debug, Clone)]
pub struct InstanceIdentifierCodec {
    tree: Weak<CodecTree>,
}

impl InstanceIdentifierCodec {
    pub fn new(tree: Weak<CodecTree>) -> Self {
        Self { tree }
    }
}

impl ValueCodec for InstanceIdentifierCodec {
    fn encode(&self, value: &TypedValue) -> Result<NormalizedValue, CodecError> {
        let TypedValue::InstanceIdentifier(path) = value else {
            return Err(CodecError::value_mismatch("instance-identifier", value.kind()));
        };
        let tree = self
            .tree
            .upgrade()
            .ok_or_else(|| CodecError::unresolved(path, "codec tree has been released"))?;
        tree.to_normalized_path(path)
            .map(NormalizedValue::InstanceIdentifier)
    }

    fn decode(&self, value: &NormalizedValue) -> Result<TypedValue, CodecError> {
        let NormalizedValue::InstanceIdentifier(path) = value else {
            return Err(CodecError::value_mismatch("instance-identifier", value.kind()));
        };
        let tree = self
            .tree
            .upgrade()
            .ok_or_else(|| CodecError::unresolved(path, "codec tree has been released"))?;
        tree.from_normalized_path(path, ExtensionScope::Any)
            .map(TypedValue::InstanceIdentifier)
    }
}
