//! Symbolic identity references, resolved through the identity table.

use std::sync::Arc;

use bindec_core::{NormalizedValue, QName, TypedValue};
use bindec_schema::SchemaIndex;

use super::ValueCodec;
use crate::error::CodecError;

/// Identity codec: generated identity type ↔ qualified identity name.
#[derive(Debug, Clone)]
pub struct IdentityCodec {
    index: Arc<SchemaIndex>,
}

impl IdentityCodec {
    pub fn new(index: Arc<SchemaIndex>) -> Self {
        Self { index }
    }

    fn lookup(&self, name: &QName) -> Result<TypedValue, CodecError> {
        self.index
            .identity_type(name)
            .map(|ty| TypedValue::Identity(ty.clone()))
            .ok_or_else(|| CodecError::UnknownIdentity(name.to_string()))
    }
}

impl ValueCodec for IdentityCodec {
    fn encode(&self, value: &TypedValue) -> Result<NormalizedValue, CodecError> {
        let TypedValue::Identity(ty) = value else {
            return Err(CodecError::value_mismatch("identityref", value.kind()));
        };
        self.index
            .identity_name(ty)
            .map(|q| NormalizedValue::Identity(q.clone()))
            .ok_or_else(|| CodecError::UnknownIdentity(ty.to_string()))
    }

    fn decode(&self, value: &NormalizedValue) -> Result<TypedValue, CodecError> {
        match value {
            NormalizedValue::Identity(name) => self.lookup(name),
            NormalizedValue::String(text) => {
                let name: QName = text
                    .parse()
                    .map_err(|_| CodecError::UnknownIdentity(text.clone()))?;
                self.lookup(&name)
            }
            other => Err(CodecError::value_mismatch("identityref", other.kind())),
        }
    }
}
