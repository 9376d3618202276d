//! # Value Codecs
//!
//! Stateless converters for leaf values, one per leaf type family. A codec is
//! built once per leaf when the owning context is built and then shared.
//!
//! Decoding accepts the canonical normalized variant for the type and, where
//! one exists, its lexical `String` form.

mod enumeration;
mod identity;
mod instance;
mod scalar;
mod union;

use std::fmt;
use std::sync::{Arc, Weak};

use bindec_core::{NormalizedValue, TypedValue};
use bindec_schema::{LeafType, SchemaIndex};

use crate::error::CodecError;
use crate::tree::CodecTree;

pub use enumeration::{BitsCodec, EnumCodec};
pub use identity::IdentityCodec;
pub use instance::InstanceIdentifierCodec;
pub use scalar::{IntWidth, ScalarCodec, ScalarKind};
pub use union::UnionCodec;

/// Converts one leaf value between its typed and normalized forms.
pub trait ValueCodec: Send + Sync + fmt::Debug {
    fn encode(&self, value: &TypedValue) -> Result<NormalizedValue, CodecError>;

    fn decode(&self, value: &NormalizedValue) -> Result<TypedValue, CodecError>;
}

/// Build the codec for a leaf of type `ty`.
///
/// Instance-identifier codecs keep only a weak handle to `tree`; the target
/// of a path value is resolved when the value is converted.
pub(crate) fn value_codec(
    ty: &LeafType,
    index: &Arc<SchemaIndex>,
    tree: &Weak<CodecTree>,
) -> Arc<dyn ValueCodec> {
    match ty {
        LeafType::Enumeration(members) => Arc::new(EnumCodec::new(members)),
        LeafType::Bits(bits) => Arc::new(BitsCodec::new(bits)),
        LeafType::IdentityRef { .. } => Arc::new(IdentityCodec::new(Arc::clone(index))),
        LeafType::InstanceIdentifier => Arc::new(InstanceIdentifierCodec::new(tree.clone())),
        LeafType::Union(members) => Arc::new(UnionCodec::new(
            members
                .iter()
                .map(|m| (m.name.clone(), value_codec(&m.ty, index, tree)))
                .collect(),
        )),
        LeafType::Empty => Arc::new(ScalarCodec::new(ScalarKind::Empty)),
        LeafType::Boolean => Arc::new(ScalarCodec::new(ScalarKind::Boolean)),
        LeafType::Int8 => Arc::new(ScalarCodec::signed(IntWidth::W8)),
        LeafType::Int16 => Arc::new(ScalarCodec::signed(IntWidth::W16)),
        LeafType::Int32 => Arc::new(ScalarCodec::signed(IntWidth::W32)),
        LeafType::Int64 => Arc::new(ScalarCodec::signed(IntWidth::W64)),
        LeafType::Uint8 => Arc::new(ScalarCodec::unsigned(IntWidth::W8)),
        LeafType::Uint16 => Arc::new(ScalarCodec::unsigned(IntWidth::W16)),
        LeafType::Uint32 => Arc::new(ScalarCodec::unsigned(IntWidth::W32)),
        LeafType::Uint64 => Arc::new(ScalarCodec::unsigned(IntWidth::W64)),
        LeafType::Decimal64 { fraction_digits } => {
            Arc::new(ScalarCodec::new(ScalarKind::Decimal64 {
                fraction_digits: *fraction_digits,
            }))
        }
        LeafType::String => Arc::new(ScalarCodec::new(ScalarKind::String)),
        LeafType::Binary => Arc::new(ScalarCodec::new(ScalarKind::Binary)),
    }
}
