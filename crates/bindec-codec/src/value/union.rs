//! Tagged unions.
//!
//! Alternatives are tried strictly in declared order and the first one that
//! accepts the value wins. For a value several alternatives accept, the
//! earliest declared alternative is always the result. A typed value that
//! names its member is encoded by that member only.

use std::sync::Arc;

use bindec_core::{NormalizedValue, TypedValue};

use super::ValueCodec;
use crate::error::CodecError;

/// Union codec over an ordered list of `(member name, codec)` alternatives.
#[derive(Debug, Clone)]
pub struct UnionCodec {
    members: Vec<(String, Arc<dyn ValueCodec>)>,
}

impl UnionCodec {
    pub fn new(members: Vec<(String, Arc<dyn ValueCodec>)>) -> Self {
        Self { members }
    }
}

impl ValueCodec for UnionCodec {
    fn encode(&self, value: &TypedValue) -> Result<NormalizedValue, CodecError> {
        if let TypedValue::Union(u) = value {
            // The named member must accept the value itself.
            let (_, codec) = self
                .members
                .iter()
                .find(|(name, _)| *name == u.member)
                .ok_or_else(|| CodecError::UnresolvedUnionValue {
                    value: format!("{:?} (no member '{}')", u.value, u.member),
                })?;
            return codec.encode(&u.value).map_err(|err| {
                tracing::trace!(member = %u.member, %err, "named union member rejected value");
                CodecError::UnresolvedUnionValue {
                    value: format!("{:?}", u.value),
                }
            });
        }
        self.members
            .iter()
            .find_map(|(_, codec)| codec.encode(value).ok())
            .ok_or_else(|| CodecError::UnresolvedUnionValue {
                value: format!("{value:?}"),
            })
    }

    fn decode(&self, value: &NormalizedValue) -> Result<TypedValue, CodecError> {
        for (name, codec) in &self.members {
            match codec.decode(value) {
                Ok(decoded) => return Ok(TypedValue::union(name.clone(), decoded)),
                Err(err) => tracing::trace!(member = %name, %err, "union alternative rejected value"),
            }
        }
        Err(CodecError::UnresolvedUnionValue {
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{IdentityCodec, IntWidth, ScalarCodec, ScalarKind};
    use bindec_core::{QName, TypeName};
    use bindec_schema::SchemaIndex;

    fn identity() -> Arc<dyn ValueCodec> {
        let index = SchemaIndex::builder()
            .identity(QName::new("urn:t", "crime"), "Crime")
            .build()
            .unwrap();
        Arc::new(IdentityCodec::new(Arc::new(index)))
    }

    fn uint16() -> Arc<dyn ValueCodec> {
        Arc::new(ScalarCodec::unsigned(IntWidth::W16))
    }

    fn string() -> Arc<dyn ValueCodec> {
        Arc::new(ScalarCodec::new(ScalarKind::String))
    }

    #[test]
    fn falls_through_to_first_accepting_member() {
        let codec = UnionCodec::new(vec![("identityref".into(), identity()), ("uint16".into(), uint16())]);
        let decoded = codec.decode(&NormalizedValue::String("30".into())).unwrap();
        assert_eq!(decoded, TypedValue::union("uint16", TypedValue::Uint(30)));
        assert_eq!(codec.encode(&decoded).unwrap(), NormalizedValue::Uint16(30));
    }

    #[test]
    fn earliest_declared_member_wins_ties() {
        let codec = UnionCodec::new(vec![("uint16".into(), uint16()), ("string".into(), string())]);
        for _ in 0..3 {
            let decoded = codec.decode(&NormalizedValue::String("7".into())).unwrap();
            assert_eq!(decoded, TypedValue::union("uint16", TypedValue::Uint(7)));
        }
        let decoded = codec.decode(&NormalizedValue::String("seven".into())).unwrap();
        assert_eq!(decoded, TypedValue::union("string", TypedValue::from("seven")));
    }

    #[test]
    fn named_member_is_preferred_on_encode() {
        let codec = UnionCodec::new(vec![("identityref".into(), identity()), ("uint16".into(), uint16())]);
        let typed = TypedValue::union("identityref", TypedValue::Identity(TypeName::from("Crime")));
        assert_eq!(
            codec.encode(&typed).unwrap(),
            NormalizedValue::Identity(QName::new("urn:t", "crime"))
        );
        // A bare value is offered to each member in order.
        assert_eq!(codec.encode(&TypedValue::Uint(4)).unwrap(), NormalizedValue::Uint16(4));
    }

    #[test]
    fn no_member_accepts() {
        let codec = UnionCodec::new(vec![("uint16".into(), uint16())]);
        assert!(matches!(
            codec.decode(&NormalizedValue::String("x".into())),
            Err(CodecError::UnresolvedUnionValue { .. })
        ));
        assert!(matches!(
            codec.encode(&TypedValue::Uint(70_000)),
            Err(CodecError::UnresolvedUnionValue { .. })
        ));
    }

    #[test]
    fn members_of_different_widths_keep_their_member() {
        let uint8: Arc<dyn ValueCodec> = Arc::new(ScalarCodec::unsigned(IntWidth::W8));
        let codec = UnionCodec::new(vec![("uint8".into(), uint8), ("uint16".into(), uint16())]);
        for member in ["uint8", "uint16"] {
            let typed = TypedValue::union(member, TypedValue::Uint(7));
            let encoded = codec.encode(&typed).unwrap();
            assert_eq!(codec.decode(&encoded).unwrap(), typed);
        }
        // The lexical form still resolves to the first declared member.
        assert_eq!(
            codec.decode(&NormalizedValue::String("7".into())).unwrap(),
            TypedValue::union("uint8", TypedValue::Uint(7))
        );
    }

    #[test]
    fn named_member_that_rejects_the_value_fails() {
        let codec = UnionCodec::new(vec![("identityref".into(), identity()), ("uint16".into(), uint16())]);
        let wrong = TypedValue::union("identityref", TypedValue::Uint(4));
        assert!(matches!(
            codec.encode(&wrong),
            Err(CodecError::UnresolvedUnionValue { .. })
        ));
        let unknown = TypedValue::union("int64", TypedValue::Uint(4));
        assert!(matches!(
            codec.encode(&unknown),
            Err(CodecError::UnresolvedUnionValue { .. })
        ));
    }
}
