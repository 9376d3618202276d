//! Keys of list entries: typed key ↔ normalized key predicates.

use std::sync::Arc;

use bindec_core::{KeyPredicates, QName, TypeName, TypedKey, TypedObject, TypedObjectBuilder};
use bindec_schema::KeyExtractor;

use crate::error::CodecError;
use crate::value::ValueCodec;

#[derive(Debug)]
struct KeyLeaf {
    accessor: String,
    qname: QName,
    codec: Arc<dyn ValueCodec>,
}

/// Key codec of one keyed list. Components are kept in schema key order, so
/// single and multi-leaf keys are handled the same way.
#[derive(Debug)]
pub struct ListKeyCodec {
    list: TypeName,
    extractor: Arc<dyn KeyExtractor>,
    components: Vec<KeyLeaf>,
}

impl ListKeyCodec {
    pub(crate) fn new(
        list: TypeName,
        extractor: Arc<dyn KeyExtractor>,
        components: impl IntoIterator<Item = (String, QName, Arc<dyn ValueCodec>)>,
    ) -> Self {
        Self {
            list,
            extractor,
            components: components
                .into_iter()
                .map(|(accessor, qname, codec)| KeyLeaf {
                    accessor,
                    qname,
                    codec,
                })
                .collect(),
        }
    }

    fn missing(&self, component: &str) -> CodecError {
        CodecError::MissingKey {
            list: self.list.clone(),
            component: component.to_string(),
        }
    }

    /// Read the key of `entry` through the descriptor's key extractor.
    pub fn key_of(&self, entry: &TypedObject) -> Result<TypedKey, CodecError> {
        Ok(self.extractor.extract(entry)?)
    }

    pub fn encode_key(&self, key: &TypedKey) -> Result<KeyPredicates, CodecError> {
        let mut predicates = KeyPredicates::new();
        for leaf in &self.components {
            let value = key.get(&leaf.accessor).ok_or_else(|| self.missing(&leaf.accessor))?;
            predicates.push(leaf.qname.clone(), leaf.codec.encode(value)?);
        }
        Ok(predicates)
    }

    pub fn decode_key(&self, predicates: &KeyPredicates) -> Result<TypedKey, CodecError> {
        let mut key = TypedKey::new();
        for leaf in &self.components {
            let value = predicates
                .get(&leaf.qname)
                .ok_or_else(|| self.missing(&leaf.accessor))?;
            key.push(leaf.accessor.clone(), leaf.codec.decode(value)?);
        }
        Ok(key)
    }

    /// Set key leaves the entry's children did not carry from its predicates.
    pub(crate) fn fill_from_predicates(
        &self,
        builder: &mut TypedObjectBuilder,
        predicates: &KeyPredicates,
    ) -> Result<(), CodecError> {
        for leaf in &self.components {
            if builder.has_field(&leaf.accessor) {
                continue;
            }
            let value = predicates
                .get(&leaf.qname)
                .ok_or_else(|| self.missing(&leaf.accessor))?;
            builder.set_field(leaf.accessor.clone(), leaf.codec.decode(value)?);
        }
        Ok(())
    }
}
