//! Enumerations and bits: symbol lookup tables in both directions.

use std::collections::{BTreeSet, HashMap};

use bindec_core::{NormalizedValue, TypedValue};
use bindec_schema::{BitDef, EnumMember};

use super::ValueCodec;
use crate::error::CodecError;

/// Enumeration codec: generated symbol ↔ schema name.
#[derive(Debug, Clone)]
pub struct EnumCodec {
    name_by_symbol: HashMap<String, String>,
    symbol_by_name: HashMap<String, String>,
}

impl EnumCodec {
    pub fn new(members: &[EnumMember]) -> Self {
        Self {
            name_by_symbol: members
                .iter()
                .map(|m| (m.symbol.clone(), m.name.clone()))
                .collect(),
            symbol_by_name: members
                .iter()
                .map(|m| (m.name.clone(), m.symbol.clone()))
                .collect(),
        }
    }
}

fn invalid(symbol: &str, domain: &'static str) -> CodecError {
    CodecError::InvalidSymbol {
        symbol: symbol.to_string(),
        domain,
    }
}

impl ValueCodec for EnumCodec {
    fn encode(&self, value: &TypedValue) -> Result<NormalizedValue, CodecError> {
        let TypedValue::Enum(symbol) = value else {
            return Err(CodecError::value_mismatch("enumeration", value.kind()));
        };
        self.name_by_symbol
            .get(symbol)
            .map(|name| NormalizedValue::String(name.clone()))
            .ok_or_else(|| invalid(symbol, "enumeration"))
    }

    fn decode(&self, value: &NormalizedValue) -> Result<TypedValue, CodecError> {
        let NormalizedValue::String(name) = value else {
            return Err(CodecError::value_mismatch("enumeration", value.kind()));
        };
        self.symbol_by_name
            .get(name)
            .map(|symbol| TypedValue::Enum(symbol.clone()))
            .ok_or_else(|| invalid(name, "enumeration"))
    }
}

/// Bits codec: set of generated properties ↔ set of schema bit names.
#[derive(Debug, Clone)]
pub struct BitsCodec {
    name_by_property: HashMap<String, String>,
    property_by_name: HashMap<String, String>,
}

impl BitsCodec {
    pub fn new(bits: &[BitDef]) -> Self {
        Self {
            name_by_property: bits
                .iter()
                .map(|b| (b.property.clone(), b.name.clone()))
                .collect(),
            property_by_name: bits
                .iter()
                .map(|b| (b.name.clone(), b.property.clone()))
                .collect(),
        }
    }

    fn decode_names<'a>(
        &self,
        names: impl Iterator<Item = &'a str>,
    ) -> Result<TypedValue, CodecError> {
        let properties = names
            .map(|n| {
                self.property_by_name
                    .get(n)
                    .cloned()
                    .ok_or_else(|| invalid(n, "bits"))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(TypedValue::Bits(properties))
    }
}

impl ValueCodec for BitsCodec {
    fn encode(&self, value: &TypedValue) -> Result<NormalizedValue, CodecError> {
        let TypedValue::Bits(properties) = value else {
            return Err(CodecError::value_mismatch("bits", value.kind()));
        };
        let names = properties
            .iter()
            .map(|p| {
                self.name_by_property
                    .get(p)
                    .cloned()
                    .ok_or_else(|| invalid(p, "bits"))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(NormalizedValue::Bits(names))
    }

    fn decode(&self, value: &NormalizedValue) -> Result<TypedValue, CodecError> {
        match value {
            NormalizedValue::Bits(names) => self.decode_names(names.iter().map(String::as_str)),
            NormalizedValue::String(text) => self.decode_names(text.split_whitespace()),
            other => Err(CodecError::value_mismatch("bits", other.kind())),
        }
    }
}
