//! # Error Types
//!
//! Every conversion failure is returned synchronously at the call boundary.
//! Conversions are deterministic, so nothing here is retried.

use std::path::PathBuf;

use bindec_core::TypeName;
use bindec_schema::KeyExtractionError;
use thiserror::Error;

/// Error raised while building codecs or converting between trees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A generated type has no usable schema node. Raised while building
    /// a generation; the generation is not published.
    #[error("type {ty} does not match the schema: {reason}")]
    SchemaMismatch {
        /// The offending type.
        ty: TypeName,
        /// What could not be resolved.
        reason: String,
    },

    /// No union alternative accepted the value.
    #[error("no union alternative accepts value '{value}'")]
    UnresolvedUnionValue {
        /// Debug rendering of the rejected value.
        value: String,
    },

    /// An identity is not present in the identity table.
    #[error("unknown identity '{0}'")]
    UnknownIdentity(String),

    /// An enumeration or bits value outside the declared domain.
    #[error("'{symbol}' is not a declared {domain} symbol")]
    InvalidSymbol {
        /// The rejected symbol.
        symbol: String,
        /// `enumeration` or `bits`.
        domain: &'static str,
    },

    /// A list entry key could not be produced or consumed.
    #[error("missing key component '{component}' for list {list}")]
    MissingKey {
        /// The list type.
        list: TypeName,
        /// The missing key leaf.
        component: String,
    },

    /// A path step has no corresponding codec.
    #[error("cannot resolve path step '{step}': {reason}")]
    UnresolvedPathStep {
        /// Rendering of the failing step.
        step: String,
        /// Why it failed.
        reason: String,
    },

    /// Data is not shaped the way the schema requires at this position.
    #[error("incorrect nesting: {0}")]
    IncorrectNesting(String),

    /// A value does not fit the declared leaf type.
    #[error("value mismatch: expected {expected}, found {found}")]
    ValueMismatch {
        /// The declared type.
        expected: String,
        /// What was supplied.
        found: String,
    },
}

impl CodecError {
    pub(crate) fn mismatch(ty: &TypeName, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            ty: ty.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(step: impl ToString, reason: impl Into<String>) -> Self {
        Self::UnresolvedPathStep {
            step: step.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn value_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ValueMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<KeyExtractionError> for CodecError {
    fn from(err: KeyExtractionError) -> Self {
        Self::MissingKey {
            list: err.ty,
            component: err.component,
        }
    }
}

/// Error loading a [`CodecConfig`](crate::CodecConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// YAML could not be parsed or contained unknown keys.
    #[error("invalid codec configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}
