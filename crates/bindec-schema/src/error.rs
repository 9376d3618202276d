//! # Error Types
//!
//! Failures while assembling or loading a schema index, and the single
//! failure a key extractor can report.

use std::path::PathBuf;

use bindec_core::TypeName;
use thiserror::Error;

use crate::node::SchemaPath;

/// Error while building or loading a [`SchemaIndex`](crate::SchemaIndex).
#[derive(Error, Debug)]
pub enum SchemaIndexError {
    /// A name uses a module prefix that the document does not declare.
    #[error("unknown module prefix '{prefix}' in name '{name}'")]
    UnknownPrefix {
        /// The undeclared prefix.
        prefix: String,
        /// The full name it appeared in.
        name: String,
    },

    /// A name is empty or malformed.
    #[error("invalid schema name '{0}'")]
    InvalidName(String),

    /// Two descriptors claim the same generated type.
    #[error("generated type '{0}' is declared more than once")]
    DuplicateType(TypeName),

    /// A list key names a leaf the list does not declare.
    #[error("list {list} declares key leaf '{key}' but has no such leaf")]
    UnknownKeyLeaf {
        /// Schema path of the list.
        list: SchemaPath,
        /// The unmatched key name.
        key: String,
    },

    /// A top-level data node is neither a container nor a list.
    #[error("top-level node {0} must be a container or a list")]
    InvalidRoot(SchemaPath),

    /// An augmentation targets a schema node with no generated type.
    #[error("augmentation {augmentation} targets {target}, which has no generated type")]
    DanglingAugmentation {
        /// The augmentation type.
        augmentation: TypeName,
        /// The schema path it targets.
        target: SchemaPath,
    },

    /// YAML document could not be parsed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON document could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// A key component could not be read from a list entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("entry of type {ty} has no value for key component '{component}'")]
pub struct KeyExtractionError {
    /// Type of the entry.
    pub ty: TypeName,
    /// Accessor name of the missing key leaf.
    pub component: String,
}
