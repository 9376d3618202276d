//! # Codec Registry
//!
//! The public entry point for conversions. Every call runs against the
//! generation that is active when the call starts; a reload during the call
//! does not affect it. Callers that need several conversions against one
//! generation should take [`CodecRegistry::generation`] once and use it.

use std::sync::Arc;

use bindec_core::{NormalizedNode, NormalizedPath, TypeName, TypedObject, TypedPath};
use bindec_schema::SchemaIndex;

use crate::config::CodecConfig;
use crate::context::NodeCodecContext;
use crate::error::CodecError;
use crate::generation::{Generation, GenerationManager, GenerationToken};

#[derive(Debug)]
pub struct CodecRegistry {
    generations: GenerationManager,
}

impl CodecRegistry {
    pub fn new(index: SchemaIndex) -> Result<Self, CodecError> {
        Self::with_config(index, CodecConfig::default())
    }

    pub fn with_config(index: SchemaIndex, config: CodecConfig) -> Result<Self, CodecError> {
        Ok(Self {
            generations: GenerationManager::new(index, config)?,
        })
    }

    /// The active generation.
    pub fn generation(&self) -> Arc<Generation> {
        self.generations.current()
    }

    pub fn token(&self) -> GenerationToken {
        self.generations.token()
    }

    pub fn on_schema_reloaded(&self, index: SchemaIndex) -> Result<Arc<Generation>, CodecError> {
        self.generations.on_schema_reloaded(index)
    }

    pub fn codec_for(&self, ty: &TypeName) -> Result<Arc<NodeCodecContext>, CodecError> {
        self.generation().codec_for(ty)
    }

    pub fn to_normalized(
        &self,
        path: &TypedPath,
        object: &TypedObject,
    ) -> Result<(NormalizedPath, NormalizedNode), CodecError> {
        self.generation().to_normalized(path, object)
    }

    /// Encode a top-level object; its path is derived from its type and key.
    pub fn to_normalized_root(
        &self,
        object: &TypedObject,
    ) -> Result<(NormalizedPath, NormalizedNode), CodecError> {
        self.generation().to_normalized_root(object)
    }

    pub fn from_normalized(
        &self,
        path: &NormalizedPath,
        node: &NormalizedNode,
    ) -> Result<(TypedPath, TypedObject), CodecError> {
        self.generation().from_normalized(path, node)
    }

    pub fn from_normalized_optional(
        &self,
        path: &NormalizedPath,
        node: Option<&NormalizedNode>,
    ) -> Result<Option<TypedObject>, CodecError> {
        self.generation().from_normalized_optional(path, node)
    }

    pub fn to_normalized_path(&self, path: &TypedPath) -> Result<NormalizedPath, CodecError> {
        self.generation().to_normalized_path(path)
    }

    pub fn from_normalized_path(
        &self,
        path: &NormalizedPath,
        candidates: &[TypeName],
    ) -> Result<TypedPath, CodecError> {
        self.generation().from_normalized_path(path, candidates)
    }

    pub fn try_from_normalized_path(
        &self,
        path: &NormalizedPath,
        candidates: &[TypeName],
    ) -> Result<Option<TypedPath>, CodecError> {
        self.generation().try_from_normalized_path(path, candidates)
    }
}
