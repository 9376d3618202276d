//! # Generations
//!
//! A [`Generation`] pairs one schema index with the codec tree built over it.
//! The [`GenerationManager`] holds the active generation behind an atomic
//! pointer and swaps it wholesale when the schema is reloaded.
//!
//! ## Key Design Principles
//!
//! 1. **Never mutated.** A reload builds a complete new generation; the old
//!    one is left untouched and stays valid for every caller still holding it.
//!
//! 2. **Validated before publication.** A generation that fails to build is
//!    dropped and the previous one stays active.
//!
//! 3. **Serialized reloads, free reads.** Reloads take a mutex so tokens are
//!    published in order. Readers only load the pointer.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use bindec_core::{NormalizedNode, NormalizedPath, TypeName, TypedObject, TypedPath};
use bindec_schema::SchemaIndex;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::CodecConfig;
use crate::context::NodeCodecContext;
use crate::error::CodecError;
use crate::path::ExtensionScope;
use crate::tree::CodecTree;

/// Identifies one generation of a manager. Later generations compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// One immutable schema index and its codec tree.
#[derive(Debug)]
pub struct Generation {
    token: GenerationToken,
    tree: Arc<CodecTree>,
    path_cache: DashMap<TypedPath, NormalizedPath>,
    path_cache_capacity: usize,
}

impl Generation {
    fn build(
        token: GenerationToken,
        index: Arc<SchemaIndex>,
        config: &CodecConfig,
    ) -> Result<Self, CodecError> {
        let tree = CodecTree::new(index, config.clone())?;
        Ok(Self {
            token,
            tree,
            path_cache: DashMap::new(),
            path_cache_capacity: config.path_cache_capacity,
        })
    }

    pub fn token(&self) -> GenerationToken {
        self.token
    }

    pub fn index(&self) -> &Arc<SchemaIndex> {
        self.tree.index()
    }

    pub fn tree(&self) -> &Arc<CodecTree> {
        &self.tree
    }

    /// The context for `ty` in this generation.
    pub fn codec_for(&self, ty: &TypeName) -> Result<Arc<NodeCodecContext>, CodecError> {
        self.tree.context(ty)
    }

    pub fn to_normalized(
        &self,
        path: &TypedPath,
        object: &TypedObject,
    ) -> Result<(NormalizedPath, NormalizedNode), CodecError> {
        self.tree.to_normalized(path, object)
    }

    pub fn to_normalized_root(
        &self,
        object: &TypedObject,
    ) -> Result<(NormalizedPath, NormalizedNode), CodecError> {
        self.tree.to_normalized_root(object)
    }

    pub fn from_normalized(
        &self,
        path: &NormalizedPath,
        node: &NormalizedNode,
    ) -> Result<(TypedPath, TypedObject), CodecError> {
        self.tree.from_normalized(path, node)
    }

    /// Decode an optional read. An absent node decodes to `None`.
    pub fn from_normalized_optional(
        &self,
        path: &NormalizedPath,
        node: Option<&NormalizedNode>,
    ) -> Result<Option<TypedObject>, CodecError> {
        node.map(|node| self.from_normalized(path, node).map(|(_, object)| object))
            .transpose()
    }

    /// Translate a typed path, memoizing the result.
    pub fn to_normalized_path(&self, path: &TypedPath) -> Result<NormalizedPath, CodecError> {
        if let Some(cached) = self.path_cache.get(path) {
            return Ok(cached.value().clone());
        }
        let translated = self.tree.to_normalized_path(path)?;
        if self.path_cache.len() < self.path_cache_capacity {
            self.path_cache.insert(path.clone(), translated.clone());
        }
        Ok(translated)
    }

    /// Translate a normalized path. Only augmentations listed in `candidates`
    /// may be descended into.
    pub fn from_normalized_path(
        &self,
        path: &NormalizedPath,
        candidates: &[TypeName],
    ) -> Result<TypedPath, CodecError> {
        self.tree
            .from_normalized_path(path, ExtensionScope::Only(candidates))
    }

    pub fn try_from_normalized_path(
        &self,
        path: &NormalizedPath,
        candidates: &[TypeName],
    ) -> Result<Option<TypedPath>, CodecError> {
        self.tree
            .try_from_normalized_path(path, ExtensionScope::Only(candidates))
    }

    pub fn cached_paths(&self) -> usize {
        self.path_cache.len()
    }
}

/// Owns the active generation and replaces it on schema reload.
pub struct GenerationManager {
    current: ArcSwap<Generation>,
    next_token: AtomicU64,
    reload: Mutex<()>,
    config: CodecConfig,
}

impl GenerationManager {
    /// Build the first generation over `index`.
    pub fn new(index: SchemaIndex, config: CodecConfig) -> Result<Self, CodecError> {
        let first = Generation::build(GenerationToken(1), Arc::new(index), &config)?;
        tracing::debug!(
            generation = %first.token,
            contexts = first.tree.cached_contexts(),
            "published codec generation"
        );
        Ok(Self {
            current: ArcSwap::from_pointee(first),
            next_token: AtomicU64::new(2),
            reload: Mutex::new(()),
            config,
        })
    }

    /// The active generation. Callers may keep it for as long as they like.
    pub fn current(&self) -> Arc<Generation> {
        self.current.load_full()
    }

    pub fn token(&self) -> GenerationToken {
        self.current.load().token
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Build a generation over `index` and publish it. On failure the active
    /// generation is kept and the error is returned.
    pub fn on_schema_reloaded(&self, index: SchemaIndex) -> Result<Arc<Generation>, CodecError> {
        let _guard = self.reload.lock();
        let token = GenerationToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        let generation = match Generation::build(token, Arc::new(index), &self.config) {
            Ok(generation) => Arc::new(generation),
            Err(err) => {
                tracing::warn!(
                    generation = %token,
                    active = %self.token(),
                    error = %err,
                    "rejected schema reload; keeping active generation"
                );
                return Err(err);
            }
        };
        let previous = self.current.swap(Arc::clone(&generation));
        tracing::debug!(
            generation = %token,
            previous = %previous.token,
            contexts = generation.tree.cached_contexts(),
            "published codec generation"
        );
        Ok(generation)
    }
}

impl fmt::Debug for GenerationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationManager")
            .field("token", &self.token())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_order_and_display() {
        assert!(GenerationToken(2) > GenerationToken(1));
        assert_eq!(GenerationToken(3).to_string(), "g3");
        assert_eq!(GenerationToken(3).get(), 3);
    }

    #[test]
    fn empty_schema_builds_a_generation() {
        let manager =
            GenerationManager::new(SchemaIndex::builder().build().unwrap(), CodecConfig::default())
                .unwrap();
        assert_eq!(manager.token(), GenerationToken(1));
        let next = manager
            .on_schema_reloaded(SchemaIndex::builder().build().unwrap())
            .unwrap();
        assert_eq!(next.token(), GenerationToken(2));
        assert_eq!(manager.token(), GenerationToken(2));
    }
}
