//! # Codec Tree
//!
//! The per-generation cache of node codec contexts, keyed by generated type.
//!
//! ## Key Design Principles
//!
//! 1. **Slots before contexts.** [`CodecTree::prototype`] registers a slot
//!    for a type without building anything. Contexts refer to their children
//!    through slots, so recursive schemas terminate.
//!
//! 2. **Lock-free reads.** A cache hit is a shard read on the slot map plus
//!    an atomic load in the slot.
//!
//! 3. **Immutable once published.** A published context is never replaced.
//!    The tree itself lives exactly as long as its generation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use bindec_core::{
    NormalizedNode, NormalizedPath, QName, TypeName, TypedObject, TypedPath, TypedPathArgument,
};
use bindec_schema::{LeafType, SchemaIndex, SchemaNodeKind};
use dashmap::DashMap;

use crate::config::CodecConfig;
use crate::context::{CodecPrototype, NodeCodecContext, PathChild, PathChildKind};
use crate::error::CodecError;
use crate::path::{self, ExtensionScope};
use crate::value::{self, ValueCodec};

/// Top-level types, by node name and by type.
#[derive(Debug, Default)]
struct RootContext {
    by_qname: HashMap<QName, TypeName>,
    by_type: HashMap<TypeName, PathChild>,
}

impl RootContext {
    fn build(index: &SchemaIndex) -> Result<Self, CodecError> {
        let mut roots = Self::default();
        for ty in index.roots() {
            let node = index
                .resolve_schema_node(ty)
                .ok_or_else(|| CodecError::mismatch(ty, "top-level type has no schema node"))?;
            let kind = match &node.kind {
                SchemaNodeKind::Container => PathChildKind::Container,
                SchemaNodeKind::List { key, .. } => PathChildKind::List {
                    keyed: !key.is_empty(),
                },
                other => {
                    return Err(CodecError::mismatch(
                        ty,
                        format!("a top-level {} cannot be addressed", other.name()),
                    ))
                }
            };
            roots.by_qname.insert(node.qname.clone(), ty.clone());
            roots
                .by_type
                .insert(ty.clone(), PathChild::direct(node.qname.clone(), kind));
        }
        Ok(roots)
    }
}

/// Node codec contexts for one generation.
#[derive(Debug)]
pub struct CodecTree {
    index: Arc<SchemaIndex>,
    config: CodecConfig,
    roots: RootContext,
    prototypes: DashMap<TypeName, Arc<CodecPrototype>>,
    constructed: AtomicUsize,
    self_ref: Weak<CodecTree>,
}

impl CodecTree {
    /// Build a tree over `index`. With `eager-prime` set, every reachable
    /// context is built here and a `SchemaMismatch` fails the whole tree.
    pub fn new(index: Arc<SchemaIndex>, config: CodecConfig) -> Result<Arc<Self>, CodecError> {
        let roots = RootContext::build(&index)?;
        let tree = Arc::new_cyclic(|self_ref| Self {
            index,
            config,
            roots,
            prototypes: DashMap::new(),
            constructed: AtomicUsize::new(0),
            self_ref: self_ref.clone(),
        });
        if tree.config.eager_prime {
            let primed = tree.prime()?;
            tracing::debug!(contexts = primed, "primed codec tree");
        }
        Ok(tree)
    }

    pub fn index(&self) -> &Arc<SchemaIndex> {
        &self.index
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub(crate) fn value_codec(&self, ty: &LeafType) -> Arc<dyn ValueCodec> {
        value::value_codec(ty, &self.index, &self.self_ref)
    }

    /// The slot for `ty`, registered on first request. Only types the schema
    /// describes get a slot.
    pub fn prototype(&self, ty: &TypeName) -> Result<Arc<CodecPrototype>, CodecError> {
        if let Some(existing) = self.prototypes.get(ty) {
            return Ok(Arc::clone(existing.value()));
        }
        if self.index.descriptor(ty).is_none() {
            return Err(CodecError::mismatch(ty, "no type descriptor"));
        }
        let slot = self
            .prototypes
            .entry(ty.clone())
            .or_insert_with(|| Arc::new(CodecPrototype::new(ty.clone())));
        Ok(Arc::clone(slot.value()))
    }

    /// The context for `ty`, building it on first use.
    pub fn context(&self, ty: &TypeName) -> Result<Arc<NodeCodecContext>, CodecError> {
        self.prototype(ty)?.get(self)
    }

    /// Build every context reachable from the roots. Returns how many
    /// contexts the walk visited.
    pub fn prime(&self) -> Result<usize, CodecError> {
        let mut pending: Vec<TypeName> = self.index.roots().to_vec();
        let mut seen: HashSet<TypeName> = pending.iter().cloned().collect();
        while let Some(ty) = pending.pop() {
            let ctx = self.context(&ty)?;
            for next in ctx.referenced_types() {
                if seen.insert(next.clone()) {
                    pending.push(next);
                }
            }
        }
        Ok(seen.len())
    }

    /// Context constructions performed, raced duplicates included.
    pub fn constructed_contexts(&self) -> usize {
        self.constructed.load(Ordering::Relaxed)
    }

    /// Contexts published in the cache.
    pub fn cached_contexts(&self) -> usize {
        self.prototypes.iter().filter(|slot| slot.is_built()).count()
    }

    pub(crate) fn record_construction(&self) {
        self.constructed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn root_child(&self, ty: &TypeName) -> Option<&PathChild> {
        self.roots.by_type.get(ty)
    }

    pub(crate) fn root_type(&self, name: &QName) -> Option<&TypeName> {
        self.roots.by_qname.get(name)
    }

    /// Encode `object`, addressed by `path`, into a normalized node.
    pub fn to_normalized(
        &self,
        path: &TypedPath,
        object: &TypedObject,
    ) -> Result<(NormalizedPath, NormalizedNode), CodecError> {
        let last = path
            .last()
            .ok_or_else(|| CodecError::unresolved(path, "an object needs a non-empty path"))?;
        if &last.ty != object.type_name() {
            return Err(CodecError::IncorrectNesting(format!(
                "path ends on {} but the object is a {}",
                last.ty,
                object.type_name()
            )));
        }
        let normalized_path = self.to_normalized_path(path)?;
        let ctx = self.context(&last.ty)?;
        let ctx = ctx.as_data_object()?;
        if let Some(key) = ctx.key_codec() {
            let addressed = last
                .key
                .as_ref()
                .ok_or_else(|| CodecError::unresolved(last, "a list entry must be addressed by key"))?;
            if key.encode_key(addressed)? != key.encode_key(&key.key_of(object)?)? {
                return Err(CodecError::unresolved(
                    last,
                    "path key does not match the key of the object",
                ));
            }
        }
        let node = ctx.encode_node(self, object)?;
        Ok((normalized_path, node))
    }

    /// Encode a top-level object, deriving its path from its type and key.
    pub fn to_normalized_root(
        &self,
        object: &TypedObject,
    ) -> Result<(NormalizedPath, NormalizedNode), CodecError> {
        let ty = object.type_name();
        if self.root_child(ty).is_none() {
            return Err(CodecError::unresolved(ty, "not a top-level type"));
        }
        let ctx = self.context(ty)?;
        let arg = match ctx.as_data_object()?.key_codec() {
            Some(key) => TypedPathArgument::keyed(ty.clone(), key.key_of(object)?),
            None => TypedPathArgument::item(ty.clone()),
        };
        self.to_normalized(&TypedPath::new().child(arg), object)
    }

    /// Decode `node`, addressed by `path`, into a typed path and object.
    pub fn from_normalized(
        &self,
        path: &NormalizedPath,
        node: &NormalizedNode,
    ) -> Result<(TypedPath, TypedObject), CodecError> {
        let resolved = path::normalized_to_typed(self, path, ExtensionScope::Any)?
            .ok_or_else(|| CodecError::unresolved(path, "path does not address a typed object"))?;
        let object = resolved.context.as_data_object()?.decode_node(self, node)?;
        Ok((resolved.path, object))
    }

    pub fn to_normalized_path(&self, path: &TypedPath) -> Result<NormalizedPath, CodecError> {
        path::typed_to_normalized(self, path)
    }

    pub fn from_normalized_path(
        &self,
        path: &NormalizedPath,
        scope: ExtensionScope<'_>,
    ) -> Result<TypedPath, CodecError> {
        self.try_from_normalized_path(path, scope)?
            .ok_or_else(|| CodecError::unresolved(path, "path has no typed equivalent"))
    }

    /// Like [`from_normalized_path`](Self::from_normalized_path), but a path
    /// ending on a leaf, leaf-set entry, choice or the root yields `None`.
    pub fn try_from_normalized_path(
        &self,
        path: &NormalizedPath,
        scope: ExtensionScope<'_>,
    ) -> Result<Option<TypedPath>, CodecError> {
        Ok(path::normalized_to_typed(self, path, scope)?.map(|resolved| resolved.path))
    }
}
