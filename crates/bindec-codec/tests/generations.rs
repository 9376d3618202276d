//! Schema reloads, generation isolation and concurrent use of one generation.

mod common;

use std::sync::Arc;
use std::thread;

use bindec_codec::{CodecConfig, CodecError, CodecRegistry, CodecTree};
use bindec_core::{QName, TypedObject, TypedValue};
use bindec_schema::{SchemaIndex, SchemaPath, TypeDescriptor};
use common::*;

fn with_address(name: &str, address: &str) -> TypedObject {
    TypedObject::builder("Library")
        .field("name", name)
        .field("address", address)
        .build()
}

#[test]
fn old_generation_keeps_working_after_reload() {
    let registry = CodecRegistry::new(library_v1()).unwrap();
    let old = registry.generation();
    let before = library_with_books("city", vec![book(1, "a")]);

    let new = registry.on_schema_reloaded(library_v2()).unwrap();
    assert!(new.token() > old.token());
    assert_eq!(registry.token(), new.token());

    // The old generation still converts against the old schema.
    let (path, node) = old.to_normalized_root(&before).unwrap();
    assert_eq!(old.from_normalized(&path, &node).unwrap().1, before);

    // The new leaf only exists in the new generation.
    let after = with_address("city", "1 Main St");
    let (path, node) = new.to_normalized_root(&after).unwrap();
    assert_eq!(new.from_normalized(&path, &node).unwrap().1, after);
    let (_, old_node) = old.to_normalized_root(&after).unwrap();
    assert_ne!(old_node, node);
    assert!(matches!(
        old.from_normalized(&path, &node),
        Ok((_, decoded)) if decoded.get("address").is_none()
    ));

    // Objects built for the old schema also round-trip through the new one.
    let (path, node) = new.to_normalized_root(&before).unwrap();
    assert_eq!(new.from_normalized(&path, &node).unwrap().1, before);
}

#[test]
fn failed_reload_keeps_active_generation() {
    let registry = CodecRegistry::new(library_v1()).unwrap();
    let token = registry.token();
    assert_eq!(token.get(), 1);

    let ghost = QName::new("urn:example:ghost", "ghost");
    let broken = SchemaIndex::builder()
        .descriptor(TypeDescriptor::new("Ghost", SchemaPath::from_names(vec![ghost])))
        .root("Ghost")
        .build()
        .unwrap();
    let err = registry.on_schema_reloaded(broken).unwrap_err();
    assert!(matches!(err, CodecError::SchemaMismatch { .. }), "{err}");
    assert_eq!(registry.token(), token);

    let library = TypedObject::builder("Library").field("name", "bar").build();
    assert!(registry.to_normalized_root(&library).is_ok());
}

#[test]
fn eager_priming_builds_every_reachable_context() {
    let registry = CodecRegistry::new(library_v1()).unwrap();
    let tree = Arc::clone(registry.generation().tree());
    // Library, Book, Availability, OnShelf, OnLoan, Loan, Note, Branch, LibraryStats.
    assert_eq!(tree.cached_contexts(), 9);
    assert_eq!(tree.constructed_contexts(), 9);

    let library = library_with_books("city", vec![detailed_book()]);
    registry.to_normalized_root(&library).unwrap();
    assert_eq!(tree.constructed_contexts(), 9);
}

#[test]
fn concurrent_callers_share_one_context_per_type() {
    let config = CodecConfig {
        eager_prime: false,
        ..CodecConfig::default()
    };
    let tree = CodecTree::new(Arc::new(library_v1()), config).unwrap();
    assert_eq!(tree.cached_contexts(), 0);

    let library = library_with_books("city", vec![detailed_book(), book(2, "b")]);
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let (path, node) = tree.to_normalized_root(&library).unwrap();
                    let (_, decoded) = tree.from_normalized(&path, &node).unwrap();
                    (node, decoded)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let (first_node, _) = &results[0];
    for (node, decoded) in &results {
        assert_eq!(node, first_node);
        assert_eq!(decoded, &library);
    }
    let cached = tree.cached_contexts();
    assert!(tree.constructed_contexts() >= cached);
    assert_eq!(tree.prime().unwrap(), 9);
    assert_eq!(tree.cached_contexts(), 9);
}

#[test]
fn readers_are_not_disturbed_by_reloads() {
    let registry = CodecRegistry::new(library_v1()).unwrap();
    let library = TypedObject::builder("Library")
        .field("name", "bar")
        .field("rating", TypedValue::union("uint16", TypedValue::Uint(5)))
        .build();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let generation = registry.generation();
                    let (path, node) = generation.to_normalized_root(&library).unwrap();
                    let (_, decoded) = generation.from_normalized(&path, &node).unwrap();
                    assert_eq!(decoded, library);
                }
            });
        }
        scope.spawn(|| {
            for i in 0..10 {
                let index = if i % 2 == 0 { library_v2() } else { library_v1() };
                registry.on_schema_reloaded(index).unwrap();
            }
        });
    });
    assert_eq!(registry.token().get(), 11);
}
