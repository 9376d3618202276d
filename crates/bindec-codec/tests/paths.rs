//! Typed path ↔ normalized path translation.

mod common;

use bindec_codec::{CodecError, CodecRegistry};
use bindec_core::{
    KeyPredicates, NormalizedPath, NormalizedValue, PathArgument, TypeName, TypedPath,
    TypedPathArgument,
};
use common::*;

fn registry() -> CodecRegistry {
    CodecRegistry::new(library_v1()).unwrap()
}

fn normalized(args: Vec<PathArgument>) -> NormalizedPath {
    NormalizedPath::from_args(args)
}

#[test]
fn keyed_entry_emits_list_and_entry_steps() {
    let registry = registry();
    let path = registry.to_normalized_path(&book_path(2)).unwrap();
    assert_eq!(
        path,
        normalized(vec![
            PathArgument::node(lib("library")),
            PathArgument::node(lib("book")),
            PathArgument::entry(lib("book"), KeyPredicates::new().with(lib("isbn"), 2u32)),
        ])
    );
    assert_eq!(registry.from_normalized_path(&path, &[]).unwrap(), book_path(2));
}

#[test]
fn key_predicates_decode_from_lexical_values() {
    let registry = registry();
    let path = normalized(vec![
        PathArgument::node(lib("library")),
        PathArgument::node(lib("book")),
        PathArgument::entry(lib("book"), KeyPredicates::new().with(lib("isbn"), "2")),
    ]);
    assert_eq!(registry.from_normalized_path(&path, &[]).unwrap(), book_path(2));
}

#[test]
fn wildcard_only_as_last_step() {
    let registry = registry();
    let all_books = library_path().child(TypedPathArgument::item("Book"));
    let path = registry.to_normalized_path(&all_books).unwrap();
    assert_eq!(path.last(), Some(&PathArgument::node(lib("book"))));
    assert_eq!(registry.from_normalized_path(&path, &[]).unwrap(), all_books);

    let through_wildcard = all_books.child(TypedPathArgument::item("Loan"));
    assert!(matches!(
        registry.to_normalized_path(&through_wildcard),
        Err(CodecError::UnresolvedPathStep { .. })
    ));
}

#[test]
fn choice_is_a_normalized_step_and_a_typed_case() {
    let registry = registry();
    let loan = book_path(1).child(TypedPathArgument::item("Loan").in_case("OnLoan"));
    let path = registry.to_normalized_path(&loan).unwrap();
    assert_eq!(
        &path.args()[3..],
        &[
            PathArgument::node(lib("availability")),
            PathArgument::node(lib("loan")),
        ]
    );
    assert_eq!(registry.from_normalized_path(&path, &[]).unwrap(), loan);

    // The case is optional on the way in and always recovered on the way out.
    let without_case = book_path(1).child(TypedPathArgument::item("Loan"));
    assert_eq!(registry.to_normalized_path(&without_case).unwrap(), path);

    let wrong_case = book_path(1).child(TypedPathArgument::item("Loan").in_case("OnShelf"));
    assert!(matches!(
        registry.to_normalized_path(&wrong_case),
        Err(CodecError::UnresolvedPathStep { .. })
    ));
}

#[test]
fn paths_without_typed_equivalent() {
    let registry = registry();
    let leaf = normalized(vec![
        PathArgument::node(lib("library")),
        PathArgument::node(lib("name")),
    ]);
    assert_eq!(registry.try_from_normalized_path(&leaf, &[]).unwrap(), None);
    assert!(matches!(
        registry.from_normalized_path(&leaf, &[]),
        Err(CodecError::UnresolvedPathStep { .. })
    ));

    let tag = book_path(1);
    let mut leaf_set_entry = registry.to_normalized_path(&tag).unwrap();
    leaf_set_entry.push(PathArgument::node(lib("tag")));
    leaf_set_entry.push(PathArgument::Value {
        name: lib("tag"),
        value: NormalizedValue::from("noir"),
    });
    assert_eq!(registry.try_from_normalized_path(&leaf_set_entry, &[]).unwrap(), None);

    let choice = registry
        .to_normalized_path(&book_path(1))
        .unwrap()
        .child(PathArgument::node(lib("availability")));
    assert_eq!(registry.try_from_normalized_path(&choice, &[]).unwrap(), None);

    let past_leaf = leaf.child(PathArgument::node(lib("title")));
    assert!(registry.try_from_normalized_path(&past_leaf, &[]).is_err());
}

#[test]
fn augmentation_steps_need_a_candidate() {
    let registry = registry();
    let extra = normalized(vec![
        PathArgument::node(lib("library")),
        PathArgument::node(ext("extra")),
    ]);
    assert!(matches!(
        registry.try_from_normalized_path(&extra, &[]),
        Err(CodecError::UnresolvedPathStep { .. })
    ));
    let candidates = [TypeName::from("LibraryStats")];
    assert_eq!(registry.try_from_normalized_path(&extra, &candidates).unwrap(), None);
}

#[test]
fn augmentation_typed_step_emits_nothing() {
    let registry = registry();
    let path = library_path().child(TypedPathArgument::item("LibraryStats"));
    assert_eq!(
        registry.to_normalized_path(&path).unwrap(),
        normalized(vec![PathArgument::node(lib("library"))])
    );
}

#[test]
fn unresolvable_steps() {
    let registry = registry();
    let unknown_root = TypedPath::new().child(TypedPathArgument::item("Book"));
    assert!(matches!(
        registry.to_normalized_path(&unknown_root),
        Err(CodecError::UnresolvedPathStep { .. })
    ));

    let unknown_child = normalized(vec![
        PathArgument::node(lib("library")),
        PathArgument::node(lib("missing")),
    ]);
    assert!(matches!(
        registry.from_normalized_path(&unknown_child, &[]),
        Err(CodecError::UnresolvedPathStep { .. })
    ));

    let into_unkeyed = library_path()
        .child(TypedPathArgument::item("Note"))
        .child(TypedPathArgument::item("Loan"));
    assert!(matches!(
        registry.to_normalized_path(&into_unkeyed),
        Err(CodecError::UnresolvedPathStep { .. })
    ));
}

#[test]
fn repeated_translations_hit_the_cache() {
    let registry = registry();
    let generation = registry.generation();
    assert_eq!(generation.cached_paths(), 0);
    let first = generation.to_normalized_path(&book_path(5)).unwrap();
    let second = generation.to_normalized_path(&book_path(5)).unwrap();
    assert_eq!(first, second);
    assert_eq!(generation.cached_paths(), 1);
}
