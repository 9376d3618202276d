//! Typed object ↔ normalized node conversions against the library schema.

mod common;

use bindec_codec::{CodecConfig, CodecError, CodecRegistry};
use bindec_core::{
    ContainerNode, KeyPredicates, LeafNode, ListOrdering, MapEntryNode, NormalizedNode,
    NormalizedPath, NormalizedValue, PathArgument, TypedKey, TypedObject, TypedPath,
    TypedPathArgument, TypedValue,
};
use common::*;
use proptest::prelude::*;

fn registry() -> CodecRegistry {
    CodecRegistry::new(library_v1()).unwrap()
}

fn round_trip(registry: &CodecRegistry, object: &TypedObject) -> TypedObject {
    let (path, node) = registry.to_normalized_root(object).unwrap();
    let (typed_path, decoded) = registry.from_normalized(&path, &node).unwrap();
    assert_eq!(typed_path.last().map(|a| &a.ty), Some(object.type_name()));
    decoded
}

#[test]
fn single_string_leaf_container() {
    let registry = registry();
    let library = TypedObject::builder("Library").field("name", "bar").build();

    let (path, node) = registry.to_normalized_root(&library).unwrap();
    assert_eq!(path, NormalizedPath::from_args(vec![PathArgument::node(lib("library"))]));
    assert_eq!(
        node,
        NormalizedNode::Container(
            ContainerNode::new(lib("library"))
                .with_child(NormalizedNode::Leaf(LeafNode::new(lib("name"), "bar")))
        )
    );

    let (typed_path, decoded) = registry.from_normalized(&path, &node).unwrap();
    assert_eq!(typed_path, library_path());
    assert_eq!(decoded, library);
}

#[test]
fn user_ordered_entries_keep_their_order() {
    let registry = registry();
    let library = library_with_books("city", vec![book(1, "a"), book(2, "b"), book(3, "c")]);

    let (_, node) = registry.to_normalized_root(&library).unwrap();
    let NormalizedNode::Container(container) = &node else {
        panic!("expected a container, got {node:?}");
    };
    let Some(NormalizedNode::Map(map)) = container.children.get(&lib("book")) else {
        panic!("expected a map child");
    };
    assert_eq!(map.ordering, ListOrdering::User);
    let keys: Vec<_> = map
        .entries()
        .iter()
        .map(|e| e.key.get(&lib("isbn")).cloned())
        .collect();
    assert_eq!(
        keys,
        [1u32, 2, 3].map(|k| Some(NormalizedValue::Uint32(k))).to_vec()
    );

    let decoded = round_trip(&registry, &library);
    let Some(TypedValue::List(books)) = decoded.get("book") else {
        panic!("expected a book list");
    };
    let isbns: Vec<_> = books.iter().map(|b| b.get("isbn").cloned()).collect();
    assert_eq!(isbns, [1u64, 2, 3].map(|k| Some(TypedValue::Uint(k))).to_vec());
    assert_eq!(decoded, library);
}

#[test]
fn ambiguous_union_value_resolves_to_first_accepting_member() {
    let registry = registry();
    let node = NormalizedNode::Container(
        ContainerNode::new(lib("library"))
            .with_child(NormalizedNode::Leaf(LeafNode::new(lib("rating"), "30"))),
    );
    let path = NormalizedPath::from_args(vec![PathArgument::node(lib("library"))]);

    for _ in 0..3 {
        let (_, decoded) = registry.from_normalized(&path, &node).unwrap();
        assert_eq!(
            decoded.get("rating"),
            Some(&TypedValue::union("uint16", TypedValue::Uint(30)))
        );
    }

    let crime = TypedObject::builder("Library")
        .field("rating", TypedValue::union("identityref", TypedValue::Identity("Crime".into())))
        .build();
    let (_, node) = registry.to_normalized_root(&crime).unwrap();
    let rating = node.data_children().and_then(|c| c.get(&lib("rating")));
    assert_eq!(
        rating,
        Some(&NormalizedNode::Leaf(LeafNode {
            name: lib("rating"),
            value: NormalizedValue::Identity(lib("crime")),
        }))
    );
    assert_eq!(round_trip(&registry, &crime), crime);
}

#[test]
fn augmentation_children_round_trip() {
    let registry = registry();
    let library = TypedObject::builder("Library")
        .field("name", "city")
        .augmentation(TypedObject::builder("LibraryStats").field("extra", 42u64).build())
        .build();

    let (_, node) = registry.to_normalized_root(&library).unwrap();
    let children = node.data_children().unwrap();
    assert_eq!(
        children.get(&ext("extra")),
        Some(&NormalizedNode::Leaf(LeafNode::new(ext("extra"), 42u32)))
    );

    let decoded = round_trip(&registry, &library);
    assert_eq!(decoded.get("name"), Some(&TypedValue::from("city")));
    let stats = decoded.augmentation(&"LibraryStats".into()).unwrap();
    assert_eq!(stats.get("extra"), Some(&TypedValue::Uint(42)));
    assert_eq!(decoded, library);
}

#[test]
fn every_leaf_kind_and_choice_round_trip() {
    let registry = registry();
    let library = library_with_books("city", vec![detailed_book(), book(2, "b")]);
    assert_eq!(round_trip(&registry, &library), library);

    let on_shelf = TypedObject::builder("Book")
        .field("isbn", 3u64)
        .field(
            "availability",
            TypedObject::builder("OnShelf").field("shelf", "B-12").build(),
        )
        .build();
    let library = library_with_books("city", vec![on_shelf]);
    assert_eq!(round_trip(&registry, &library), library);
}

#[test]
fn list_entry_addressed_by_path() {
    let registry = registry();
    let entry = detailed_book();

    let (path, node) = registry.to_normalized(&book_path(1), &entry).unwrap();
    let NormalizedNode::MapEntry(encoded) = &node else {
        panic!("expected a map entry, got {node:?}");
    };
    assert_eq!(encoded.key, KeyPredicates::new().with(lib("isbn"), 1u32));
    assert_eq!(path.args().len(), 3);

    let (typed_path, decoded) = registry.from_normalized(&path, &node).unwrap();
    assert_eq!(typed_path, book_path(1));
    assert_eq!(decoded, entry);
}

#[test]
fn path_key_must_match_object_key() {
    let registry = registry();
    let err = registry.to_normalized(&book_path(9), &book(1, "a")).unwrap_err();
    assert!(matches!(err, CodecError::UnresolvedPathStep { .. }), "{err}");
}

#[test]
fn key_leaves_are_restored_from_predicates() {
    let registry = registry();
    let entry = MapEntryNode::new(lib("book"), KeyPredicates::new().with(lib("isbn"), 7u32))
        .with_child(NormalizedNode::Leaf(LeafNode::new(lib("title"), "t")));
    let path = NormalizedPath::from_args(vec![
        PathArgument::node(lib("library")),
        PathArgument::node(lib("book")),
        PathArgument::entry(lib("book"), entry.key.clone()),
    ]);
    let (_, decoded) = registry
        .from_normalized(&path, &NormalizedNode::MapEntry(entry))
        .unwrap();
    assert_eq!(decoded, book(7, "t"));
}

#[test]
fn top_level_multi_key_list() {
    let registry = registry();
    let branch = TypedObject::builder("Branch")
        .field("city", "oslo")
        .field("code", 4u64)
        .field(
            "openingDay",
            TypedValue::LeafList(vec![TypedValue::Enum("Monday".into()), TypedValue::Enum("Friday".into())]),
        )
        .build();

    let (path, node) = registry.to_normalized_root(&branch).unwrap();
    assert_eq!(
        path.last(),
        Some(&PathArgument::entry(
            lib("branch"),
            KeyPredicates::new().with(lib("city"), "oslo").with(lib("code"), 4u8)
        ))
    );
    let (typed_path, decoded) = registry.from_normalized(&path, &node).unwrap();
    assert_eq!(
        typed_path,
        TypedPath::new().child(TypedPathArgument::keyed(
            "Branch",
            TypedKey::new().with("city", "oslo").with("code", 4u64)
        ))
    );
    assert_eq!(decoded, branch);
}

#[test]
fn unkeyed_list_keeps_entry_order() {
    let registry = registry();
    let notes: Vec<_> = ["first", "second", "first"]
        .into_iter()
        .map(|t| TypedObject::builder("Note").field("text", t).build())
        .collect();
    let library = TypedObject::builder("Library")
        .field("note", TypedValue::List(notes))
        .build();

    let (_, node) = registry.to_normalized_root(&library).unwrap();
    let Some(NormalizedNode::UnkeyedList(list)) = node.data_children().and_then(|c| c.get(&lib("note")))
    else {
        panic!("expected an unkeyed list");
    };
    assert_eq!(list.entries.len(), 3);
    assert_eq!(round_trip(&registry, &library), library);
}

#[test]
fn invalid_values_are_rejected() {
    let registry = registry();

    let bad_symbol = library_with_books(
        "x",
        vec![TypedObject::builder("Book")
            .field("isbn", 1u64)
            .field("format", TypedValue::Enum("Scroll".into()))
            .build()],
    );
    assert!(matches!(
        registry.to_normalized_root(&bad_symbol),
        Err(CodecError::InvalidSymbol { .. })
    ));

    let no_key = library_with_books("x", vec![TypedObject::builder("Book").field("title", "t").build()]);
    assert!(matches!(
        registry.to_normalized_root(&no_key),
        Err(CodecError::MissingKey { .. })
    ));

    let unknown_genre = library_with_books(
        "x",
        vec![TypedObject::builder("Book")
            .field("isbn", 1u64)
            .field("genre", TypedValue::Identity("Opera".into()))
            .build()],
    );
    assert!(matches!(
        registry.to_normalized_root(&unknown_genre),
        Err(CodecError::UnknownIdentity(_))
    ));

    let no_member = TypedObject::builder("Library")
        .field("rating", TypedValue::Uint(70_000))
        .build();
    assert!(matches!(
        registry.to_normalized_root(&no_member),
        Err(CodecError::UnresolvedUnionValue { .. })
    ));
}

#[test]
fn unknown_children_follow_strictness() {
    let lenient = registry();
    let library = TypedObject::builder("Library")
        .field("name", "x")
        .field("bogus", "y")
        .build();
    let decoded = round_trip(&lenient, &library);
    assert_eq!(decoded, TypedObject::builder("Library").field("name", "x").build());

    let strict = CodecRegistry::with_config(
        library_v1(),
        CodecConfig {
            strict_children: true,
            ..CodecConfig::default()
        },
    )
    .unwrap();
    assert!(matches!(
        strict.to_normalized_root(&library),
        Err(CodecError::IncorrectNesting(_))
    ));

    let stray = NormalizedNode::Container(
        ContainerNode::new(lib("library"))
            .with_child(NormalizedNode::Leaf(LeafNode::new(lib("stray"), "z"))),
    );
    let path = NormalizedPath::from_args(vec![PathArgument::node(lib("library"))]);
    assert!(lenient.from_normalized(&path, &stray).is_ok());
    assert!(matches!(
        strict.from_normalized(&path, &stray),
        Err(CodecError::IncorrectNesting(_))
    ));
}

#[test]
fn optional_decode() {
    let registry = registry();
    let path = NormalizedPath::from_args(vec![PathArgument::node(lib("library"))]);
    assert_eq!(registry.from_normalized_optional(&path, None).unwrap(), None);

    let library = TypedObject::builder("Library").field("name", "bar").build();
    let (_, node) = registry.to_normalized_root(&library).unwrap();
    assert_eq!(
        registry.from_normalized_optional(&path, Some(&node)).unwrap(),
        Some(library)
    );
}

proptest! {
    #[test]
    fn user_ordered_books_round_trip_in_any_order(
        isbns in prop::collection::btree_set(0u64..100_000, 1..12)
            .prop_map(|s| s.into_iter().collect::<Vec<_>>())
            .prop_shuffle()
    ) {
        let registry = registry();
        let books: Vec<_> = isbns.iter().map(|&i| book(i, "t")).collect();
        let library = library_with_books("p", books);
        let decoded = round_trip(&registry, &library);
        let Some(TypedValue::List(decoded_books)) = decoded.get("book") else {
            panic!("expected a book list");
        };
        let order: Vec<_> = decoded_books.iter().map(|b| b.get("isbn").cloned()).collect();
        let expected: Vec<_> = isbns.iter().map(|&i| Some(TypedValue::Uint(i))).collect();
        prop_assert_eq!(order, expected);
    }
}
