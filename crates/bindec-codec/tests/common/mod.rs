//! Shared fixtures for the codec integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::PathBuf;

use bindec_core::{Decimal64, QName, TypedKey, TypedObject, TypedPath, TypedPathArgument, TypedValue};
use bindec_schema::{load_path, SchemaIndex};

pub fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

pub fn load_schema(file: &str) -> SchemaIndex {
    let path = repo_root().join("schemas").join(file);
    load_path(&path).unwrap_or_else(|e| panic!("failed to load {}: {e}", path.display()))
}

pub fn library_v1() -> SchemaIndex {
    load_schema("library.schema.yaml")
}

pub fn library_v2() -> SchemaIndex {
    load_schema("library-v2.schema.yaml")
}

pub fn lib(local: &str) -> QName {
    QName::with_revision("urn:example:library", "2024-01-01", local)
}

pub fn ext(local: &str) -> QName {
    QName::new("urn:example:library-ext", local)
}

pub fn book(isbn: u64, title: &str) -> TypedObject {
    TypedObject::builder("Book")
        .field("isbn", isbn)
        .field("title", title)
        .build()
}

/// A book that exercises every leaf type the fixture declares.
pub fn detailed_book() -> TypedObject {
    let loan = TypedObject::builder("Loan").field("borrower", "ann").build();
    TypedObject::builder("Book")
        .field("isbn", 1u64)
        .field("title", "The Long Goodbye")
        .field("genre", TypedValue::Identity("Crime".into()))
        .field("format", TypedValue::Enum("EBook".into()))
        .field(
            "flags",
            TypedValue::Bits(BTreeSet::from(["signed".to_string(), "firstEdition".to_string()])),
        )
        .field("price", TypedValue::Decimal(Decimal64::new(1999, 2)))
        .field("cover", TypedValue::Binary(vec![0xde, 0xad, 0xbe, 0xef]))
        .field("tag", TypedValue::LeafList(vec!["noir".into(), "classic".into()]))
        .field("related", TypedValue::InstanceIdentifier(book_path(2)))
        .field(
            "availability",
            TypedObject::builder("OnLoan").field("loan", loan).build(),
        )
        .build()
}

pub fn library_with_books(name: &str, books: Vec<TypedObject>) -> TypedObject {
    TypedObject::builder("Library")
        .field("name", name)
        .field("book", TypedValue::List(books))
        .build()
}

pub fn library_path() -> TypedPath {
    TypedPath::new().child(TypedPathArgument::item("Library"))
}

pub fn book_path(isbn: u64) -> TypedPath {
    library_path().child(TypedPathArgument::keyed(
        "Book",
        TypedKey::new().with("isbn", isbn),
    ))
}
