//! Document loading tests.

use std::io::Write;

use tracing_subscriber::EnvFilter;
use xmlsel_core::{Document, Error, NodeKind, TreeBuilder, TreeDebug, TreeFormatOptions, TreeStyle};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_from_file() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write!(
        file,
        "<?xml version='1.0' encoding='UTF-8'?>\n<catalog><book id='b1'>Dune</book></catalog>\n"
    )
    .expect("Failed to write temp file");

    let doc = Document::from_file(file.path()).expect("Failed to load document");
    let catalog = doc.document_element().expect("document element");
    assert_eq!(doc.element_name(catalog), Some("catalog"));

    let book = doc.first_element_child(catalog).expect("book element");
    assert_eq!(doc.attribute(book, "id"), Some("b1"));
    assert_eq!(doc.text_content(book), "Dune");
}

#[test]
fn test_from_missing_file() {
    init_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("missing.xml");

    let err = Document::from_file(&path).unwrap_err();
    match err {
        Error::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_malformed_documents() {
    init_tracing();
    assert!(matches!(
        Document::parse_str("<a><b></a>"),
        Err(Error::MismatchedEndTag { ref expected, ref found }) if expected == "b" && found == "a"
    ));
    assert!(matches!(
        Document::parse_str("<a><b>"),
        Err(Error::UnclosedElement { ref name }) if name == "b"
    ));
    assert!(matches!(
        Document::parse_str("<a/><b/>"),
        Err(Error::MultipleDocumentElements { ref name }) if name == "b"
    ));
    assert!(matches!(
        Document::parse_str("<!-- nothing -->"),
        Err(Error::MissingDocumentElement)
    ));
    assert!(matches!(Document::parse_str("text<a/>"), Err(Error::TextOutsideRoot)));
}

#[test]
fn test_builder_matches_parser() {
    init_tracing();
    let mut builder = TreeBuilder::new();
    builder
        .start_element("list", vec![])
        .expect("Failed to open list");
    builder
        .empty_element("item", vec![])
        .expect("Failed to add item");
    builder.text("tail").expect("Failed to add text");
    builder.end_element("list").expect("Failed to close list");
    let built = builder.finish().expect("Failed to finish document");

    let parsed = Document::parse_str("<list><item/>tail</list>").expect("Failed to parse");

    let render = |doc: &Document| {
        TreeDebug::new(doc)
            .with_options(TreeFormatOptions {
                style: TreeStyle::Ascii,
                ..TreeFormatOptions::default()
            })
            .to_string()
    };
    assert_eq!(render(&built), render(&parsed));
}

#[test]
fn test_document_order_and_kinds() {
    init_tracing();
    let doc = Document::parse_str("<r><a/><!--c--><b><?p d?></b><![CDATA[x]]></r>")
        .expect("Failed to parse");
    let labels: Vec<_> = doc
        .descendants(doc.document_node())
        .map(|id| match doc.kind(id) {
            NodeKind::Element(element) => element.name.to_string(),
            other => other.label().to_string(),
        })
        .collect();
    assert_eq!(labels, ["r", "a", "comment", "b", "pi", "cdata"]);

    let mut ids: Vec<_> = doc.descendants(doc.document_node()).collect();
    ids.reverse();
    doc.sort_in_document_order(&mut ids);
    let orders: Vec<_> = ids.iter().map(|&id| doc.order(id)).collect();
    assert!(orders.windows(2).all(|w| w[0] < w[1]));
}
