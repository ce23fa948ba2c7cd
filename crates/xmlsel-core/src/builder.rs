//! Building documents from XML text or from a stream of events.
//!
//! # Parsing XML
//!
//! ```ignore
//! use xmlsel_core::Document;
//!
//! let doc = Document::parse_str("<book><title>Rust</title></book>")?;
//! let root = doc.document_element().unwrap();
//! assert_eq!(doc.element_name(root), Some("book"));
//! ```
//!
//! # Building by hand
//!
//! ```ignore
//! use xmlsel_core::{Attribute, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new();
//! builder.start_element("list", vec![Attribute::new("id", "main")])?;
//! builder.empty_element("item", vec![])?;
//! builder.end_element("list")?;
//! let doc = builder.finish()?;
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::document::Document;
use crate::logging::targets;
use crate::node::{Attribute, Element, NodeId, NodeKind, QName};
use crate::{Error, Result};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Options controlling how XML text becomes a tree.
///
/// The defaults keep every node exactly as written, which is what selector
/// matching expects (whitespace-only text still counts as content).
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Trim leading and trailing whitespace from text, dropping text that becomes empty.
    pub trim_text: bool,
    /// Keep comment nodes.
    pub keep_comments: bool,
    /// Keep processing instruction nodes.
    pub keep_processing_instructions: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            trim_text: false,
            keep_comments: true,
            keep_processing_instructions: true,
        }
    }
}

/// Incremental document construction.
///
/// Events must arrive in document order. The builder checks that end tags
/// match and that exactly one document element is produced.
pub struct TreeBuilder {
    doc: Document,
    open: Vec<NodeId>,
    scopes: Vec<Vec<(String, String)>>,
}

impl TreeBuilder {
    /// Create a builder for an empty document.
    pub fn new() -> Self {
        Self {
            doc: Document::empty(),
            open: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.doc.document_node())
    }

    /// Open an element. It becomes the parent of everything up to its end tag.
    pub fn start_element(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<NodeId> {
        let id = self.insert_element(name, attributes)?;
        self.open.push(id);
        Ok(id)
    }

    /// Add an element with no content (`<name/>`).
    pub fn empty_element(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<NodeId> {
        let id = self.insert_element(name, attributes)?;
        self.scopes.pop();
        Ok(id)
    }

    fn insert_element(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<NodeId> {
        if self.open.is_empty() && self.doc.document_element().is_some() {
            return Err(Error::MultipleDocumentElements {
                name: name.to_string(),
            });
        }

        let declared = attributes
            .iter()
            .filter(|a| a.is_namespace_declaration())
            .map(|a| {
                let prefix = a.name.prefix().map(|_| a.name.local()).unwrap_or("");
                (prefix.to_string(), a.value.clone())
            })
            .collect();
        self.scopes.push(declared);

        let name = QName::new(name);
        let namespace = self.resolve(name.prefix().unwrap_or(""));
        let element = Element {
            name,
            namespace,
            attributes,
        };

        let parent = self.current();
        let id = self.doc.append(parent, NodeKind::Element(element));
        if self.open.is_empty() {
            self.doc.set_document_element(id);
        }
        Ok(id)
    }

    /// Resolve a prefix against the declarations currently in scope.
    fn resolve(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE.to_string());
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(declared, _)| declared == prefix)
            .and_then(|(_, uri)| (!uri.is_empty()).then(|| uri.clone()))
    }

    /// Close the innermost open element.
    pub fn end_element(&mut self, name: &str) -> Result<()> {
        let Some(open) = self.open.pop() else {
            return Err(Error::UnexpectedEndTag {
                name: name.to_string(),
            });
        };
        let expected = self.doc.element_name(open).unwrap_or_default();
        if expected != name {
            return Err(Error::mismatched_end_tag(expected, name));
        }
        self.scopes.pop();
        Ok(())
    }

    /// Add character data. Whitespace between top-level nodes is dropped.
    pub fn text(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if text.is_empty() {
            return Ok(());
        }
        if self.open.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(Error::TextOutsideRoot);
        }
        let parent = self.current();
        self.doc.append(parent, NodeKind::Text(text));
        Ok(())
    }

    /// Add a CDATA section.
    pub fn cdata(&mut self, text: impl Into<String>) -> Result<()> {
        if self.open.is_empty() {
            return Err(Error::TextOutsideRoot);
        }
        let parent = self.current();
        self.doc.append(parent, NodeKind::CData(text.into()));
        Ok(())
    }

    /// Add a comment.
    pub fn comment(&mut self, text: impl Into<String>) {
        let parent = self.current();
        self.doc.append(parent, NodeKind::Comment(text.into()));
    }

    /// Add a processing instruction.
    pub fn processing_instruction(&mut self, target: impl Into<String>, data: Option<String>) {
        let parent = self.current();
        self.doc.append(
            parent,
            NodeKind::ProcessingInstruction {
                target: target.into(),
                data,
            },
        );
    }

    /// Finish building and return the document.
    pub fn finish(self) -> Result<Document> {
        if let Some(&open) = self.open.last() {
            return Err(Error::UnclosedElement {
                name: self.doc.element_name(open).unwrap_or_default().to_string(),
            });
        }
        if self.doc.document_element().is_none() {
            return Err(Error::MissingDocumentElement);
        }
        tracing::debug!(target: targets::BUILDER, nodes = self.doc.len(), "document built");
        Ok(self.doc)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Parse XML text with default options.
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::parse_str_with(xml, &ParseOptions::default())
    }

    /// Parse XML text.
    pub fn parse_str_with(xml: &str, options: &ParseOptions) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        parse_document(&mut reader, options)
    }

    /// Parse XML from any buffered reader with default options.
    pub fn parse_reader<R: BufRead>(source: R) -> Result<Self> {
        Self::parse_reader_with(source, &ParseOptions::default())
    }

    /// Parse XML from any buffered reader.
    pub fn parse_reader_with<R: BufRead>(source: R, options: &ParseOptions) -> Result<Self> {
        let mut reader = Reader::from_reader(source);
        parse_document(&mut reader, options)
    }

    /// Read and parse an XML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::parse_reader(BufReader::new(file))
    }
}

/// Drive a quick-xml reader through a [`TreeBuilder`].
fn parse_document<R: BufRead>(reader: &mut Reader<R>, options: &ParseOptions) -> Result<Document> {
    let config = reader.config_mut();
    config.trim_text(options.trim_text);
    config.check_end_names = false;

    let mut builder = TreeBuilder::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::syntax(reader.error_position() as u64, e.to_string()))?;

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                let name = decode_name(&start);
                let attributes = read_attributes(&start, reader.buffer_position() as u64)?;
                builder.start_element(&name, attributes)?;
            }
            Event::Empty(empty) => {
                let name = decode_name(&empty);
                let attributes = read_attributes(&empty, reader.buffer_position() as u64)?;
                builder.empty_element(&name, attributes)?;
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).to_string();
                builder.end_element(&name)?;
            }
            Event::Text(text) => {
                let content = text
                    .unescape()
                    .map_err(|e| Error::syntax(reader.buffer_position() as u64, e.to_string()))?;
                builder.text(content.into_owned())?;
            }
            Event::CData(cdata) => {
                builder.cdata(String::from_utf8_lossy(&cdata).to_string())?;
            }
            Event::Comment(comment) => {
                if options.keep_comments {
                    builder.comment(String::from_utf8_lossy(&comment).to_string());
                }
            }
            Event::PI(pi) => {
                if options.keep_processing_instructions {
                    let content = String::from_utf8_lossy(&pi).to_string();
                    let mut parts = content.splitn(2, char::is_whitespace);
                    let target = parts.next().unwrap_or_default().to_string();
                    let data = parts.next().map(|d| d.trim_start().to_string());
                    builder.processing_instruction(target, data);
                }
            }
            Event::Decl(_) | Event::DocType(_) => {}
        }
    }

    builder.finish()
}

fn decode_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).to_string()
}

fn read_attributes(start: &BytesStart<'_>, position: u64) -> Result<Vec<Attribute>> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::syntax(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::syntax(position, e.to_string()))?;
        attributes.push(Attribute::new(key, value.into_owned()));
    }
    Ok(attributes)
}
