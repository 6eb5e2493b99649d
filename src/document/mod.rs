//! TTML document tree
//!
//! An owned XML tree plus the base URI used to resolve relative resource
//! references. Parsing and indented serialization are backed by quick-xml.

pub mod model;
pub(crate) mod parser;
pub mod query;
pub(crate) mod writer;

use std::path::Path;
use url::Url;

pub use model::{Attribute, Element, Node, QName};
pub use query::{AttributePattern, DocumentQuery, ElementMatch, ElementPattern};

use crate::error::{Result, TtmlError};

/// A parsed TTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtmlDocument {
    pub root: Element,
    pub base_uri: Option<Url>,
}

impl TtmlDocument {
    /// Parse a document from XML source.
    pub fn parse(xml: &str, base_uri: Option<Url>) -> Result<Self> {
        let root = parser::parse_root(xml)?;
        Ok(Self { root, base_uri })
    }

    /// Read and parse a file; the base URI becomes the file's absolute `file:` URL.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let absolute = std::fs::canonicalize(path)?;
        let base_uri = Url::from_file_path(&absolute).map_err(|_| {
            TtmlError::ResourceResolution {
                reference: path.display().to_string(),
                reason: "path cannot be expressed as a file URL".to_string(),
            }
        })?;
        tracing::debug!("Loaded TTML document {}", base_uri);
        Self::parse(&xml, Some(base_uri))
    }

    pub fn with_base_uri(mut self, base_uri: Url) -> Self {
        self.base_uri = Some(base_uri);
        self
    }

    /// Raw `xml:lang` of the root element, empty when absent.
    pub fn language(&self) -> &str {
        self.root.attribute("xml:lang").unwrap_or("")
    }

    /// Every namespace URI declared anywhere in the document, first occurrence wins.
    pub fn declared_namespaces(&self) -> Vec<String> {
        let mut namespaces = Vec::new();
        collect_namespaces(&self.root, &mut namespaces);
        namespaces
    }

    /// Serialize to UTF-8 bytes with an XML declaration, indenting `indent`
    /// spaces per nesting level.
    pub fn to_pretty_bytes(&self, indent: usize) -> Result<Vec<u8>> {
        writer::write_pretty(&self.root, indent)
    }
}

fn collect_namespaces(element: &Element, namespaces: &mut Vec<String>) {
    for (_, uri) in element.namespace_declarations() {
        if !namespaces.iter().any(|n| n == uri) {
            namespaces.push(uri.to_string());
        }
    }
    for child in element.child_elements() {
        collect_namespaces(child, namespaces);
    }
}
