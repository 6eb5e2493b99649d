//! Owned XML tree used for TTML documents.

use std::fmt;

/// Namespace bound to the reserved `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace bound to the reserved `xmlns` prefix
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A qualified XML name as written in the source (`prefix:local` or `local`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// Split a raw name at its first `:`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self {
                prefix: None,
                local: raw.to_string(),
            },
        }
    }

    /// True if this name is spelled exactly like `qualified`
    pub fn matches(&self, qualified: &str) -> bool {
        match (&self.prefix, qualified.split_once(':')) {
            (Some(prefix), Some((p, l))) => prefix == p && self.local == l,
            (None, None) => self.local == qualified,
            _ => false,
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// An attribute with its unescaped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QName::parse(name),
            value: value.into(),
        }
    }

    /// If this attribute declares a namespace, returns `(prefix, uri)`.
    /// The default namespace (`xmlns="..."`) has no prefix.
    pub fn namespace_declaration(&self) -> Option<(Option<&str>, &str)> {
        match (&self.name.prefix, self.name.local.as_str()) {
            (None, "xmlns") => Some((None, self.value.as_str())),
            (Some(p), local) if p == "xmlns" => Some((Some(local), self.value.as_str())),
            _ => None,
        }
    }
}

/// A node inside an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An element with its attributes (in source order) and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: QName::parse(name),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Value of the attribute spelled `qualified` (e.g. `"xml:lang"`)
    pub fn attribute(&self, qualified: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(qualified))
            .map(|a| a.value.as_str())
    }

    /// Set or replace the attribute spelled `qualified`
    pub fn set_attribute(&mut self, qualified: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name.matches(qualified)) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute::new(qualified, value)),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Namespace declarations made on this element, in attribute order
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.attributes
            .iter()
            .filter_map(|a| a.namespace_declaration())
    }
}
