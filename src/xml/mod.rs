//! Generic XML element tree.
//!
//! The TCX codecs never touch `quick-xml` events directly. Text is parsed
//! into an owned [`XmlElement`] tree, codecs map between that tree and the
//! KRD model, and the writer serializes the tree back to text. Vendor
//! extension content is stored as these elements so it can be re-emitted
//! without interpretation.

pub mod parser;
pub mod writer;

pub use parser::parse_xml;
pub use writer::{serialize_xml, XmlWriteOptions};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// A single attribute, keeping the qualified name as written (`xsi:type`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

/// Child content of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XmlNode {
    /// Character data (already unescaped)
    Text(String),
    /// Nested element
    Element(XmlElement),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XmlElement {
    /// Qualified element name (`ns3:TPX`, `Step`)
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<XmlAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlNode>,
}

/// Strip the namespace prefix from a qualified name.
pub fn local_name(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element holding a single text node.
    pub fn text_element(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    /// Builder: append an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: append a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(XmlAttribute { name, value }),
        }
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Attribute value by exact qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespace-prefixed attribute matched by local name,
    /// whatever prefix the document bound. Namespace declarations are skipped.
    pub fn prefixed_attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| match a.name.split_once(':') {
                Some((prefix, name)) => prefix != "xmlns" && name == local,
                None => false,
            })
            .map(|a| a.value.as_str())
    }

    /// The `xsi:type` discriminator, if any.
    pub fn xsi_type(&self) -> Option<&str> {
        self.prefixed_attribute("type")
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Child elements whose local name matches.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.local_name() == local)
    }

    /// First child element whose local name matches.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// `(prefix, uri)` pairs bound by `xmlns:<prefix>` attributes on this element.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|a| {
            a.name
                .strip_prefix("xmlns:")
                .map(|prefix| (prefix, a.value.as_str()))
        })
    }

    /// Prefixes used by this subtree's element and attribute names that no
    /// element inside the subtree declares.
    pub fn unbound_prefixes(&self) -> BTreeSet<String> {
        let mut prefixes: BTreeSet<String> = self
            .elements()
            .flat_map(XmlElement::unbound_prefixes)
            .collect();

        let names = std::iter::once(self.name.as_str())
            .chain(self.attributes.iter().map(|a| a.name.as_str()));
        for name in names {
            if let Some((prefix, _)) = name.split_once(':') {
                if prefix != "xmlns" && prefix != "xml" {
                    prefixes.insert(prefix.to_string());
                }
            }
        }

        for (prefix, _) in self.namespace_declarations() {
            prefixes.remove(prefix);
        }
        prefixes
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Trimmed text of the first matching child, if present and non-empty.
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.child(local)
            .map(|c| c.text().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Errors from the XML text codec.
#[derive(Debug, Error)]
pub enum XmlError {
    /// Malformed markup
    #[error("XML syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Document ended with open elements
    #[error("Unclosed element: {0}")]
    UnclosedElement(String),

    /// Document has no root element
    #[error("Document has no root element")]
    NoRootElement,

    /// More than one top-level element
    #[error("Document has more than one root element: {0}")]
    MultipleRoots(String),

    /// Serialization failure
    #[error("Failed to write XML: {0}")]
    Write(String),
}
