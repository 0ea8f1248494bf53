//! Element tree to XML text, built on the `quick-xml` writer.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use super::{XmlElement, XmlError, XmlNode};

/// Output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlWriteOptions {
    /// Spaces per nesting level; 0 writes everything on one line
    pub indent: usize,
    /// Emit the `<?xml version="1.0" encoding="UTF-8"?>` declaration
    pub declaration: bool,
}

impl Default for XmlWriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
        }
    }
}

/// Serialize an element tree to XML text.
pub fn serialize_xml(root: &XmlElement, options: XmlWriteOptions) -> Result<String, XmlError> {
    let mut writer = if options.indent > 0 {
        Writer::new_with_indent(Cursor::new(Vec::new()), b' ', options.indent)
    } else {
        Writer::new(Cursor::new(Vec::new()))
    };

    if options.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
    }

    write_element(&mut writer, root)?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).map_err(|e| XmlError::Write(e.to_string()))
}

/// Write one element and its subtree.
fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;

    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| XmlError::Write(e.to_string()))?,
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))?;

    Ok(())
}
