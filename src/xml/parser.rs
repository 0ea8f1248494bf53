//! XML text to element tree, built on the `quick-xml` event reader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{XmlAttribute, XmlElement, XmlError, XmlNode};

/// Parse XML text into its root element.
///
/// Whitespace-only text between elements is dropped; comments, processing
/// instructions and the declaration are ignored.
pub fn parse_xml(content: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let element = start_element(e, reader.buffer_position())?;
                stack.push(element);
            }
            Ok(Event::Empty(ref e)) => {
                let element = start_element(e, reader.buffer_position())?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| XmlError::Syntax {
                    position: reader.buffer_position(),
                    message: "Unexpected closing tag".to_string(),
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| XmlError::Syntax {
                    position: reader.buffer_position(),
                    message: format!("Failed to unescape text: {}", e),
                })?;
                push_text(&mut stack, text.into_owned(), reader.buffer_position())?;
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_text(&mut stack, text, reader.buffer_position())?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XmlError::Syntax {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::UnclosedElement(open.name));
    }

    root.ok_or(XmlError::NoRootElement)
}

/// Build an element from a start tag, unescaping attribute values.
fn start_element(event: &BytesStart<'_>, position: usize) -> Result<XmlElement, XmlError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(event.name().as_ref()));

    for attr in event.attributes() {
        let attr = attr.map_err(|e| XmlError::Syntax {
            position,
            message: format!("Invalid attribute: {}", e),
        })?;
        let value = attr.unescape_value().map_err(|e| XmlError::Syntax {
            position,
            message: format!("Failed to unescape attribute: {}", e),
        })?;
        element.attributes.push(XmlAttribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }

    Ok(element)
}

/// Attach a finished element to its parent, or make it the root.
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_some() => Err(XmlError::MultipleRoots(element.name)),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn push_text(stack: &mut [XmlElement], text: String, position: usize) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Text(text));
            Ok(())
        }
        None => Err(XmlError::Syntax {
            position,
            message: "Text content outside of root element".to_string(),
        }),
    }
}
