//! `<Extensions>` capture and re-emission.

use crate::krd::types::ExtensionBag;
use crate::tcx::types::NS_TPX;
use crate::xml::{XmlElement, XmlNode};
use std::collections::BTreeMap;

/// Capture the content of an `<Extensions>` child of `parent`, verbatim.
pub fn capture_extensions(parent: &XmlElement) -> Option<ExtensionBag> {
    parent
        .child("Extensions")
        .map(|extensions| ExtensionBag::new(extensions.children.clone()))
}

/// Copy inherited `xmlns:*` declarations onto the top-level children of
/// every `<Extensions>` element below `root`. Captured content then stays
/// bound wherever it is written back, whatever the new root declares.
pub fn bind_extension_namespaces(root: &mut XmlElement) {
    bind_in_scope(root, &BTreeMap::new());
}

fn bind_in_scope(element: &mut XmlElement, inherited: &BTreeMap<String, String>) {
    let mut scope = inherited.clone();
    scope.extend(
        element
            .namespace_declarations()
            .map(|(prefix, uri)| (prefix.to_string(), uri.to_string())),
    );
    let is_extensions = element.local_name() == "Extensions";

    for node in &mut element.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        if !is_extensions {
            bind_in_scope(child, &scope);
            continue;
        }
        for prefix in child.unbound_prefixes() {
            if let Some(uri) = scope.get(&prefix) {
                tracing::trace!(%prefix, element = %child.name, "Binding inherited namespace");
                child.set_attribute(format!("xmlns:{}", prefix), uri.as_str());
            }
        }
    }
}

/// Rebuild the `<Extensions>` element from a captured bag.
pub fn extensions_element(bag: &ExtensionBag) -> XmlElement {
    XmlElement {
        name: "Extensions".to_string(),
        attributes: Vec::new(),
        children: bag.nodes().to_vec(),
    }
}

/// Wattage stored in a `TPX/Watts` entry of the bag.
pub fn tpx_watts(bag: &ExtensionBag) -> Option<f64> {
    bag.elements_named("TPX")
        .find_map(|tpx| tpx.child_text("Watts"))
        .and_then(|raw| raw.parse().ok())
}

/// Fresh `<Extensions><TPX><Watts>` block for an authored power step.
pub fn power_extensions(watts: f64) -> XmlElement {
    XmlElement::new("Extensions").with_child(
        XmlElement::new("TPX")
            .with_attribute("xmlns", NS_TPX)
            .with_child(XmlElement::text_element("Watts", watts.to_string())),
    )
}
