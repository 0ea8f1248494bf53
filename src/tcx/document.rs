//! Document codec: `TrainingCenterDatabase` <-> [`KrdDocument`].

use crate::krd::types::{KrdDocument, Metadata};
use crate::tcx::extensions::{bind_extension_namespaces, capture_extensions, extensions_element};
use crate::tcx::types::{
    TcxError, KAIORD_PREFIX, NS_KAIORD, NS_TCX, NS_TPX, NS_XSI, ROOT_ELEMENT, SCHEMA_LOCATION,
    TPX_PREFIX,
};
use crate::tcx::workout::{decode_workout, encode_workout};
use crate::xml::XmlElement;

const TIME_CREATED: &str = "timeCreated";
const MANUFACTURER: &str = "manufacturer";
const PRODUCT: &str = "product";
const SERIAL_NUMBER: &str = "serialNumber";

/// Fail unless `root` is a `TrainingCenterDatabase` element.
pub fn ensure_root(root: &XmlElement) -> Result<(), TcxError> {
    if root.local_name() == ROOT_ELEMENT {
        Ok(())
    } else {
        Err(TcxError::parsing(
            "Invalid TCX format: missing TrainingCenterDatabase element",
        ))
    }
}

/// Decode a parsed TCX tree. Only the first workout is converted.
///
/// Extension content is captured with the namespace bindings it inherited
/// from its ancestors, so prefixes such as `ns3:` survive re-emission.
pub fn decode_document(root: &XmlElement) -> Result<KrdDocument, TcxError> {
    ensure_root(root)?;

    let mut bound = root.clone();
    bind_extension_namespaces(&mut bound);
    let root = &bound;

    let mut workouts = root
        .children_named("Workouts")
        .flat_map(|list| list.children_named("Workout"));
    let workout_element = workouts
        .next()
        .ok_or_else(|| TcxError::parsing("No workouts found in TCX file"))?;
    let skipped = workouts.count();
    if skipped > 0 {
        tracing::warn!(skipped, "TCX file holds several workouts, converting only the first");
    }

    let workout = decode_workout(workout_element)?;

    let metadata = Metadata {
        created: root.prefixed_attribute(TIME_CREATED).map(str::to_string),
        sport: Some(workout.sport.as_str().to_string()),
        manufacturer: root.prefixed_attribute(MANUFACTURER).map(str::to_string),
        product: root.prefixed_attribute(PRODUCT).map(str::to_string),
        serial_number: root.prefixed_attribute(SERIAL_NUMBER).map(str::to_string),
    };

    let mut krd = KrdDocument::new(metadata, Some(workout));
    krd.extensions.tcx = capture_extensions(root);
    Ok(krd)
}

/// Encode a KRD document as a TCX tree.
pub fn encode_document(krd: &KrdDocument) -> Result<XmlElement, TcxError> {
    let workout = krd
        .workout()
        .ok_or_else(|| TcxError::parsing("KRD does not contain workout data in extensions"))?;

    let mut root = XmlElement::new(ROOT_ELEMENT)
        .with_attribute("xmlns", NS_TCX)
        .with_attribute(format!("xmlns:{}", TPX_PREFIX), NS_TPX)
        .with_attribute("xmlns:xsi", NS_XSI)
        .with_attribute(format!("xmlns:{}", KAIORD_PREFIX), NS_KAIORD)
        .with_attribute("xsi:schemaLocation", SCHEMA_LOCATION);

    let metadata = &krd.metadata;
    for (field, value) in [
        (TIME_CREATED, &metadata.created),
        (MANUFACTURER, &metadata.manufacturer),
        (PRODUCT, &metadata.product),
        (SERIAL_NUMBER, &metadata.serial_number),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            root.set_attribute(format!("{}:{}", KAIORD_PREFIX, field), value);
        }
    }

    root.push_child(XmlElement::new("Workouts").with_child(encode_workout(workout)));

    if let Some(bag) = &krd.extensions.tcx {
        root.push_child(extensions_element(bag));
    }

    Ok(root)
}
