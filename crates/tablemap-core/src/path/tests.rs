use super::*;
use crate::convert::{NumberConverter, StringConverter};
use serde_json::json;

fn doc(value: JsonValue) -> Document {
    match value {
        JsonValue::Object(map) => map,
        _ => panic!("test documents must be objects"),
    }
}

// three hops: meta (nested) → audit (nested) → createdBy
fn deep_path() -> PropertyPath {
    let meta = Arc::new(PropertyPath::new(None, "meta", "m"));
    let audit = Arc::new(PropertyPath::new(Some(meta), "audit", "a"));
    PropertyPath::new(Some(audit), "createdBy", "cb")
}

#[test]
fn chains_report_both_dimensions() {
    let path = deep_path();

    assert_eq!(path.depth(), 3);
    assert_eq!(path.object_chain(), vec!["meta", "audit", "createdBy"]);
    assert_eq!(path.wire_path(), "m.a.cb");
    assert_eq!(path.to_string(), "meta.audit.createdBy");
}

#[test]
fn object_dimension_reads_through_nested_containers() {
    let path = deep_path();
    let mut document = doc(json!({ "meta": { "audit": { "createdBy": "ann" } } }));

    let accessor = path.evaluate(Root::Object(&mut document), &StringConverter);
    assert_eq!(accessor.dimension(), Dimension::Object);
    assert_eq!(
        accessor.get(AccessOptions::read()).expect("reads"),
        Some(json!("ann"))
    );
}

#[test]
fn missing_intermediate_reads_as_none_unless_required() {
    let path = deep_path();
    let mut document = doc(json!({ "meta": null }));

    let accessor = path.evaluate(Root::Object(&mut document), &StringConverter);
    assert_eq!(accessor.get(AccessOptions::read()).expect("reads"), None);

    let err = accessor
        .get(AccessOptions::read().required())
        .expect_err("required value must raise");
    assert!(err.is_validation());
    assert!(err.message.contains("meta.audit.createdBy"), "{err:?}");
}

#[test]
fn write_generates_intermediate_objects() {
    let path = deep_path();
    let mut document = Document::new();

    path.evaluate(Root::Object(&mut document), &StringConverter)
        .set(Some(json!("bob")), AccessOptions::write())
        .expect("writes");

    assert_eq!(
        JsonValue::Object(document),
        json!({ "meta": { "audit": { "createdBy": "bob" } } })
    );
}

#[test]
fn write_without_generate_leaves_document_untouched() {
    let path = deep_path();
    let mut document = Document::new();

    path.evaluate(Root::Object(&mut document), &StringConverter)
        .set(Some(json!("bob")), AccessOptions::read())
        .expect("silently skipped");
    assert!(document.is_empty());

    let err = path
        .evaluate(Root::Object(&mut document), &StringConverter)
        .set(Some(json!("bob")), AccessOptions::read().required())
        .expect_err("required write into a missing container raises");
    assert!(err.is_validation());
}

#[test]
fn attribute_dimension_converts_at_the_leaf() {
    let size = PropertyPath::new(None, "size", "sz");
    let mut item = Item::new();

    size.evaluate(Root::Attribute(&mut item), &NumberConverter)
        .set(Some(json!(10)), AccessOptions::write())
        .expect("writes");
    assert_eq!(item.get("sz"), Some(&AttributeValue::N("10".to_string())));

    let read = size
        .evaluate(Root::Attribute(&mut item), &NumberConverter)
        .get(AccessOptions::read())
        .expect("reads");
    assert_eq!(read, Some(json!(10)));
}

#[test]
fn attribute_dimension_generates_nested_maps() {
    let path = deep_path();
    let mut item = Item::new();

    path.evaluate(Root::Attribute(&mut item), &StringConverter)
        .set(Some(json!("cy")), AccessOptions::write())
        .expect("writes");

    let meta = item.get("m").and_then(AttributeValue::as_map).expect("m map");
    let audit = meta.get("a").and_then(AttributeValue::as_map).expect("a map");
    assert_eq!(audit.get("cb"), Some(&AttributeValue::S("cy".to_string())));
}

#[test]
fn setting_none_clears_the_leaf() {
    let path = PropertyPath::top("mimeType");
    let mut document = doc(json!({ "mimeType": "text/plain" }));

    path.evaluate(Root::Object(&mut document), &StringConverter)
        .set(None, AccessOptions::write())
        .expect("clears");
    assert!(!document.contains_key("mimeType"));
}

#[test]
fn scalar_in_container_position_is_rejected() {
    let path = deep_path();
    let mut document = doc(json!({ "meta": 5 }));

    let err = path
        .evaluate(Root::Object(&mut document), &StringConverter)
        .get(AccessOptions::read())
        .expect_err("scalar cannot hold properties");
    assert!(err.message.contains("not an object"), "{err:?}");
}

#[test]
fn undecodable_wire_value_is_corruption() {
    let size = PropertyPath::top("size");
    let mut item = Item::new();
    item.insert("size".to_string(), AttributeValue::S("ten".to_string()));

    let err = size
        .evaluate(Root::Attribute(&mut item), &NumberConverter)
        .get(AccessOptions::read())
        .expect_err("S cannot decode as a number");
    assert_eq!(err.class, crate::error::ErrorClass::Corruption);
}

#[test]
fn rebased_paths_keep_every_hop() {
    let leaf = PropertyPath::new(
        Some(Arc::new(PropertyPath::new(None, "audit", "a"))),
        "createdBy",
        "cb",
    );
    let root = Arc::new(PropertyPath::new(None, "meta", "m"));

    let rebased = leaf.rebased(Some(&root));
    assert_eq!(rebased, deep_path());
    assert_eq!(leaf.rebased(None), leaf);
}
