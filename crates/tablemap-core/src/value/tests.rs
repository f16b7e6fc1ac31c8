use super::*;
use serde_json::json;
use std::cmp::Ordering;

#[test]
fn numbers_order_numerically_not_lexically() {
    let nine = AttributeValue::number(9);
    let ten = AttributeValue::number(10);

    assert_eq!(nine.key_cmp(&ten), Some(Ordering::Less));
    assert_eq!(
        AttributeValue::from("9").key_cmp(&AttributeValue::from("10")),
        Some(Ordering::Greater),
        "strings compare bytewise"
    );
}

#[test]
fn large_integers_compare_exactly() {
    let low = AttributeValue::number(9_007_199_254_740_992_u64);
    let high = AttributeValue::number(9_007_199_254_740_993_u64);
    assert_eq!(low.key_cmp(&high), Some(Ordering::Less));

    let max = AttributeValue::number(u128::MAX);
    let below = AttributeValue::number(u128::MAX - 1);
    assert_eq!(max.key_cmp(&below), Some(Ordering::Greater));

    assert_eq!(
        AttributeValue::number(-3).key_cmp(&AttributeValue::number(2.5)),
        Some(Ordering::Less)
    );
}

#[test]
fn mixed_variants_are_incomparable() {
    assert_eq!(
        AttributeValue::number(1).key_cmp(&AttributeValue::from("1")),
        None
    );
    assert_eq!(AttributeValue::Null.key_cmp(&AttributeValue::Null), None);
}

#[test]
fn render_key_lists_attributes_in_name_order() {
    let mut key = Item::new();
    key.insert("SK".to_string(), AttributeValue::from("file/a.txt"));
    key.insert("PK".to_string(), AttributeValue::from("acme/root"));

    assert_eq!(render_key(&key), "PK=acme/root, SK=file/a.txt");
}

#[test]
fn null_properties_are_unset() {
    let doc = json!({ "a": null, "b": 0 });

    assert!(!is_set(doc.get("a")));
    assert!(!is_set(doc.get("missing")));
    assert!(is_set(doc.get("b")));
}
