use super::*;
use proptest::prelude::*;
use serde_json::{Value as JsonValue, json};

fn round_trip(converter: &dyn Converter, value: &JsonValue) -> JsonValue {
    let wire = converter
        .to_wire(value)
        .unwrap_or_else(|err| panic!("{} to_wire failed: {err}", converter.name()));

    converter
        .from_wire(&wire)
        .unwrap_or_else(|err| panic!("{} from_wire failed: {err}", converter.name()))
}

fn arb_json_leaf() -> impl Strategy<Value = JsonValue> {
    prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 _./-]{0,12}".prop_map(JsonValue::String),
    ]
}

fn arb_json() -> impl Strategy<Value = JsonValue> {
    arb_json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| JsonValue::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn string_round_trip(s in ".{0,32}") {
        let value = JsonValue::String(s);
        prop_assert_eq!(round_trip(&StringConverter, &value), value);
    }

    #[test]
    fn integer_round_trip(n in any::<i64>()) {
        let value = json!(n);
        prop_assert_eq!(round_trip(&NumberConverter, &value), value);
    }

    #[test]
    fn unsigned_round_trip(n in any::<u64>()) {
        let value = json!(n);
        prop_assert_eq!(round_trip(&NumberConverter, &value), value);
    }

    #[test]
    fn boolean_round_trip(b in any::<bool>()) {
        let value = JsonValue::Bool(b);
        prop_assert_eq!(round_trip(&BooleanConverter, &value), value);
    }

    #[test]
    fn string_set_round_trip(set in prop::collection::btree_set("[a-z]{1,8}", 0..6)) {
        // sorted and unique is the canonical domain form of a set
        let value = JsonValue::Array(set.into_iter().map(JsonValue::String).collect());
        prop_assert_eq!(round_trip(&StringSetConverter, &value), value);
    }

    #[test]
    fn object_round_trip(map in prop::collection::btree_map("[a-z]{1,6}", arb_json(), 0..5)) {
        let value = JsonValue::Object(map.into_iter().collect());
        prop_assert_eq!(round_trip(&ObjectConverter, &value), value);
    }

    #[test]
    fn list_round_trip(items in prop::collection::vec(arb_json(), 0..5)) {
        let value = JsonValue::Array(items);
        prop_assert_eq!(round_trip(&ListConverter, &value), value);
    }

    #[test]
    fn json_round_trip(value in arb_json()) {
        prop_assert_eq!(round_trip(&JsonConverter, &value), value);
    }
}

#[test]
fn float_round_trip() {
    let value = json!(10.25);
    assert_eq!(round_trip(&NumberConverter, &value), value);
}

#[test]
fn date_round_trip_keeps_canonical_rfc3339() {
    let value = json!("2024-05-01T12:30:00Z");
    assert_eq!(round_trip(&DateConverter, &value), value);

    let err = DateConverter
        .to_wire(&json!("yesterday"))
        .expect_err("non-RFC 3339 dates must be rejected");
    assert!(matches!(err, ConvertError::InvalidDate { .. }));
}

#[test]
fn numbers_travel_as_decimal_strings() {
    let wire = NumberConverter.to_wire(&json!(10)).expect("number converts");
    assert_eq!(wire, crate::value::AttributeValue::N("10".to_string()));
}

#[test]
fn wrong_shapes_are_rejected_both_ways() {
    assert!(StringConverter.to_wire(&json!(1)).is_err());
    assert!(
        NumberConverter
            .from_wire(&crate::value::AttributeValue::N("ten".to_string()))
            .is_err()
    );
    assert!(
        StringSetConverter
            .to_wire(&json!(["a", 1]))
            .is_err()
    );
}

#[test]
fn registry_resolves_builtins_and_custom_shadows() {
    let mut registry = ConverterRegistry::with_builtins();
    assert!(registry.get("date").is_some());
    assert_eq!(registry.names().count(), 8);
    assert!(registry.get("uuid").is_none());

    #[derive(Debug)]
    struct Upper;
    impl Converter for Upper {
        fn name(&self) -> &str {
            "string"
        }
        fn to_wire(&self, value: &JsonValue) -> Result<crate::value::AttributeValue, ConvertError> {
            Ok(crate::value::AttributeValue::S(
                value.as_str().unwrap_or_default().to_uppercase(),
            ))
        }
        fn from_wire(
            &self,
            wire: &crate::value::AttributeValue,
        ) -> Result<JsonValue, ConvertError> {
            Ok(JsonValue::String(wire.as_str().unwrap_or_default().to_lowercase()))
        }
    }

    registry.register(std::sync::Arc::new(Upper));
    let string = registry.get("string").expect("string converter registered");
    assert_eq!(
        string.to_wire(&json!("abc")).expect("converts"),
        crate::value::AttributeValue::S("ABC".to_string())
    );
}
