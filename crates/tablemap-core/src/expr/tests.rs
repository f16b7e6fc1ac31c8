use super::*;
use crate::{
    convert::{NumberConverter, StringConverter, StringSetConverter},
    path::PropertyPath,
};
use serde_json::json;
use std::sync::Arc;

fn string(wire: &str) -> ColumnDef {
    ColumnDef::attribute(wire, Arc::new(StringConverter))
}

fn number(wire: &str) -> ColumnDef {
    ColumnDef::attribute(wire, Arc::new(NumberConverter))
}

#[test]
fn repeated_column_reuses_aliases() {
    let version = number("version");
    let mut builder = ExpectedBuilder::new();
    builder
        .eq(&version, json!(3))
        .and_then(|b| b.eq(&version, json!(3)))
        .and_then(|b| b.ne(&version, json!(4)))
        .expect("clauses push");

    let expr = builder.build();

    assert_eq!(
        expr.text,
        "#version = :version AND #version = :version AND #version <> :version2"
    );
    assert_eq!(expr.names.len(), 1);
    assert_eq!(expr.names["#version"], "version");
    assert_eq!(expr.values[":version"], AttributeValue::N("3".into()));
    assert_eq!(expr.values[":version2"], AttributeValue::N("4".into()));
}

#[test]
fn colliding_sanitised_names_get_distinct_aliases() {
    let mut builder = ConditionBuilder::new();
    builder
        .eq(&string("a.b"), "x")
        .and_then(|b| b.eq(&string("a-b"), "x"))
        .expect("clauses push");

    let expr = builder.build();

    assert_eq!(expr.text, "#ab = :ab AND #ab2 = :ab2");
    assert_eq!(expr.names["#ab"], "a.b");
    assert_eq!(expr.names["#ab2"], "a-b");
    assert_eq!(expr.values.len(), 2);
}

#[test]
fn nested_columns_alias_each_segment() {
    let root = Arc::new(PropertyPath::new(None, "meta", "m"));
    let created = string("createdBy").rebased(Some(&root));

    let mut builder = ExpectedBuilder::new();
    builder.eq(&created, "ana").expect("clause pushes");
    let expr = builder.build();

    assert_eq!(expr.text, "#m.#createdBy = :mcreatedBy");
    assert_eq!(expr.clauses[0].path(), "m.createdBy");
    assert_eq!(expr.names.len(), 2);
}

#[test]
fn missing_values_become_existence_checks() {
    let owner = string("owner");
    let mut builder = ConditionBuilder::new();
    builder
        .eq(&owner, None::<serde_json::Value>)
        .and_then(|b| b.ne(&owner, json!(null)))
        .expect("clauses push");

    let expr = builder.build();

    assert_eq!(
        expr.text,
        "attribute_not_exists(#owner) AND attribute_exists(#owner)"
    );
    assert_eq!(expr.clauses[0].kind, ConditionKind::Null);
    assert_eq!(expr.clauses[1].kind, ConditionKind::NotNull);
    assert!(expr.values.is_empty());
}

#[test]
fn every_kind_renders() {
    let size = number("size");
    let tags = ColumnDef::attribute("tags", Arc::new(StringSetConverter));
    let name = string("name");

    let mut builder = ConditionBuilder::new();
    builder
        .le(&size, json!(10))
        .and_then(|b| b.lt(&size, json!(9)))
        .and_then(|b| b.ge(&size, json!(1)))
        .and_then(|b| b.gt(&size, json!(0)))
        .and_then(|b| b.contains(&tags, "red"))
        .and_then(|b| b.not_contains(&tags, "blue"))
        .and_then(|b| b.begins_with(&name, "a"))
        .and_then(|b| b.in_list(&name, [json!("a"), json!("b")]))
        .and_then(|b| b.between(&size, json!(2), json!(8)))
        .and_then(|b| b.not_null(&name))
        .and_then(|b| b.null(&tags))
        .expect("clauses push");

    let texts = builder
        .build()
        .clauses
        .into_iter()
        .map(|clause| clause.text)
        .collect::<Vec<_>>();

    assert_eq!(
        texts,
        [
            "#size <= :size",
            "#size < :size2",
            "#size >= :size3",
            "#size > :size4",
            "contains(#tags, :tags)",
            "NOT contains(#tags, :tags2)",
            "begins_with(#name, :name)",
            "#name IN (:name, :name2)",
            "#size BETWEEN :size5 AND :size6",
            "attribute_exists(#name)",
            "attribute_not_exists(#tags)",
        ]
    );
}

#[test]
fn operand_mismatch_is_validation_error() {
    let size = number("size");
    let mut builder = ConditionBuilder::new();

    let err = builder
        .apply(ConditionKind::Between, &size, json!(1))
        .expect_err("between needs a range");
    assert!(err.is_validation(), "unexpected error: {err:?}");

    let err = builder
        .eq(&size, "ten")
        .expect_err("string does not convert to a number");
    assert!(err.is_validation(), "unexpected error: {err:?}");

    let err = builder
        .apply_wire(ConditionKind::Null, &size, vec![AttributeValue::number(1)])
        .expect_err("existence checks take no value");
    assert!(err.is_validation());
    assert!(builder.is_empty());
}

#[test]
fn key_condition_limits_attributes_and_kinds() {
    let pk = string("PK");
    let sk = string("SK");

    let mut builder = KeyConditionBuilder::new();
    builder
        .eq(&pk, "acme/root")
        .and_then(|b| b.begins_with(&sk, "file/"))
        .and_then(|b| b.le(&sk, "file/z"))
        .expect("two attributes are allowed");

    let err = builder
        .eq(&string("LSI1"), "x")
        .expect_err("third attribute");
    assert!(err.is_validation(), "unexpected error: {err:?}");
    assert!(err.message.contains("at most 2"), "{err:?}");

    let err = KeyConditionBuilder::new()
        .ne(&pk, "acme/root")
        .expect_err("NE is not a key operator");
    assert!(err.is_validation());

    assert_eq!(builder.build().clauses.len(), 3);
}

#[test]
fn empty_expression_is_none() {
    assert!(ExpectedBuilder::new().build().non_empty().is_none());
    assert_eq!(ConditionKind::NotContains.to_string(), "NOT_CONTAINS");
}
