use super::*;
use proptest::prelude::*;
use serde_json::json;

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn doc(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("test documents must be objects"),
    }
}

#[test]
fn compile_substitutes_placeholders_and_keeps_literals() {
    let template = KeyTemplate::new(":account/:directory").expect("valid template");
    let compiled = template
        .compile(&fields(&[("account", "acme"), ("directory", "root")]))
        .expect("compiles");

    assert_eq!(compiled, "acme/root");
    assert_eq!(
        template.placeholders().collect::<Vec<_>>(),
        vec!["account", "directory"]
    );
}

#[test]
fn compile_reads_scalars_from_documents() {
    let template = KeyTemplate::new("v/:version/:flag").expect("valid template");
    let compiled = template
        .compile(&doc(json!({ "version": 3, "flag": true })))
        .expect("compiles");

    assert_eq!(compiled, "v/3/true");

    let err = template
        .compile(&doc(json!({ "version": [1], "flag": true })))
        .expect_err("arrays cannot be key values");
    assert!(matches!(err, KeyPathError::UnsupportedValue { .. }));
}

#[test]
fn missing_placeholder_value_is_a_hard_error() {
    let template = KeyTemplate::new("file/:fileName").expect("valid template");
    let err = template
        .compile(&doc(json!({ "fileName": null })))
        .expect_err("null counts as missing");

    assert!(
        matches!(err, KeyPathError::MissingValue { ref field, .. } if field == "fileName"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn parse_is_the_structural_inverse() {
    let template = KeyTemplate::new("file/:fileName").expect("valid template");

    assert_eq!(
        template.parse("file/a.txt").expect("parses"),
        fields(&[("fileName", "a.txt")])
    );
}

#[test]
fn parse_rejects_strings_that_do_not_match_literals() {
    let template = KeyTemplate::new("file/:fileName").expect("valid template");
    let err = template.parse("dir/a.txt").expect_err("literal mismatch");
    assert!(matches!(err, KeyPathError::Mismatch { .. }));

    let template = KeyTemplate::new(":account/:directory").expect("valid template");
    let err = template.parse("acme").expect_err("separator missing");
    assert!(matches!(err, KeyPathError::Mismatch { .. }));

    let template = KeyTemplate::new("user#:id#profile").expect("valid template");
    let err = template
        .parse("user#7#profile#extra")
        .expect_err("trailing text must not be swallowed");
    assert!(matches!(err, KeyPathError::Mismatch { .. }));
}

#[test]
fn adjacent_placeholders_are_rejected() {
    let err = KeyTemplate::new(":a:b").expect_err("ambiguous template");
    assert!(matches!(err, KeyPathError::InvalidTemplate { .. }));

    assert!(KeyTemplate::new("").is_err());
}

#[test]
fn lone_colon_is_a_literal() {
    let template = KeyTemplate::new("a: :b").expect("valid template");
    assert_eq!(
        template.segments(),
        &[
            Segment::Literal("a: ".to_string()),
            Segment::Placeholder("b".to_string()),
        ]
    );
}

#[test]
fn compile_prefix_stops_at_first_unset_placeholder() {
    let template = KeyTemplate::new("file/:directory/:fileName").expect("valid template");

    let prefix = template
        .compile_prefix(&fields(&[("fileName", "a.txt")]))
        .expect("prefix compiles");
    assert_eq!(prefix, "file/");

    let prefix = template
        .compile_prefix(&fields(&[("directory", "root")]))
        .expect("prefix compiles");
    assert_eq!(prefix, "file/root/");
}

#[test]
fn separator_inside_a_value_breaks_the_round_trip() {
    // documented limitation: the first separator wins when parsing
    let template = KeyTemplate::new(":account/:directory").expect("valid template");
    let compiled = template
        .compile(&fields(&[("account", "a/b"), ("directory", "c")]))
        .expect("compiles");

    let parsed = template.parse(&compiled).expect("still parses");
    assert_ne!(parsed, fields(&[("account", "a/b"), ("directory", "c")]));
}

#[test]
fn key_path_parses_both_templates() {
    let path = KeyPath::new(
        KeyTemplate::new(":account/:directory").expect("valid"),
        Some(KeyTemplate::new("file/:fileName").expect("valid")),
    );

    let parsed = path
        .parse("acme/root", Some("file/a.txt"))
        .expect("parses");
    assert_eq!(
        parsed,
        fields(&[("account", "acme"), ("directory", "root"), ("fileName", "a.txt")])
    );
    assert_eq!(
        path.fields().collect::<Vec<_>>(),
        vec!["account", "directory", "fileName"]
    );
}

#[derive(Debug)]
struct UppercaseEngine;

impl PathEngine for UppercaseEngine {
    fn compile(
        &self,
        template: &KeyTemplate,
        source: &dyn KeySource,
    ) -> Result<String, KeyPathError> {
        template.compile(source).map(|s| s.to_uppercase())
    }

    fn parse(
        &self,
        template: &KeyTemplate,
        compiled: &str,
    ) -> Result<BTreeMap<String, String>, KeyPathError> {
        template.parse(&compiled.to_lowercase())
    }
}

#[test]
fn custom_engine_drives_compile_and_parse() {
    let path = KeyPath::new(KeyTemplate::new("org/:org").expect("valid"), None)
        .with_engine(std::sync::Arc::new(UppercaseEngine));

    let pk = path.compile_pk(&fields(&[("org", "acme")])).expect("compiles");
    assert_eq!(pk, "ORG/ACME");
    assert_eq!(path.compile_sk(&fields(&[])).expect("no sk"), None);
    assert_eq!(
        path.parse(&pk, None).expect("parses"),
        fields(&[("org", "acme")])
    );
}

proptest! {
    #[test]
    fn compile_then_parse_round_trips(
        account in "[a-zA-Z0-9_.-]{0,12}",
        directory in "[a-zA-Z0-9_.-]{0,12}",
        name in "[a-zA-Z0-9_.#-]{0,16}",
    ) {
        let path = KeyPath::new(
            KeyTemplate::new(":account/:directory").expect("valid"),
            Some(KeyTemplate::new("file/:name").expect("valid")),
        );
        let input = fields(&[
            ("account", account.as_str()),
            ("directory", directory.as_str()),
            ("name", name.as_str()),
        ]);

        let pk = path.compile_pk(&input).expect("pk compiles");
        let sk = path.compile_sk(&input).expect("sk compiles");
        let parsed = path.parse(&pk, sk.as_deref()).expect("parses");

        prop_assert_eq!(parsed, input);
    }
}
