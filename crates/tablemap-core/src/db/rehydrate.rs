use crate::{
    db::write::key_operand,
    error::{Error, ErrorOrigin},
    key::KeyPath,
    model::{ColumnDef, EntityType, ViewType},
    path::AccessOptions,
    value::{AttributeValue, Document, Item, is_set},
};
use serde_json::Value as JsonValue;

/// Rebuild an entity document from a stored row.
///
/// A row whose discriminator names another type is refused. Key fields the
/// columns do not carry are parsed back out of the identifiers, typed by the
/// column of the same property when there is one.
pub(crate) fn entity(
    entity: &EntityType,
    type_column: &str,
    mut item: Item,
) -> Result<Document, Error> {
    if let Some(found) = item.get(type_column) {
        if found.as_str() != Some(entity.name.as_str()) {
            return Err(Error::validation(
                ErrorOrigin::Manager,
                format!(
                    "row of type '{}' cannot be read as '{}'",
                    found.as_str().unwrap_or(found.type_label()),
                    entity.name
                ),
            ));
        }
    }

    let mut document = Document::new();
    copy_columns(entity.all_columns(), &mut item, &mut document)?;

    if let Some(key_path) = &entity.key_path {
        let pk = wire_string(&item, &entity.partition.column).ok_or_else(|| {
            Error::corruption(
                ErrorOrigin::Manager,
                format!("'{}' row has no partition key", entity.name),
            )
        })?;
        let sk = entity
            .sort
            .as_ref()
            .and_then(|sort| wire_string(&item, &sort.column));

        restore_fields(key_path, pk, sk, &mut document, |field| entity.column(field))?;
    }

    Ok(document)
}

/// Rebuild a view document. The row's own type picks the source whose
/// templates decompose the index keys.
pub(crate) fn view(view: &ViewType, type_column: &str, mut item: Item) -> Result<Document, Error> {
    let mut document = Document::new();
    copy_columns(view.columns.iter(), &mut item, &mut document)?;

    let source = item
        .get(type_column)
        .and_then(AttributeValue::as_str)
        .and_then(|type_name| view.source(type_name));
    let pk = item
        .get(&view.index.partition_key)
        .and_then(AttributeValue::as_str);
    let sk = view
        .index
        .sort_key
        .as_ref()
        .and_then(|attribute| item.get(attribute))
        .and_then(AttributeValue::as_str);

    if let (Some(source), Some(pk)) = (source, pk) {
        restore_fields(&source.key_path, pk, sk, &mut document, |field| {
            view.columns.iter().find(|column| column.property() == field)
        })?;
    }

    Ok(document)
}

fn copy_columns<'a>(
    columns: impl Iterator<Item = &'a ColumnDef>,
    item: &mut Item,
    document: &mut Document,
) -> Result<(), Error> {
    for column in columns {
        if let Some(value) = column.read_item(item, AccessOptions::read())? {
            column.write(document, Some(value), AccessOptions::write())?;
        }
    }

    Ok(())
}

fn restore_fields<'a>(
    key_path: &KeyPath,
    pk: &str,
    sk: Option<&str>,
    document: &mut Document,
    column: impl Fn(&str) -> Option<&'a ColumnDef>,
) -> Result<(), Error> {
    let fields = key_path.parse(pk, sk).map_err(|err| {
        Error::corruption(
            ErrorOrigin::Key,
            format!("stored key '{pk}' does not match its template: {err}"),
        )
    })?;

    for (field, raw) in fields {
        if is_set(document.get(&field)) {
            continue;
        }
        let value = match column(&field) {
            Some(column) => key_operand(column, raw).map_err(|err| {
                Error::corruption(ErrorOrigin::Key, format!("stored key '{pk}': {}", err.message))
            })?,
            None => JsonValue::String(raw),
        };
        document.insert(field, value);
    }

    Ok(())
}

fn wire_string<'a>(item: &'a Item, column: &ColumnDef) -> Option<&'a str> {
    item.get(&column.wire_path()).and_then(AttributeValue::as_str)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DEFAULT_TYPE_COLUMN,
        convert::ConverterRegistry,
        resolve::TypeCatalog,
        schema::{CatalogBuilder, ClassDecl, ColumnDecl, IdentifierDecl, KeyPathDecl},
        test_support::layout,
    };
    use serde_json::json;

    fn release() -> TypeCatalog {
        let class = ClassDecl::new("Release")
            .identifier(IdentifierDecl::partition("pk"))
            .identifier(IdentifierDecl::sort("sk"))
            .key_path(KeyPathDecl::new(":product").sk("release/:build"))
            .column(ColumnDecl::number("build"));
        let catalog = CatalogBuilder::new(layout())
            .class(class)
            .build()
            .expect("catalog builds");

        TypeCatalog::resolve(&catalog, &ConverterRegistry::with_builtins())
            .expect("catalog resolves")
    }

    fn row(sk: &str) -> Item {
        Item::from([
            ("PK".to_string(), AttributeValue::from("tablemap")),
            ("SK".to_string(), AttributeValue::from(sk)),
            (DEFAULT_TYPE_COLUMN.to_string(), AttributeValue::from("Release")),
        ])
    }

    #[test]
    fn key_fields_take_their_column_type() {
        let types = release();
        let ty = types.entity("Release").expect("Release resolved");

        let document = entity(ty, DEFAULT_TYPE_COLUMN, row("release/42")).expect("row decodes");

        assert_eq!(document["build"], json!(42));
        assert_eq!(document["product"], json!("tablemap"));
    }

    #[test]
    fn non_numeric_key_for_numeric_column_is_corruption() {
        let types = release();
        let ty = types.entity("Release").expect("Release resolved");

        let err = entity(ty, DEFAULT_TYPE_COLUMN, row("release/beta"))
            .expect_err("build is numeric");

        assert_eq!(err.class, crate::error::ErrorClass::Corruption);
    }
}
