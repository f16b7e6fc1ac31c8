use serde::{Serialize, de::DeserializeOwned};

///
/// Entity
///
/// A typed record mapped onto one table row. `TYPE_NAME` must match a
/// non-abstract class registered in the catalog and is written to the row's
/// type-discriminator attribute.
///
/// Key-path fields that are not also declared as columns are read back from
/// the compiled keys as strings, so such fields should be string-typed.
///

pub trait Entity: Serialize + DeserializeOwned + Send + 'static {
    const TYPE_NAME: &'static str;
}

///
/// View
///
/// A typed projection read back through a view index.
///

pub trait View: Serialize + DeserializeOwned + Send + 'static {
    const VIEW_NAME: &'static str;
}
