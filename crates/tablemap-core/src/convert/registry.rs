use crate::convert::{
    BooleanConverter, Converter, DateConverter, JsonConverter, ListConverter, NumberConverter,
    ObjectConverter, StringConverter, StringSetConverter,
};
use std::{collections::BTreeMap, sync::Arc};

///
/// ConverterRegistry
///
/// Name → converter lookup consulted once, at type resolution.
/// Starts with the built-in set; user converters may shadow a built-in name.
///

#[derive(Clone, Debug)]
pub struct ConverterRegistry {
    converters: BTreeMap<String, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// Registry with no converters at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            converters: BTreeMap::new(),
        }
    }

    /// Registry preloaded with every built-in converter.
    #[must_use]
    pub fn with_builtins() -> Self {
        let builtins: [Arc<dyn Converter>; 8] = [
            Arc::new(StringConverter),
            Arc::new(NumberConverter),
            Arc::new(BooleanConverter),
            Arc::new(DateConverter),
            Arc::new(StringSetConverter),
            Arc::new(ObjectConverter),
            Arc::new(ListConverter),
            Arc::new(JsonConverter),
        ];

        let mut registry = Self::empty();
        for converter in builtins {
            registry.register(converter);
        }

        registry
    }

    /// Register a converter under its own name, replacing any previous entry.
    pub fn register(&mut self, converter: Arc<dyn Converter>) -> &mut Self {
        self.converters
            .insert(converter.name().to_string(), converter);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Converter>> {
        self.converters.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
