use crate::key::{KeyPathError, KeySource};
use std::{collections::BTreeMap, fmt};

/// Default reserved separator for structured keys.
pub const DEFAULT_SEPARATOR: char = '/';

///
/// Segment
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

///
/// KeyTemplate
///
/// Literal/placeholder pattern such as `":account/:directory"`.
///
/// A placeholder is `:` followed by one or more ASCII alphanumerics or
/// underscores; every other character is literal. Placeholder values must not
/// contain the reserved separator, otherwise `parse(compile(..))` is not
/// guaranteed to reproduce the input.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyTemplate {
    source: String,
    segments: Vec<Segment>,
    separator: char,
}

impl KeyTemplate {
    pub fn new(source: &str) -> Result<Self, KeyPathError> {
        Self::with_separator(source, DEFAULT_SEPARATOR)
    }

    pub fn with_separator(source: &str, separator: char) -> Result<Self, KeyPathError> {
        let invalid = |reason: &str| KeyPathError::InvalidTemplate {
            template: source.to_string(),
            reason: reason.to_string(),
        };

        if source.is_empty() {
            return Err(invalid("template is empty"));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            let starts_placeholder = c == ':' && chars.peek().is_some_and(|n| is_ident_char(*n));
            if !starts_placeholder {
                literal.push(c);
                continue;
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            if matches!(segments.last(), Some(Segment::Placeholder(_))) {
                return Err(invalid("adjacent placeholders cannot be parsed back apart"));
            }

            let mut name = String::new();
            while let Some(n) = chars.peek().copied().filter(|n| is_ident_char(*n)) {
                name.push(n);
                chars.next();
            }
            segments.push(Segment::Placeholder(name));
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            separator,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every placeholder; a missing value is an error.
    pub fn compile(&self, source: &dyn KeySource) -> Result<String, KeyPathError> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Placeholder(name) => {
                    let value =
                        source
                            .key_value(name)?
                            .ok_or_else(|| KeyPathError::MissingValue {
                                template: self.source.clone(),
                                field: name.clone(),
                            })?;
                    if value.contains(self.separator) {
                        tracing::warn!(
                            template = %self.source,
                            field = %name,
                            "key value contains the reserved separator; parse may not round-trip"
                        );
                    }
                    out.push_str(&value);
                }
            }
        }

        Ok(out)
    }

    /// Compile up to (not including) the first unset placeholder.
    ///
    /// Used for `BEGINS_WITH` sort conditions, where a partially known key
    /// selects every row sharing the prefix.
    pub fn compile_prefix(&self, source: &dyn KeySource) -> Result<String, KeyPathError> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Placeholder(name) => match source.key_value(name)? {
                    Some(value) => out.push_str(&value),
                    None => break,
                },
            }
        }

        Ok(out)
    }

    /// Structural inverse of [`compile`](Self::compile).
    pub fn parse(&self, compiled: &str) -> Result<BTreeMap<String, String>, KeyPathError> {
        let mismatch = |reason: String| KeyPathError::Mismatch {
            template: self.source.clone(),
            value: compiled.to_string(),
            reason,
        };

        let mut fields = BTreeMap::new();
        let mut rest = compiled;

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    rest = rest
                        .strip_prefix(literal.as_str())
                        .ok_or_else(|| mismatch(format!("expected literal '{literal}'")))?;
                }
                Segment::Placeholder(name) => {
                    let end = match self.segments.get(idx + 1) {
                        Some(Segment::Literal(next)) => rest.find(next.as_str()).ok_or_else(|| {
                            mismatch(format!("literal '{next}' after ':{name}' not found"))
                        })?,
                        _ => rest.len(),
                    };
                    fields.insert(name.clone(), rest[..end].to_string());
                    rest = &rest[end..];
                }
            }
        }

        if !rest.is_empty() {
            return Err(mismatch(format!("unexpected trailing '{rest}'")));
        }

        Ok(fields)
    }
}

impl fmt::Display for KeyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
