use crate::{convert::ConvertError, db::store::StoreError, key::KeyPathError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured runtime error with a stable classification.
/// `class` answers "what went wrong", `origin` answers "which layer noticed".
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl Error {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a validation error (bad caller input, raised before any store call).
    pub fn validation(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Validation, origin, message)
    }

    /// Construct a configuration error (unresolvable or ambiguous metadata).
    pub fn configuration(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, origin, message)
    }

    /// Construct a wire-decode corruption error.
    pub fn corruption(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, origin, message)
    }

    /// Construct an internal invariant error.
    pub fn internal(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, origin, message)
    }

    /// Construct a not-found error for a rendered key.
    pub fn not_found(type_name: &str, key: impl Into<String>) -> Self {
        let key = key.into();

        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Manager,
            format!("{type_name} not found: {key}"),
        )
    }

    /// Wrap a store failure, keeping the original error as detail.
    ///
    /// Conditional-write rejections become `ConditionFailed`; everything else
    /// passes through as `Transport`.
    pub fn from_store(err: StoreError) -> Self {
        let class = match err {
            StoreError::ConditionFailed { .. } => ErrorClass::ConditionFailed,
            StoreError::Transport { .. } => ErrorClass::Transport,
        };

        Self {
            class,
            origin: ErrorOrigin::Store,
            message: err.to_string(),
            detail: Some(ErrorDetail::Store(err)),
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.class, ErrorClass::Validation)
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.class, ErrorClass::Configuration)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_condition_failed(&self) -> bool {
        matches!(self.class, ErrorClass::ConditionFailed)
    }

    /// Borrow the original store error, if this error came from the store.
    #[must_use]
    pub const fn store_error(&self) -> Option<&StoreError> {
        match &self.detail {
            Some(ErrorDetail::Store(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<ConvertError> for Error {
    fn from(err: ConvertError) -> Self {
        Self::validation(ErrorOrigin::Convert, err.to_string())
    }
}

impl From<KeyPathError> for Error {
    fn from(err: KeyPathError) -> Self {
        match err {
            KeyPathError::InvalidTemplate { .. } => {
                Self::configuration(ErrorOrigin::Key, err.to_string())
            }
            KeyPathError::MissingValue { .. }
            | KeyPathError::UnsupportedValue { .. }
            | KeyPathError::Mismatch { .. } => Self::validation(ErrorOrigin::Key, err.to_string()),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::from_store(err)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`Error`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Store(StoreError),
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    ConditionFailed,
    Configuration,
    Transport,
    Corruption,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::ConditionFailed => "condition_failed",
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Schema,
    Resolve,
    Path,
    Key,
    Expression,
    Convert,
    Store,
    Manager,
    Cursor,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Resolve => "resolve",
            Self::Path => "path",
            Self::Key => "key",
            Self::Expression => "expression",
            Self::Convert => "convert",
            Self::Store => "store",
            Self::Manager => "manager",
            Self::Cursor => "cursor",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_condition_failure_maps_to_condition_failed_class() {
        let err = Error::from(StoreError::ConditionFailed {
            message: "version mismatch".to_string(),
        });

        assert!(err.is_condition_failed());
        assert_eq!(err.origin, ErrorOrigin::Store);
        assert!(err.store_error().is_some(), "original store error must be kept");
    }

    #[test]
    fn transport_failures_pass_through_with_detail() {
        let err = Error::from(StoreError::Transport {
            message: "throttled".to_string(),
        });

        assert_eq!(err.class, ErrorClass::Transport);
        assert!(matches!(
            err.store_error(),
            Some(StoreError::Transport { message }) if message == "throttled"
        ));
        assert_eq!(err.display_with_class(), "store:transport: store transport failure: throttled");
    }

    #[test]
    fn key_template_errors_are_configuration_errors() {
        let err = Error::from(KeyPathError::InvalidTemplate {
            template: ":a:b".to_string(),
            reason: "adjacent placeholders".to_string(),
        });

        assert!(err.is_configuration());
        assert_eq!(err.origin, ErrorOrigin::Key);
    }
}
