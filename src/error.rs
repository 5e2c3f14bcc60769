//! Errors raised by fluent schema calls.
//!
//! Every failure is a programmer error at the call site (a bad argument to a
//! keyword setter), so there is a single error type and no recovery path: a
//! failing call returns `Err` and builds no new schema.

use serde_json::Value;
use thiserror::Error;

/// Errors produced while building a schema.
///
/// The `Display` impl names the offending keyword and the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `$id` was empty or the bare fragment `#`.
    #[error("id should not be an empty fragment <#> or an empty string <> (e.g. #myId), got {0:?}")]
    InvalidId(String),
    /// A name would appear twice in `required`.
    #[error("'required' has repeated keys, check your calls to .required(): {0:?}")]
    DuplicateRequired(String),
    /// A no-argument `.required()` was never resolved against a property.
    #[error("'required' was called on a root-level schema, check your calls to .required()")]
    UnresolvedRequired,
    /// A keyword received a value of the wrong shape.
    #[error("'{keyword}' must be {expected}, got {found}")]
    InvalidValue {
        keyword: String,
        expected: String,
        found: String,
    },
    /// A keyword was called on a schema whose type(s) do not define it.
    #[error("'{keyword}' is not available on a schema of type {types}")]
    KeywordNotAvailable { keyword: String, types: String },
    /// A type name outside the seven JSON Schema types.
    #[error("invalid type {0:?}, expected one of: string, number, integer, boolean, object, array, null")]
    UnknownType(String),
    /// A `format` name outside the supported set.
    #[error("'format' must be a supported format name, got {0:?}")]
    UnknownFormat(String),
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidValue`] describing `found` by its JSON type.
    pub(crate) fn invalid(keyword: &str, expected: &str, found: &Value) -> Self {
        ValidationError::InvalidValue {
            keyword: keyword.to_string(),
            expected: expected.to_string(),
            found: describe(found),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ValidationError>;

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
