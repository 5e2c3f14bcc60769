use serde_json::{Number, Value};

use crate::error::{Result, ValidationError};
use crate::schema::base::{ensure_target_kind, impl_as_schema, type_kinds, FluentSchema};
use crate::schema::state::SchemaState;
use crate::types::{Kind, Options};

/// Builder for `number` and `integer` schemas. Both share the numeric
/// keywords; integer schemas additionally reject non-integral values.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSchema {
    state: SchemaState,
    options: Options,
    kind: Kind,
}

impl NumberSchema {
    pub(crate) fn number(options: Options) -> Self {
        Self::typed(Kind::Number, options)
    }

    pub(crate) fn integer(options: Options) -> Self {
        Self::typed(Kind::Integer, options)
    }

    fn typed(kind: Kind, options: Options) -> Self {
        NumberSchema {
            state: SchemaState::typed(Value::String(kind.as_str().to_string())),
            options,
            kind,
        }
    }

    pub(crate) fn from_state(state: SchemaState, options: Options, kind: Kind) -> Self {
        NumberSchema {
            state,
            options,
            kind,
        }
    }

    /// [`Kind::Number`] or [`Kind::Integer`].
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_integer(&self) -> bool {
        self.kind == Kind::Integer
    }
}

impl_as_schema!(NumberSchema);

impl FluentSchema for NumberSchema {
    fn options(&self) -> Options {
        self.options
    }

    fn with_state(&self, state: SchemaState) -> Self {
        NumberSchema {
            state,
            options: self.options,
            kind: self.kind,
        }
    }
}

/// Numeric validation keywords. Values are anything convertible to a JSON
/// value; non-numbers are rejected.
pub trait NumberKeywords: FluentSchema {
    /// Whether keyword values must be integral.
    fn integer_only(&self) -> bool;

    fn minimum(&self, value: impl Into<Value>) -> Result<Self> {
        set_number(self, "minimum", value.into())
    }

    fn maximum(&self, value: impl Into<Value>) -> Result<Self> {
        set_number(self, "maximum", value.into())
    }

    fn exclusive_minimum(&self, value: impl Into<Value>) -> Result<Self> {
        set_number(self, "exclusiveMinimum", value.into())
    }

    fn exclusive_maximum(&self, value: impl Into<Value>) -> Result<Self> {
        set_number(self, "exclusiveMaximum", value.into())
    }

    fn multiple_of(&self, value: impl Into<Value>) -> Result<Self> {
        set_number(self, "multipleOf", value.into())
    }
}

impl NumberKeywords for NumberSchema {
    fn integer_only(&self) -> bool {
        self.is_integer()
    }
}

fn set_number<S: NumberKeywords>(schema: &S, keyword: &str, value: Value) -> Result<S> {
    ensure_target_kind(schema, Kind::Number, keyword)?;
    let number = match value {
        Value::Number(number) => number,
        other => return Err(ValidationError::invalid(keyword, "a number", &other)),
    };
    let value = if targets_integer(schema) {
        integral(keyword, number)?
    } else {
        Value::Number(number)
    };
    Ok(schema.with_state(schema.state().with_attribute(keyword, value)))
}

/// Whether the schema a numeric keyword lands on only admits integers.
fn targets_integer<S: NumberKeywords>(schema: &S) -> bool {
    match schema.state().last_property() {
        Some(property) => property.get("type").map_or(false, |schema_type| {
            let kinds = type_kinds(schema_type);
            kinds.contains(&Kind::Integer) && !kinds.contains(&Kind::Number)
        }),
        None => schema.integer_only(),
    }
}

// 2^63: integral floats at or above this do not fit an i64
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Integral floats such as `5.0` are normalized to `5`.
fn integral(keyword: &str, number: Number) -> Result<Value> {
    if number.is_i64() || number.is_u64() {
        return Ok(Value::Number(number));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < I64_BOUND => Ok(Value::from(f as i64)),
        _ => Err(ValidationError::invalid(
            keyword,
            "an integer",
            &Value::Number(number),
        )),
    }
}
