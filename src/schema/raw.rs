//! [`Schema`], the sum of every builder kind, and ingestion of
//! already-serialized JSON Schema back into builders.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, ValidationError};
use crate::schema::array::{ArrayKeywords, ArraySchema};
use crate::schema::base::{serialize_root, AsSchema, BaseSchema, FluentSchema};
use crate::schema::mixed::MixedSchema;
use crate::schema::number::{NumberKeywords, NumberSchema};
use crate::schema::object::{ObjectKeywords, ObjectSchema};
use crate::schema::primitive::{BooleanSchema, NullSchema};
use crate::schema::state::{Entries, Required, SchemaState};
use crate::schema::string::{StringKeywords, StringSchema};
use crate::types::{Kind, Options};

/// Any builder.
///
/// Returned by raw ingestion, and usable wherever a single type must hold
/// schemas of different kinds. Every keyword trait is implemented; keywords
/// that do not belong to the wrapped kind fail with
/// [`ValidationError::KeywordNotAvailable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Base(BaseSchema),
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Null(NullSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    Mixed(MixedSchema),
}

macro_rules! each_kind {
    ($schema:expr, $inner:ident => $body:expr) => {
        match $schema {
            Schema::Base($inner) => $body,
            Schema::String($inner) => $body,
            Schema::Number($inner) => $body,
            Schema::Boolean($inner) => $body,
            Schema::Null($inner) => $body,
            Schema::Array($inner) => $body,
            Schema::Object($inner) => $body,
            Schema::Mixed($inner) => $body,
        }
    };
}

impl Schema {
    /// The single kind of this schema; `None` for untyped and mixed schemas.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Schema::Base(_) | Schema::Mixed(_) => None,
            Schema::String(_) => Some(Kind::String),
            Schema::Number(schema) => Some(schema.kind()),
            Schema::Boolean(_) => Some(Kind::Boolean),
            Schema::Null(_) => Some(Kind::Null),
            Schema::Array(_) => Some(Kind::Array),
            Schema::Object(_) => Some(Kind::Object),
        }
    }

    pub fn into_object(self) -> Option<ObjectSchema> {
        match self {
            Schema::Object(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<StringSchema> {
        match self {
            Schema::String(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn into_number(self) -> Option<NumberSchema> {
        match self {
            Schema::Number(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<ArraySchema> {
        match self {
            Schema::Array(schema) => Some(schema),
            _ => None,
        }
    }
}

impl AsSchema for Schema {
    fn state(&self) -> &SchemaState {
        each_kind!(self, schema => schema.state())
    }
}

impl serde::Serialize for Schema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_root(self, serializer)
    }
}

impl FluentSchema for Schema {
    fn options(&self) -> Options {
        each_kind!(self, schema => schema.options())
    }

    fn with_state(&self, state: SchemaState) -> Self {
        match self {
            Schema::Base(schema) => Schema::Base(schema.with_state(state)),
            Schema::String(schema) => Schema::String(schema.with_state(state)),
            Schema::Number(schema) => Schema::Number(schema.with_state(state)),
            Schema::Boolean(schema) => Schema::Boolean(schema.with_state(state)),
            Schema::Null(schema) => Schema::Null(schema.with_state(state)),
            Schema::Array(schema) => Schema::Array(schema.with_state(state)),
            Schema::Object(schema) => Schema::Object(schema.with_state(state)),
            Schema::Mixed(schema) => Schema::Mixed(schema.with_state(state)),
        }
    }

    fn supports(&self, kind: Kind) -> bool {
        match self {
            Schema::Mixed(schema) => schema.supports(kind),
            Schema::Number(_) => matches!(kind, Kind::Number | Kind::Integer),
            _ => self.kind() == Some(kind),
        }
    }

    fn binds_id_to_root(&self) -> bool {
        each_kind!(self, schema => schema.binds_id_to_root())
    }
}

impl StringKeywords for Schema {}

impl NumberKeywords for Schema {
    fn integer_only(&self) -> bool {
        match self {
            Schema::Number(schema) => schema.integer_only(),
            Schema::Mixed(schema) => schema.integer_only(),
            _ => false,
        }
    }
}

impl ArrayKeywords for Schema {}

impl ObjectKeywords for Schema {}

macro_rules! impl_from_kind {
    ($($variant:ident($kind:ty)),* $(,)?) => {
        $(
            impl From<$kind> for Schema {
                fn from(schema: $kind) -> Self {
                    Schema::$variant(schema)
                }
            }
        )*
    };
}

impl_from_kind!(
    Base(BaseSchema),
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Null(NullSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    Mixed(MixedSchema),
);

/// Rebuild a builder from a serialized schema, dispatching on `type`.
///
/// Object schemas get their `properties`, `definitions` and `required` back
/// as builder entries, so they keep composing like any object builder. A
/// missing, unknown or list-valued `type` yields a [`BaseSchema`] holding the
/// fragment verbatim.
pub(crate) fn ingest(fragment: Value, options: Options) -> Result<Schema> {
    let attributes = match fragment {
        Value::Object(attributes) => attributes,
        other => return Err(ValidationError::invalid("raw", "a JSON object", &other)),
    };

    let kind = attributes
        .get("type")
        .and_then(Value::as_str)
        .and_then(|name| name.parse::<Kind>().ok());
    debug!(kind = ?kind, "ingesting raw schema");

    let schema = match kind {
        Some(Kind::String) => Schema::String(StringSchema::from_state(
            SchemaState::from_attributes(attributes),
            options,
        )),
        Some(kind @ (Kind::Number | Kind::Integer)) => Schema::Number(NumberSchema::from_state(
            SchemaState::from_attributes(attributes),
            options,
            kind,
        )),
        Some(Kind::Boolean) => Schema::Boolean(BooleanSchema::from_state(
            SchemaState::from_attributes(attributes),
            options,
        )),
        Some(Kind::Array) => Schema::Array(ArraySchema::from_state(
            SchemaState::from_attributes(attributes),
            options,
        )),
        Some(Kind::Object) => Schema::Object(ObjectSchema::from_state(
            object_state(attributes),
            options,
        )),
        Some(Kind::Null) | None => Schema::Base(BaseSchema::from_state(
            SchemaState::from_attributes(attributes),
            options,
        )),
    };
    Ok(schema)
}

fn object_state(attributes: Map<String, Value>) -> SchemaState {
    let mut state = SchemaState::default();
    for (key, value) in attributes {
        match (key.as_str(), &value) {
            ("properties", Value::Object(properties)) => {
                state.properties = Entries::from_map(properties);
            }
            ("definitions", Value::Object(definitions)) => {
                state.definitions = Entries::from_map(definitions);
            }
            ("required", Value::Array(names)) => {
                state.required = required_names(names);
            }
            _ => {
                state.attributes.insert(key, value);
            }
        }
    }
    state
}

fn required_names(names: &[Value]) -> Vec<Required> {
    names
        .iter()
        .filter_map(|name| match name {
            Value::String(name) => Some(Required::Name(name.clone())),
            other => {
                warn!(entry = %other, "skipping non-string entry in 'required'");
                None
            }
        })
        .collect()
}
