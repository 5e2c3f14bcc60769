use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::schema::base::{impl_as_schema, set_keyword, AsSchema, FluentSchema};
use crate::schema::state::SchemaState;
use crate::types::{BoolOrSchema, Kind, Options};

/// Builder for `{"type": "array"}` schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    state: SchemaState,
    options: Options,
}

impl ArraySchema {
    pub(crate) fn new(options: Options) -> Self {
        ArraySchema {
            state: SchemaState::typed(Value::String("array".to_string())),
            options,
        }
    }

    pub(crate) fn from_state(state: SchemaState, options: Options) -> Self {
        ArraySchema { state, options }
    }
}

impl_as_schema!(ArraySchema);

impl FluentSchema for ArraySchema {
    fn options(&self) -> Options {
        self.options
    }

    fn with_state(&self, state: SchemaState) -> Self {
        ArraySchema {
            state,
            options: self.options,
        }
    }
}

/// Array validation keywords.
pub trait ArrayKeywords: FluentSchema {
    /// Every item must match `schema`.
    fn items(&self, schema: &dyn AsSchema) -> Result<Self> {
        set_keyword(self, Kind::Array, "items", schema.value_of_nested())
    }

    /// Tuple validation: item `i` must match `schemas[i]`.
    fn items_tuple(&self, schemas: &[&dyn AsSchema]) -> Result<Self> {
        if schemas.is_empty() {
            return Err(ValidationError::invalid(
                "items",
                "a schema or a non-empty list of schemas",
                &Value::Array(Vec::new()),
            ));
        }
        let items = schemas.iter().map(|s| s.value_of_nested()).collect();
        set_keyword(self, Kind::Array, "items", Value::Array(items))
    }

    fn additional_items<'a>(&self, value: impl Into<BoolOrSchema<'a>>) -> Result<Self> {
        set_keyword(self, Kind::Array, "additionalItems", value.into().to_value())
    }

    fn contains(&self, schema: &dyn AsSchema) -> Result<Self> {
        set_keyword(self, Kind::Array, "contains", schema.value_of_nested())
    }

    fn unique_items(&self, unique: bool) -> Result<Self> {
        set_keyword(self, Kind::Array, "uniqueItems", Value::Bool(unique))
    }

    fn min_items(&self, min: u64) -> Result<Self> {
        set_keyword(self, Kind::Array, "minItems", Value::from(min))
    }

    fn max_items(&self, max: u64) -> Result<Self> {
        set_keyword(self, Kind::Array, "maxItems", Value::from(max))
    }
}

impl ArrayKeywords for ArraySchema {}
