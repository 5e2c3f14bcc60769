use serde_json::Value;

use crate::schema::base::{impl_as_schema, FluentSchema};
use crate::schema::state::SchemaState;
use crate::types::Options;

/// Builder for `{"type": "boolean"}` schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanSchema {
    state: SchemaState,
    options: Options,
}

impl BooleanSchema {
    pub(crate) fn new(options: Options) -> Self {
        BooleanSchema {
            state: SchemaState::typed(Value::String("boolean".to_string())),
            options,
        }
    }

    pub(crate) fn from_state(state: SchemaState, options: Options) -> Self {
        BooleanSchema { state, options }
    }
}

impl_as_schema!(BooleanSchema);

impl FluentSchema for BooleanSchema {
    fn options(&self) -> Options {
        self.options
    }

    fn with_state(&self, state: SchemaState) -> Self {
        BooleanSchema {
            state,
            options: self.options,
        }
    }
}

/// Builder for `{"type": "null"}` schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct NullSchema {
    state: SchemaState,
    options: Options,
}

impl NullSchema {
    pub(crate) fn new(options: Options) -> Self {
        NullSchema {
            state: SchemaState::document(),
            options,
        }
        .null()
    }

    /// Set `type` to `"null"`.
    pub fn null(&self) -> Self {
        self.with_state(self.state.with_attribute("type", Value::String("null".to_string())))
    }
}

impl_as_schema!(NullSchema);

impl FluentSchema for NullSchema {
    fn options(&self) -> Options {
        self.options
    }

    fn with_state(&self, state: SchemaState) -> Self {
        NullSchema {
            state,
            options: self.options,
        }
    }
}
