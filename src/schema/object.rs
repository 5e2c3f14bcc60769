//! Object schemas: named properties and definitions, and the keywords that
//! constrain them.
//!
//! Properties are declared with [`ObjectKeywords::prop`]; keyword setters
//! chained right after a `prop` call apply to that property, so
//! `.prop("name", &string())?.min_length(1)?` constrains `name` and not the
//! object. Kind keywords are checked against the property's own `type`.
//! [`ObjectSchema::extend`], [`ObjectSchema::only`] and
//! [`ObjectSchema::without`] derive new object schemas from existing ones.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::schema::array::ArrayKeywords;
use crate::schema::base::{ensure_kind, impl_as_schema, set_keyword, AsSchema, FluentSchema};
use crate::schema::number::NumberKeywords;
use crate::schema::state::{SchemaState, Target};
use crate::schema::string::StringKeywords;
use crate::types::{BoolOrSchema, Dependency, Kind, Options};

/// Builder for `{"type": "object"}` schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    state: SchemaState,
    options: Options,
}

impl ObjectSchema {
    pub(crate) fn new(options: Options) -> Self {
        ObjectSchema {
            state: SchemaState::typed(Value::String("object".to_string())),
            options,
        }
    }

    pub(crate) fn from_state(state: SchemaState, options: Options) -> Self {
        ObjectSchema { state, options }
    }

    /// Deep-merge `other` into a copy of this schema. Properties and
    /// definitions with the same name are merged, new ones are appended.
    pub fn extend(&self, other: &ObjectSchema) -> Self {
        debug!("extending object schema");
        self.with_state(self.state.merged(&other.state))
    }

    /// Keep only the named properties (and their `required` entries).
    pub fn only<I, N>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let names = collect_names(names);
        self.with_state(
            self.state
                .filtered(|name| names.iter().any(|n| n.as_str() == name), false),
        )
    }

    /// Drop the named properties (and their `required` entries).
    pub fn without<I, N>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let names = collect_names(names);
        self.with_state(
            self.state
                .filtered(|name| !names.iter().any(|n| n.as_str() == name), true),
        )
    }
}

fn collect_names<I, N>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    names.into_iter().map(|n| n.as_ref().to_string()).collect()
}

impl_as_schema!(ObjectSchema);

impl FluentSchema for ObjectSchema {
    fn options(&self) -> Options {
        self.options
    }

    fn with_state(&self, state: SchemaState) -> Self {
        ObjectSchema {
            state,
            options: self.options,
        }
    }

    fn binds_id_to_root(&self) -> bool {
        true
    }
}

/// Object validation keywords and property composition.
pub trait ObjectKeywords: FluentSchema {
    /// Declare property `name` with the nested serialization of `schema`.
    ///
    /// A no-argument `required()` on `schema` makes `name` required here.
    /// With `generate_ids`, a missing `$id` becomes `#properties/<name>`.
    fn prop(&self, name: &str, schema: &dyn AsSchema) -> Result<Self> {
        insert_entry(self, Target::Properties, name, schema.state())
    }

    /// Declare property `name` accepting any value (`{}`).
    fn prop_any(&self, name: &str) -> Result<Self> {
        insert_entry(self, Target::Properties, name, &SchemaState::default())
    }

    /// Like [`ObjectKeywords::prop`], under `definitions`.
    fn definition(&self, name: &str, schema: &dyn AsSchema) -> Result<Self> {
        insert_entry(self, Target::Definitions, name, schema.state())
    }

    fn additional_properties<'a>(&self, value: impl Into<BoolOrSchema<'a>>) -> Result<Self> {
        set_keyword(
            self,
            Kind::Object,
            "additionalProperties",
            value.into().to_value(),
        )
    }

    fn max_properties(&self, max: u64) -> Result<Self> {
        set_keyword(self, Kind::Object, "maxProperties", Value::from(max))
    }

    fn min_properties(&self, min: u64) -> Result<Self> {
        set_keyword(self, Kind::Object, "minProperties", Value::from(min))
    }

    fn pattern_properties(&self, patterns: &[(&str, &dyn AsSchema)]) -> Result<Self> {
        let map = patterns
            .iter()
            .map(|(pattern, schema)| (pattern.to_string(), schema.value_of_nested()))
            .collect();
        set_keyword(self, Kind::Object, "patternProperties", Value::Object(map))
    }

    fn dependencies(&self, dependencies: &[(&str, Dependency<'_>)]) -> Result<Self> {
        let map = dependencies
            .iter()
            .map(|(name, dependency)| (name.to_string(), dependency.to_value()))
            .collect();
        set_keyword(self, Kind::Object, "dependencies", Value::Object(map))
    }

    fn dependent_required(&self, dependencies: &[(&str, &[&str])]) -> Result<Self> {
        let map: Map<String, Value> = dependencies
            .iter()
            .map(|(name, required)| {
                let required = required.iter().map(|r| Value::from(*r)).collect();
                (name.to_string(), Value::Array(required))
            })
            .collect();
        set_keyword(self, Kind::Object, "dependentRequired", Value::Object(map))
    }

    fn dependent_schemas(&self, dependencies: &[(&str, &dyn AsSchema)]) -> Result<Self> {
        let map = dependencies
            .iter()
            .map(|(name, schema)| (name.to_string(), schema.value_of_nested()))
            .collect();
        set_keyword(self, Kind::Object, "dependentSchemas", Value::Object(map))
    }

    fn property_names(&self, schema: &dyn AsSchema) -> Result<Self> {
        set_keyword(self, Kind::Object, "propertyNames", schema.value_of_nested())
    }
}

impl ObjectKeywords for ObjectSchema {}

// Reachable only through a declared property: on the object itself these
// keywords fail the kind check.
impl StringKeywords for ObjectSchema {}

impl NumberKeywords for ObjectSchema {
    fn integer_only(&self) -> bool {
        false
    }
}

impl ArrayKeywords for ObjectSchema {}

fn insert_entry<S: FluentSchema>(
    schema: &S,
    target: Target,
    name: &str,
    sub: &SchemaState,
) -> Result<S> {
    ensure_kind(schema, Kind::Object, target.keyword())?;
    let state = schema
        .state()
        .with_entry(target, name, sub, schema.options())?;
    Ok(schema.with_state(state))
}
