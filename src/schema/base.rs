//! Capability traits shared by every schema kind, and the untyped
//! [`BaseSchema`].
//!
//! - [`AsSchema`]: read side (state access and serialization). Object safe,
//!   so heterogeneous sub-schemas can be passed as `&dyn AsSchema`.
//! - [`FluentSchema`]: the plumbing a concrete builder provides.
//! - [`Keywords`]: annotations and keywords valid on every schema.
//! - [`Compose`]: `not`, `allOf`/`anyOf`/`oneOf` and `if`/`then`/`else`.
//!
//! `Keywords` and `Compose` are implemented for every `FluentSchema`.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::schema::state::SchemaState;
use crate::types::{Kind, Options};

/// Anything that serializes to a JSON Schema.
pub trait AsSchema {
    fn state(&self) -> &SchemaState;

    /// Serialize as a root document.
    ///
    /// Fails when a no-argument `required()` was never resolved against a
    /// property.
    fn value_of(&self) -> Result<Value> {
        self.state().serialize(true)
    }

    /// Serialize for embedding inside another schema: no `$schema`, and
    /// unresolved required markers are left out.
    fn value_of_nested(&self) -> Value {
        Value::Object(self.state().flatten(false))
    }
}

/// A concrete builder kind.
pub trait FluentSchema: AsSchema + Clone {
    fn options(&self) -> Options;

    /// A builder of the same kind holding `state`.
    fn with_state(&self, state: SchemaState) -> Self;

    /// Whether keywords of `kind` may be set on this builder.
    fn supports(&self, _kind: Kind) -> bool {
        true
    }

    /// Whether `$id` always binds to the schema itself, even after
    /// properties have been declared.
    fn binds_id_to_root(&self) -> bool {
        false
    }
}

/// Fail unless `schema` itself accepts keywords of `kind`.
pub(crate) fn ensure_kind<S: FluentSchema>(schema: &S, kind: Kind, keyword: &str) -> Result<()> {
    if schema.supports(kind) {
        return Ok(());
    }
    Err(not_available(keyword, schema.state().attributes.get("type")))
}

/// Fail unless the schema a targeted keyword lands on accepts keywords of
/// `kind`: the most recent property when there is one, `schema` otherwise.
/// A property without `type` accepts every kind.
pub(crate) fn ensure_target_kind<S: FluentSchema>(
    schema: &S,
    kind: Kind,
    keyword: &str,
) -> Result<()> {
    let Some(property) = schema.state().last_property() else {
        return ensure_kind(schema, kind, keyword);
    };
    match property.get("type") {
        Some(schema_type) if !type_allows(schema_type, kind) => {
            Err(not_available(keyword, Some(schema_type)))
        }
        _ => Ok(()),
    }
}

/// The known kinds named by a `type` value, either a single name or a list.
pub(crate) fn type_kinds(schema_type: &Value) -> Vec<Kind> {
    match schema_type {
        Value::String(name) => name.parse().into_iter().collect(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|name| name.parse().ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn type_allows(schema_type: &Value, kind: Kind) -> bool {
    let kinds = type_kinds(schema_type);
    match kind {
        Kind::Number | Kind::Integer => {
            kinds.contains(&Kind::Number) || kinds.contains(&Kind::Integer)
        }
        kind => kinds.contains(&kind),
    }
}

fn not_available(keyword: &str, schema_type: Option<&Value>) -> ValidationError {
    let types = match schema_type {
        Some(value) => value.to_string(),
        None => "<untyped>".to_string(),
    };
    ValidationError::KeywordNotAvailable {
        keyword: keyword.to_string(),
        types,
    }
}

/// Set a kind-specific keyword using attribute targeting.
pub(crate) fn set_keyword<S: FluentSchema>(
    schema: &S,
    kind: Kind,
    keyword: &str,
    value: Value,
) -> Result<S> {
    ensure_target_kind(schema, kind, keyword)?;
    Ok(schema.with_state(schema.state().with_attribute(keyword, value)))
}

pub(crate) fn serialize_root<T, S>(schema: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: AsSchema + ?Sized,
    S: serde::Serializer,
{
    schema
        .value_of()
        .map_err(serde::ser::Error::custom)?
        .serialize(serializer)
}

/// Implements [`AsSchema`] and `Serialize` for a builder with a `state` field.
macro_rules! impl_as_schema {
    ($name:ident) => {
        impl $crate::schema::AsSchema for $name {
            fn state(&self) -> &$crate::schema::SchemaState {
                &self.state
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                $crate::schema::base::serialize_root(self, serializer)
            }
        }
    };
}

pub(crate) use impl_as_schema;

/// Keywords valid on every schema kind.
///
/// Single-keyword setters apply to the most recently declared property when
/// there is one, and to the schema itself otherwise.
pub trait Keywords: FluentSchema {
    /// Set `$id`. Empty ids and the bare fragment `#` are rejected.
    fn id(&self, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id == "#" {
            return Err(ValidationError::InvalidId(id));
        }
        let state = if self.binds_id_to_root() {
            self.state().with_root_attribute("$id", Value::String(id))
        } else {
            self.state().with_attribute("$id", Value::String(id))
        };
        Ok(self.with_state(state))
    }

    fn title(&self, title: impl Into<String>) -> Self {
        self.with_state(self.state().with_attribute("title", Value::String(title.into())))
    }

    fn description(&self, description: impl Into<String>) -> Self {
        self.with_state(
            self.state()
                .with_attribute("description", Value::String(description.into())),
        )
    }

    fn examples<I, V>(&self, examples: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let examples = examples.into_iter().map(Into::into).collect();
        self.with_state(self.state().with_attribute("examples", Value::Array(examples)))
    }

    /// The `enum` keyword.
    fn enum_values<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.with_state(self.state().with_attribute("enum", Value::Array(values)))
    }

    /// The `const` keyword.
    fn constant(&self, value: impl Into<Value>) -> Self {
        self.with_state(self.state().with_attribute("const", value.into()))
    }

    /// The `default` keyword.
    fn default_value(&self, value: impl Into<Value>) -> Self {
        self.with_state(self.state().with_attribute("default", value.into()))
    }

    /// The `$ref` keyword.
    fn reference(&self, reference: impl Into<String>) -> Self {
        self.with_state(self.state().with_attribute("$ref", Value::String(reference.into())))
    }

    fn read_only(&self, read_only: bool) -> Self {
        self.with_state(self.state().with_attribute("readOnly", Value::Bool(read_only)))
    }

    fn write_only(&self, write_only: bool) -> Self {
        self.with_state(self.state().with_attribute("writeOnly", Value::Bool(write_only)))
    }

    fn deprecated(&self, deprecated: bool) -> Self {
        self.with_state(self.state().with_attribute("deprecated", Value::Bool(deprecated)))
    }

    /// Mark the most recently declared property as required. Without a
    /// property the schema itself is marked, which resolves when it is
    /// embedded with `prop` and is an error at the document root.
    fn required(&self) -> Result<Self> {
        Ok(self.with_state(self.state().with_required_last()?))
    }

    /// Append names to `required`. Duplicates are rejected.
    fn required_names<I, N>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        Ok(self.with_state(self.state().with_required_names(names)?))
    }

    /// Merge a JSON object fragment onto the most recent property or the
    /// schema itself. Fragment keys win.
    fn raw(&self, fragment: Value) -> Result<Self> {
        match fragment {
            Value::Object(fragment) => Ok(self.with_state(self.state().with_fragment(fragment))),
            other => Err(ValidationError::invalid("raw", "a JSON object", &other)),
        }
    }
}

impl<T: FluentSchema> Keywords for T {}

/// Combinators and conditionals. These always apply to the schema itself.
pub trait Compose: FluentSchema {
    fn not(&self, schema: &dyn AsSchema) -> Self {
        let not = schema
            .state()
            .embedded(&["definitions"], self.options(), Some("#not"));
        self.with_state(self.state().with_root_attribute("not", not))
    }

    fn all_of(&self, schemas: &[&dyn AsSchema]) -> Self {
        compose(self, "allOf", schemas)
    }

    fn any_of(&self, schemas: &[&dyn AsSchema]) -> Self {
        compose(self, "anyOf", schemas)
    }

    fn one_of(&self, schemas: &[&dyn AsSchema]) -> Self {
        compose(self, "oneOf", schemas)
    }

    fn if_then(&self, if_schema: &dyn AsSchema, then_schema: &dyn AsSchema) -> Self {
        let state = self
            .state()
            .with_root_attribute("if", clause(self, if_schema, "#if"))
            .with_root_attribute("then", clause(self, then_schema, "#then"));
        self.with_state(state)
    }

    fn if_then_else(
        &self,
        if_schema: &dyn AsSchema,
        then_schema: &dyn AsSchema,
        else_schema: &dyn AsSchema,
    ) -> Self {
        let state = self
            .state()
            .with_root_attribute("if", clause(self, if_schema, "#if"))
            .with_root_attribute("then", clause(self, then_schema, "#then"))
            .with_root_attribute("else", clause(self, else_schema, "#else"));
        self.with_state(state)
    }
}

impl<T: FluentSchema> Compose for T {}

fn compose<S: FluentSchema>(schema: &S, keyword: &str, schemas: &[&dyn AsSchema]) -> S {
    let values = schemas.iter().map(|s| s.value_of_nested()).collect();
    schema.with_state(schema.state().with_root_attribute(keyword, Value::Array(values)))
}

fn clause<S: FluentSchema>(schema: &S, clause: &dyn AsSchema, parent_id: &str) -> Value {
    clause
        .state()
        .embedded(&["definitions", "type"], schema.options(), Some(parent_id))
}

/// A schema with no type: the root factory's own builder, `$ref`s, and raw
/// fragments whose `type` is not a single known kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseSchema {
    state: SchemaState,
    options: Options,
}

impl BaseSchema {
    pub(crate) fn new(options: Options) -> Self {
        BaseSchema {
            state: SchemaState::document(),
            options,
        }
    }

    pub(crate) fn from_state(state: SchemaState, options: Options) -> Self {
        BaseSchema { state, options }
    }
}

impl_as_schema!(BaseSchema);

impl FluentSchema for BaseSchema {
    fn options(&self) -> Options {
        self.options
    }

    fn with_state(&self, state: SchemaState) -> Self {
        BaseSchema {
            state,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ObjectKeywords, ObjectSchema, StringSchema};
    use crate::types::DRAFT_07;
    use serde_json::json;

    fn base() -> BaseSchema {
        BaseSchema::new(Options::default())
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(base().value_of().unwrap(), json!({"$schema": DRAFT_07}));
        assert_eq!(base().value_of_nested(), json!({}));
    }

    #[test]
    fn test_annotations() {
        let schema = base()
            .title("A title")
            .description("A description")
            .examples(["x", "y"])
            .default_value("x")
            .read_only(true)
            .write_only(false)
            .deprecated(true);

        assert_eq!(
            schema.value_of_nested(),
            json!({
                "title": "A title",
                "description": "A description",
                "examples": ["x", "y"],
                "default": "x",
                "readOnly": true,
                "writeOnly": false,
                "deprecated": true
            })
        );
    }

    #[test]
    fn test_enum_and_const() {
        let schema = base().enum_values([json!(1), json!("two"), json!(null)]).constant(1);
        assert_eq!(
            schema.value_of_nested(),
            json!({"enum": [1, "two", null], "const": 1})
        );
    }

    #[test]
    fn test_id_validation() {
        assert_eq!(base().id(""), Err(ValidationError::InvalidId(String::new())));
        assert_eq!(base().id("#"), Err(ValidationError::InvalidId("#".to_string())));
        assert_eq!(
            base().id("#myId").unwrap().value_of_nested(),
            json!({"$id": "#myId"})
        );
    }

    #[test]
    fn test_reference() {
        assert_eq!(
            base().reference("#/definitions/a").value_of_nested(),
            json!({"$ref": "#/definitions/a"})
        );
    }

    #[test]
    fn test_raw_fragment() {
        let schema = base().raw(json!({"nullable": true})).unwrap();
        assert_eq!(schema.value_of_nested(), json!({"nullable": true}));
        assert!(base().raw(json!([1, 2])).is_err());
    }

    #[test]
    fn test_required_on_root_fails() {
        let schema = base().required().unwrap();
        assert_eq!(schema.value_of(), Err(ValidationError::UnresolvedRequired));
        assert!(schema.required().is_err());
    }

    #[test]
    fn test_required_names() {
        let schema = base().required_names(["a", "b"]).unwrap();
        assert_eq!(schema.value_of_nested(), json!({"required": ["a", "b"]}));
        assert!(schema.required_names(["b"]).is_err());
    }

    #[test]
    fn test_combinators() {
        let a = base().constant("a");
        let b = base().constant("b");
        let schema = base().any_of(&[&a, &b]).all_of(&[&a]).one_of(&[&b]);
        assert_eq!(
            schema.value_of().unwrap(),
            json!({
                "$schema": DRAFT_07,
                "anyOf": [{"const": "a"}, {"const": "b"}],
                "allOf": [{"const": "a"}],
                "oneOf": [{"const": "b"}]
            })
        );
    }

    #[test]
    fn test_not() {
        let schema = base().not(&base().constant(1));
        assert_eq!(schema.value_of_nested(), json!({"not": {"const": 1}}));
    }

    #[test]
    fn test_if_then_else_strips_type() {
        let typed = BaseSchema::from_state(SchemaState::typed(json!("object")), Options::default())
            .required_names(["a"])
            .unwrap();
        let schema = base().if_then_else(&typed, &base().constant(1), &base().constant(2));
        assert_eq!(
            schema.value_of_nested(),
            json!({
                "if": {"required": ["a"]},
                "then": {"const": 1},
                "else": {"const": 2}
            })
        );
    }

    fn generated() -> Options {
        Options::with_generated_ids()
    }

    fn object_with_prop(name: &str) -> ObjectSchema {
        ObjectSchema::new(generated())
            .prop(name, &StringSchema::new(generated()))
            .unwrap()
    }

    #[test]
    fn test_not_reroots_generated_ids() {
        let schema = BaseSchema::new(generated()).not(&object_with_prop("a"));
        assert_eq!(
            schema.value_of().unwrap()["not"],
            json!({
                "type": "object",
                "properties": {"a": {"$id": "#not/properties/a", "type": "string"}}
            })
        );
    }

    #[test]
    fn test_if_then_reroot_generated_ids() {
        let schema = BaseSchema::new(generated())
            .if_then(&object_with_prop("a"), &object_with_prop("b"));
        let value = schema.value_of().unwrap();
        assert_eq!(
            value["if"],
            json!({"properties": {"a": {"$id": "#if/properties/a", "type": "string"}}})
        );
        assert_eq!(
            value["then"],
            json!({"properties": {"b": {"$id": "#then/properties/b", "type": "string"}}})
        );
    }

    #[test]
    fn test_else_reroots_generated_ids() {
        let own_id = StringSchema::new(generated()).id("own").unwrap();
        let otherwise = object_with_prop("c").prop("d", &own_id).unwrap();
        let schema = BaseSchema::new(generated()).if_then_else(
            &object_with_prop("a"),
            &object_with_prop("b"),
            &otherwise,
        );
        assert_eq!(
            schema.value_of().unwrap()["else"],
            json!({
                "properties": {
                    "c": {"$id": "#else/properties/c", "type": "string"},
                    "d": {"$id": "own", "type": "string"}
                }
            })
        );
    }

    #[test]
    fn test_clauses_keep_ids_without_generation() {
        let clause = ObjectSchema::new(Options::default())
            .prop("a", &StringSchema::new(Options::default()))
            .unwrap();
        let schema = base().not(&clause);
        assert_eq!(
            schema.value_of_nested()["not"]["properties"]["a"],
            json!({"type": "string"})
        );
    }

    #[test]
    fn test_serialize_impl() {
        let text = serde_json::to_string(&base().title("t")).unwrap();
        assert_eq!(text, format!("{{\"$schema\":\"{}\",\"title\":\"t\"}}", DRAFT_07));
        assert!(serde_json::to_string(&base().required().unwrap()).is_err());
    }
}
