//! Immutable builder state and the transforms every fluent call goes through.
//!
//! A [`SchemaState`] keeps properties and definitions as ordered named
//! entries rather than as nested JSON, so that keyword setters can target the
//! most recently declared property and so that `required` can hold the
//! unresolved "this schema is required" marker. [`SchemaState::serialize`]
//! flattens everything into the final key-ordered JSON object.
//!
//! Every method here takes `&self` and returns a fresh state.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::types::{Options, DRAFT_07};

/// Keywords that subsume `type` when present on a property's schema.
const COMBINING_KEYWORDS: [&str; 4] = ["allOf", "anyOf", "oneOf", "not"];

/// Conditional keywords, always serialized last.
const CONDITIONAL_KEYWORDS: [&str; 3] = ["if", "then", "else"];

/// One entry of the `required` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Required {
    Name(String),
    /// The schema carrying this marker is itself required; resolved to the
    /// property name when the schema is embedded with `prop`.
    Sentinel,
}

/// Which named-entry list a sub-schema lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Properties,
    Definitions,
}

impl Target {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Target::Properties => "properties",
            Target::Definitions => "definitions",
        }
    }
}

/// Ordered named sub-schemas.
///
/// Inserting an existing name replaces its schema in place (last wins, first
/// position kept). `last` tracks the most recently inserted name, which is
/// the target of keyword setters chained after `prop`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Entries {
    entries: IndexMap<String, Value>,
    last: Option<String>,
}

impl Entries {
    pub(crate) fn from_map(map: &Map<String, Value>) -> Self {
        Entries {
            entries: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            last: map.keys().last().cloned(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn last_name(&self) -> Option<&str> {
        self.last.as_deref()
    }

    fn last_entry(&self) -> Option<&Value> {
        self.last.as_ref().and_then(|name| self.entries.get(name))
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub(crate) fn insert(&mut self, name: &str, schema: Value) {
        self.entries.insert(name.to_string(), schema);
        self.last = Some(name.to_string());
    }

    /// Merge `fragment` onto the most recent entry. Returns `false` when
    /// there is no entry to target.
    fn merge_into_last(&mut self, fragment: Map<String, Value>) -> bool {
        let Some(entry) = self.last.as_ref().and_then(|name| self.entries.get_mut(name)) else {
            return false;
        };
        match entry {
            Value::Object(attributes) => {
                for (key, value) in fragment {
                    attributes.insert(key, value);
                }
            }
            other => *other = Value::Object(fragment),
        }
        true
    }

    /// Entries matched by name are deep-merged; the rest are appended.
    fn merge(&mut self, other: &Entries) {
        for (name, schema) in &other.entries {
            match self.entries.get_mut(name) {
                Some(existing) => deep_merge(existing, schema),
                None => {
                    self.entries.insert(name.clone(), schema.clone());
                }
            }
        }
        if other.last.is_some() {
            self.last = other.last.clone();
        }
    }

    fn retain(&self, keep: impl Fn(&str) -> bool) -> Self {
        let entries: IndexMap<String, Value> = self
            .entries
            .iter()
            .filter(|(name, _)| keep(name))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let last = match &self.last {
            Some(name) if entries.contains_key(name) => Some(name.clone()),
            _ => entries.keys().last().cloned(),
        };
        Entries { entries, last }
    }

    fn flatten(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// The state behind every builder.
///
/// Builders never mutate a state they hold: each call clones it, applies one
/// change and wraps the result in a new builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaState {
    pub(crate) attributes: Map<String, Value>,
    pub(crate) properties: Entries,
    pub(crate) definitions: Entries,
    pub(crate) required: Vec<Required>,
}

impl SchemaState {
    /// Root document state: only `$schema`.
    pub(crate) fn document() -> Self {
        let mut state = SchemaState::default();
        state
            .attributes
            .insert("$schema".to_string(), Value::String(DRAFT_07.to_string()));
        state
    }

    /// Root document state with a `type`.
    pub(crate) fn typed(schema_type: Value) -> Self {
        let mut state = SchemaState::document();
        state.attributes.insert("type".to_string(), schema_type);
        state
    }

    pub(crate) fn from_attributes(attributes: Map<String, Value>) -> Self {
        SchemaState {
            attributes,
            ..SchemaState::default()
        }
    }

    /// The schema of the most recently declared property: where targeted
    /// keywords land. `None` means they land on the root.
    pub(crate) fn last_property(&self) -> Option<&Value> {
        self.properties.last_entry()
    }

    /// Set a keyword on the most recent property, or on the root when no
    /// property has been declared.
    pub(crate) fn with_attribute(&self, key: &str, value: Value) -> Self {
        let mut fragment = Map::new();
        fragment.insert(key.to_string(), value);
        self.with_fragment(fragment)
    }

    /// Set a keyword on the root regardless of declared properties.
    pub(crate) fn with_root_attribute(&self, key: &str, value: Value) -> Self {
        let mut next = self.clone();
        next.attributes.insert(key.to_string(), value);
        next
    }

    /// Merge an object fragment with the same targeting as [`Self::with_attribute`].
    /// Fragment keys win over existing ones.
    pub(crate) fn with_fragment(&self, fragment: Map<String, Value>) -> Self {
        let mut next = self.clone();
        if !next.properties.merge_into_last(fragment.clone()) {
            for (key, value) in fragment {
                next.attributes.insert(key, value);
            }
        }
        next
    }

    /// The no-argument `required()`: marks the most recent property, or the
    /// schema itself when there is none.
    pub(crate) fn with_required_last(&self) -> Result<Self> {
        let entry = match self.properties.last_name() {
            Some(name) => Required::Name(name.to_string()),
            None => Required::Sentinel,
        };
        self.with_required(vec![entry])
    }

    pub(crate) fn with_required_names<I, N>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let entries = names
            .into_iter()
            .map(|name| Required::Name(name.as_ref().to_string()))
            .collect();
        self.with_required(entries)
    }

    fn with_required(&self, entries: Vec<Required>) -> Result<Self> {
        let mut next = self.clone();
        for entry in entries {
            push_required(&mut next.required, entry)?;
        }
        Ok(next)
    }

    /// Embed `sub` as a named property or definition.
    ///
    /// The entry holds the nested serialization of `sub`. A `$ref` reduces
    /// the entry to the reference alone, combinators drop `type`, and with
    /// `generate_ids` a missing `$id` is derived from the entry path. Required
    /// markers on `sub` resolve to `name` in this schema's `required` for
    /// properties, and are dropped for definitions.
    pub(crate) fn with_entry(
        &self,
        target: Target,
        name: &str,
        sub: &SchemaState,
        options: Options,
    ) -> Result<Self> {
        let attributes = sub.flatten(false);

        let (entry, id) = match attributes.get("$ref") {
            Some(reference) => {
                let mut entry = Map::new();
                entry.insert("$ref".to_string(), reference.clone());
                (entry, None)
            }
            None => {
                let id = match attributes.get("$id") {
                    Some(id) => Some(id.clone()),
                    None if options.generate_ids => Some(Value::String(format!(
                        "#{}/{}",
                        target.keyword(),
                        name
                    ))),
                    None => None,
                };
                let drop_type = has_combining_keywords(&attributes);

                let mut entry = Map::new();
                if let Some(id) = &id {
                    entry.insert("$id".to_string(), id.clone());
                }
                for (key, value) in attributes {
                    if key == "$id" || (drop_type && key == "type") {
                        continue;
                    }
                    entry.insert(key, value);
                }

                let entry = match (&id, options.generate_ids) {
                    (Some(Value::String(parent)), true) => patch_ids(entry, parent),
                    _ => entry,
                };
                (entry, id)
            }
        };

        let mut next = self.clone();
        // a definition is not an instance property, so it never becomes required
        if target == Target::Properties && sub.required.contains(&Required::Sentinel) {
            push_required(&mut next.required, Required::Name(name.to_string()))?;
        }

        debug!(keyword = target.keyword(), name, id = ?id, "declared schema entry");
        match target {
            Target::Properties => next.properties.insert(name, Value::Object(entry)),
            Target::Definitions => next.definitions.insert(name, Value::Object(entry)),
        }
        Ok(next)
    }

    /// Deep-merge `other` into a copy of this state.
    pub(crate) fn merged(&self, other: &SchemaState) -> Self {
        let mut next = self.clone();
        for (key, value) in &other.attributes {
            match next.attributes.get_mut(key) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    next.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        next.properties.merge(&other.properties);
        next.definitions.merge(&other.definitions);
        for required in &other.required {
            if !next.required.contains(required) {
                next.required.push(required.clone());
            }
        }
        next
    }

    /// Keep the properties (and matching required names) accepted by
    /// `keep`. The result is a new schema identity, so `$id` is dropped.
    pub(crate) fn filtered(&self, keep: impl Fn(&str) -> bool, keep_sentinel: bool) -> Self {
        SchemaState {
            attributes: self
                .attributes
                .iter()
                .filter(|(key, _)| key.as_str() != "$id")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            properties: self.properties.retain(&keep),
            definitions: self.definitions.clone(),
            required: self
                .required
                .iter()
                .filter(|required| match required {
                    Required::Name(name) => keep(name),
                    Required::Sentinel => keep_sentinel,
                })
                .cloned()
                .collect(),
        }
    }

    /// Flatten into the final key order: `$schema`, `definitions`, the
    /// remaining attributes, `properties`, `required`, `if`, `then`, `else`.
    ///
    /// Nested output omits `$schema` and unresolved required markers.
    pub(crate) fn flatten(&self, is_root: bool) -> Map<String, Value> {
        let mut out = Map::new();

        if is_root {
            if let Some(schema) = self.attributes.get("$schema") {
                out.insert("$schema".to_string(), schema.clone());
            }
        }
        if !self.definitions.is_empty() {
            out.insert(
                "definitions".to_string(),
                Value::Object(self.definitions.flatten()),
            );
        }
        for (key, value) in &self.attributes {
            if key == "$schema" || CONDITIONAL_KEYWORDS.contains(&key.as_str()) {
                continue;
            }
            out.insert(key.clone(), value.clone());
        }
        if !self.properties.is_empty() {
            out.insert(
                "properties".to_string(),
                Value::Object(self.properties.flatten()),
            );
        }

        let required: Vec<Value> = self
            .required
            .iter()
            .filter_map(|required| match required {
                Required::Name(name) => Some(Value::String(name.clone())),
                Required::Sentinel => None,
            })
            .collect();
        if !required.is_empty() {
            out.insert("required".to_string(), Value::Array(required));
        }

        for key in CONDITIONAL_KEYWORDS {
            if let Some(value) = self.attributes.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }
        out
    }

    /// Serialize to JSON Schema. At the root, an unresolved required marker
    /// is an error.
    pub(crate) fn serialize(&self, is_root: bool) -> Result<Value> {
        if is_root && self.required.contains(&Required::Sentinel) {
            return Err(ValidationError::UnresolvedRequired);
        }
        Ok(Value::Object(self.flatten(is_root)))
    }

    /// Nested serialization of `self` for embedding under another keyword,
    /// minus `strip`. With generated ids, direct properties are re-rooted
    /// under `parent_id`.
    pub(crate) fn embedded(&self, strip: &[&str], options: Options, parent_id: Option<&str>) -> Value {
        let schema: Map<String, Value> = self
            .flatten(false)
            .into_iter()
            .filter(|(key, _)| !strip.contains(&key.as_str()))
            .collect();
        match parent_id {
            Some(parent) if options.generate_ids => Value::Object(patch_ids(schema, parent)),
            _ => Value::Object(schema),
        }
    }
}

fn push_required(required: &mut Vec<Required>, entry: Required) -> Result<()> {
    if required.contains(&entry) {
        let name = match entry {
            Required::Name(name) => name,
            Required::Sentinel => "<self>".to_string(),
        };
        return Err(ValidationError::DuplicateRequired(name));
    }
    required.push(entry);
    Ok(())
}

pub(crate) fn has_combining_keywords(attributes: &Map<String, Value>) -> bool {
    COMBINING_KEYWORDS
        .iter()
        .any(|keyword| attributes.contains_key(*keyword))
}

/// Give each direct property of `schema` an `$id` below `parent_id`
/// (`<parent_id>/properties/<name>`).
///
/// Ids that already have the auto-generated shape `#properties/<name>` are
/// re-rooted as well; any other explicit id is kept.
pub(crate) fn patch_ids(mut schema: Map<String, Value>, parent_id: &str) -> Map<String, Value> {
    let Some(Value::Object(properties)) = schema.get("properties") else {
        return schema;
    };

    let patched: Map<String, Value> = properties
        .iter()
        .map(|(name, property)| {
            let generated = format!("#properties/{}", name);
            let property = match property {
                Value::Object(attributes) => {
                    let explicit = attributes
                        .get("$id")
                        .and_then(Value::as_str)
                        .map_or(false, |id| id != generated);
                    if explicit {
                        property.clone()
                    } else {
                        let id = format!("{}/{}", parent_id, generated.trim_start_matches('#'));
                        Value::Object(with_id_first(attributes, id))
                    }
                }
                other => other.clone(),
            };
            (name.clone(), property)
        })
        .collect();

    schema.insert("properties".to_string(), Value::Object(patched));
    schema
}

fn with_id_first(attributes: &Map<String, Value>, id: String) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("$id".to_string(), Value::String(id));
    for (key, value) in attributes {
        if key != "$id" {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Recursively merge `source` into `target`: objects merge key by key,
/// arrays gain the values they lack, anything else is replaced.
pub(crate) fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for value in source {
                if !target.contains(value) {
                    target.push(value.clone());
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn string_state() -> SchemaState {
        SchemaState::typed(json!("string"))
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_document_serialization() {
        let state = SchemaState::document();
        assert_eq!(
            state.serialize(true).unwrap(),
            json!({"$schema": "http://json-schema.org/draft-07/schema#"})
        );
        assert_eq!(state.serialize(false).unwrap(), json!({}));
    }

    #[test]
    fn test_attribute_targets_root_without_properties() {
        let state = string_state().with_attribute("minLength", json!(3));
        assert_eq!(state.attributes.get("minLength"), Some(&json!(3)));
    }

    #[test]
    fn test_attribute_targets_last_property() {
        let state = SchemaState::typed(json!("object"))
            .with_entry(Target::Properties, "a", &string_state(), Options::default())
            .unwrap()
            .with_entry(Target::Properties, "b", &string_state(), Options::default())
            .unwrap()
            .with_attribute("minLength", json!(2))
            .with_attribute("minLength", json!(5));

        let value = state.serialize(true).unwrap();
        assert_eq!(value["properties"]["a"], json!({"type": "string"}));
        assert_eq!(value["properties"]["b"], json!({"type": "string", "minLength": 5}));
        assert!(state.attributes.get("minLength").is_none());
    }

    #[test]
    fn test_fragment_wins_over_existing_keys() {
        let state = SchemaState::typed(json!("object"))
            .with_entry(Target::Properties, "a", &string_state(), Options::default())
            .unwrap()
            .with_fragment(object(json!({"type": "integer", "minimum": 1})));

        assert_eq!(
            state.serialize(true).unwrap()["properties"]["a"],
            json!({"type": "integer", "minimum": 1})
        );
    }

    #[test]
    fn test_key_order() {
        let mut state = SchemaState::typed(json!("object"))
            .with_root_attribute("then", json!({"required": ["b"]}))
            .with_root_attribute("if", json!({"properties": {"a": {"const": 1}}}))
            .with_entry(Target::Definitions, "d", &string_state(), Options::default())
            .unwrap()
            .with_entry(Target::Properties, "a", &string_state(), Options::default())
            .unwrap()
            .with_required_last()
            .unwrap();
        state = state.with_root_attribute("title", json!("T"));

        let text = serde_json::to_string(&state.serialize(true).unwrap()).unwrap();
        let order: Vec<usize> = [
            "\"$schema\"",
            "\"definitions\"",
            "\"type\"",
            "\"title\"",
            "\"properties\"",
            "\"required\"",
            "\"if\"",
            "\"then\"",
        ]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted, "unexpected key order in {}", text);
    }

    #[test]
    fn test_required_sentinel_fails_at_root() {
        let state = string_state().with_required_last().unwrap();
        assert_eq!(state.serialize(true), Err(ValidationError::UnresolvedRequired));
        assert_eq!(state.serialize(false).unwrap(), json!({"type": "string"}));
    }

    #[test]
    fn test_required_sentinel_resolves_on_entry() {
        let sub = string_state().with_required_last().unwrap();
        let state = SchemaState::typed(json!("object"))
            .with_entry(Target::Properties, "name", &sub, Options::default())
            .unwrap();
        assert_eq!(state.required, vec![Required::Name("name".to_string())]);
    }

    #[test]
    fn test_duplicate_required_names() {
        let state = SchemaState::default();
        assert_eq!(
            state.with_required_names(["a", "a"]),
            Err(ValidationError::DuplicateRequired("a".to_string()))
        );
        let state = state.with_required_names(["a"]).unwrap();
        assert!(state.with_required_names(["a"]).is_err());
    }

    #[test]
    fn test_redeclared_entry_last_wins() {
        let state = SchemaState::typed(json!("object"))
            .with_entry(Target::Properties, "a", &string_state(), Options::default())
            .unwrap()
            .with_entry(Target::Properties, "b", &string_state(), Options::default())
            .unwrap()
            .with_entry(
                Target::Properties,
                "a",
                &SchemaState::typed(json!("boolean")),
                Options::default(),
            )
            .unwrap();

        assert_eq!(state.properties.names(), vec!["a", "b"]);
        assert_eq!(state.properties.last_name(), Some("a"));
        assert_eq!(
            state.serialize(true).unwrap()["properties"]["a"],
            json!({"type": "boolean"})
        );
    }

    #[test]
    fn test_ref_collapses_entry() {
        let sub = SchemaState::document()
            .with_root_attribute("$ref", json!("#/definitions/y"))
            .with_root_attribute("title", json!("ignored"));
        let state = SchemaState::typed(json!("object"))
            .with_entry(Target::Properties, "x", &sub, Options::with_generated_ids())
            .unwrap();
        assert_eq!(
            state.serialize(true).unwrap()["properties"]["x"],
            json!({"$ref": "#/definitions/y"})
        );
    }

    #[test]
    fn test_generated_definition_id() {
        let state = SchemaState::typed(json!("object"))
            .with_entry(Target::Definitions, "d", &string_state(), Options::with_generated_ids())
            .unwrap();
        assert_eq!(
            state.serialize(true).unwrap()["definitions"]["d"],
            json!({"$id": "#definitions/d", "type": "string"})
        );
    }

    #[test]
    fn test_definition_ignores_required_marker() {
        let sub = string_state().with_required_last().unwrap();
        let state = SchemaState::typed(json!("object"))
            .with_entry(Target::Definitions, "d", &sub, Options::default())
            .unwrap();
        let value = state.serialize(true).unwrap();
        assert_eq!(value.get("required"), None);
        assert_eq!(value["definitions"]["d"], json!({"type": "string"}));
    }

    #[test]
    fn test_last_property() {
        let state = SchemaState::typed(json!("object"));
        assert_eq!(state.last_property(), None);
        let state = state
            .with_entry(Target::Properties, "a", &string_state(), Options::default())
            .unwrap()
            .with_entry(Target::Definitions, "d", &SchemaState::default(), Options::default())
            .unwrap();
        assert_eq!(state.last_property(), Some(&json!({"type": "string"})));
    }

    #[test]
    fn test_patch_ids() {
        let schema = object(json!({
            "properties": {
                "a": {"type": "string"},
                "b": {"$id": "#properties/b"},
                "c": {"$id": "custom"},
                "d": true
            }
        }));
        let patched = patch_ids(schema, "#not");
        assert_eq!(
            Value::Object(patched),
            json!({
                "properties": {
                    "a": {"$id": "#not/properties/a", "type": "string"},
                    "b": {"$id": "#not/properties/b"},
                    "c": {"$id": "custom"},
                    "d": true
                }
            })
        );
    }

    #[test]
    fn test_deep_merge() {
        let mut target = json!({"a": {"x": 1}, "list": [1, 2], "s": "old"});
        deep_merge(&mut target, &json!({"a": {"y": 2}, "list": [2, 3], "s": "new"}));
        assert_eq!(
            target,
            json!({"a": {"x": 1, "y": 2}, "list": [1, 2, 3], "s": "new"})
        );
    }

    #[test]
    fn test_filtered_drops_id() {
        let state = SchemaState::typed(json!("object"))
            .with_root_attribute("$id", json!("thing"))
            .with_entry(Target::Properties, "a", &string_state(), Options::default())
            .unwrap()
            .with_entry(Target::Properties, "b", &string_state(), Options::default())
            .unwrap()
            .with_required_names(["a", "b"])
            .unwrap()
            .filtered(|name| name == "b", false);

        assert!(state.attributes.get("$id").is_none());
        assert_eq!(state.properties.names(), vec!["b"]);
        assert_eq!(state.required, vec![Required::Name("b".to_string())]);
    }

    #[test]
    fn test_states_are_not_mutated() {
        let base = SchemaState::typed(json!("object"));
        let before = base.clone();
        let _ = base.with_attribute("title", json!("x"));
        let _ = base.with_required_last().unwrap();
        let _ = base
            .with_entry(Target::Properties, "a", &string_state(), Options::default())
            .unwrap();
        assert_eq!(base, before);
    }
}
