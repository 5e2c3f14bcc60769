use serde_json::Value;

use crate::error::Result;
use crate::schema::base::{impl_as_schema, set_keyword, FluentSchema};
use crate::schema::state::SchemaState;
use crate::types::{Format, Kind, Options, Pattern};

/// Builder for `{"type": "string"}` schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct StringSchema {
    state: SchemaState,
    options: Options,
}

impl StringSchema {
    pub(crate) fn new(options: Options) -> Self {
        StringSchema {
            state: SchemaState::typed(Value::String("string".to_string())),
            options,
        }
    }

    pub(crate) fn from_state(state: SchemaState, options: Options) -> Self {
        StringSchema { state, options }
    }
}

impl_as_schema!(StringSchema);

impl FluentSchema for StringSchema {
    fn options(&self) -> Options {
        self.options
    }

    fn with_state(&self, state: SchemaState) -> Self {
        StringSchema {
            state,
            options: self.options,
        }
    }
}

/// String validation keywords.
pub trait StringKeywords: FluentSchema {
    fn min_length(&self, min: u64) -> Result<Self> {
        set_keyword(self, Kind::String, "minLength", Value::from(min))
    }

    fn max_length(&self, max: u64) -> Result<Self> {
        set_keyword(self, Kind::String, "maxLength", Value::from(max))
    }

    fn format(&self, format: Format) -> Result<Self> {
        set_keyword(
            self,
            Kind::String,
            "format",
            Value::String(format.as_str().to_string()),
        )
    }

    /// A plain string is used verbatim; a [`regex::Regex`] contributes its
    /// source text. See [`Pattern::literal`] for `/source/flags` literals.
    fn pattern(&self, pattern: impl Into<Pattern>) -> Result<Self> {
        let pattern = pattern.into();
        set_keyword(
            self,
            Kind::String,
            "pattern",
            Value::String(pattern.source().to_string()),
        )
    }

    fn content_encoding(&self, encoding: impl Into<String>) -> Result<Self> {
        set_keyword(
            self,
            Kind::String,
            "contentEncoding",
            Value::String(encoding.into()),
        )
    }

    fn content_media_type(&self, media_type: impl Into<String>) -> Result<Self> {
        set_keyword(
            self,
            Kind::String,
            "contentMediaType",
            Value::String(media_type.into()),
        )
    }
}

impl StringKeywords for StringSchema {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AsSchema, Keywords};
    use crate::types::DRAFT_07;
    use regex::Regex;
    use serde_json::json;

    fn string() -> StringSchema {
        StringSchema::new(Options::default())
    }

    #[test]
    fn test_simple_string() {
        assert_eq!(
            string().value_of().unwrap(),
            json!({"$schema": DRAFT_07, "type": "string"})
        );
    }

    #[test]
    fn test_length_keywords() {
        let schema = string().min_length(2).unwrap().max_length(10).unwrap();
        assert_eq!(
            schema.value_of_nested(),
            json!({"type": "string", "minLength": 2, "maxLength": 10})
        );
    }

    #[test]
    fn test_format() {
        let schema = string().format(Format::DateTime).unwrap();
        assert_eq!(schema.value_of_nested()["format"], json!("date-time"));

        let schema = string().format("email".parse().unwrap()).unwrap();
        assert_eq!(schema.value_of_nested()["format"], json!("email"));
    }

    #[test]
    fn test_pattern_variants() {
        let schema = string().pattern("^[a-z]+$").unwrap();
        assert_eq!(schema.value_of_nested()["pattern"], json!("^[a-z]+$"));

        let schema = string().pattern(Regex::new(r"^\d+$").unwrap()).unwrap();
        assert_eq!(schema.value_of_nested()["pattern"], json!(r"^\d+$"));

        let schema = string().pattern(Pattern::literal("/^.*$/g")).unwrap();
        assert_eq!(schema.value_of_nested()["pattern"], json!("^.*$"));
    }

    #[test]
    fn test_content_keywords() {
        let schema = string()
            .content_encoding("base64")
            .unwrap()
            .content_media_type("image/png")
            .unwrap();
        assert_eq!(
            schema.value_of_nested(),
            json!({
                "type": "string",
                "contentEncoding": "base64",
                "contentMediaType": "image/png"
            })
        );
    }

    #[test]
    fn test_keyword_does_not_mutate_receiver() {
        let schema = string().title("name");
        let before = schema.value_of().unwrap();
        let _ = schema.min_length(4).unwrap();
        assert_eq!(schema.value_of().unwrap(), before);
    }
}
