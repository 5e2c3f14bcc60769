//! # Schemaforge - Fluent JSON Schema Builder
//!
//! Build draft-07 JSON Schema documents with an immutable, chainable API
//! instead of hand-writing JSON.
//!
//! ## Modules
//!
//! - **schema**: the builders and the keyword traits they share
//! - **types**: options, type and format names, keyword argument types
//! - **error**: [`ValidationError`], returned by every fallible keyword
//!
//! ## Quick Start
//!
//! ```rust
//! use schemaforge::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let user = schemaforge::object()
//!     .id("http://example.com/user")?
//!     .prop("name", &schemaforge::string().min_length(1)?)?
//!     .required()?
//!     .prop("age", &schemaforge::integer().minimum(0)?)?;
//!
//! assert_eq!(
//!     user.value_of()?,
//!     json!({
//!         "$schema": "http://json-schema.org/draft-07/schema#",
//!         "type": "object",
//!         "$id": "http://example.com/user",
//!         "properties": {
//!             "name": {"type": "string", "minLength": 1},
//!             "age": {"type": "integer", "minimum": 0}
//!         },
//!         "required": ["name"]
//!     })
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ### Generated ids
//!
//! ```rust
//! use schemaforge::prelude::*;
//! use schemaforge::Options;
//!
//! # fn main() -> anyhow::Result<()> {
//! let factory = schemaforge::with_options(Options::with_generated_ids());
//! let schema = factory.object().prop("tag", &factory.string())?;
//!
//! assert_eq!(schema.value_of()?["properties"]["tag"]["$id"], "#properties/tag");
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

pub mod error;
pub mod schema;
pub mod types;

pub use error::{Result, ValidationError};
pub use schema::{
    ArraySchema, AsSchema, BaseSchema, BooleanSchema, MixedSchema, NullSchema, NumberSchema,
    ObjectSchema, Schema, StringSchema,
};
pub use types::{BoolOrSchema, Dependency, Format, Kind, Options, Pattern, DRAFT_07};

/// The builder traits, for glob import.
pub mod prelude {
    pub use crate::schema::{
        ArrayKeywords, AsSchema, Compose, FluentSchema, Keywords, NumberKeywords, ObjectKeywords,
        StringKeywords,
    };
}

use schema::{Compose, Keywords};

/// Root factory. Every builder it creates carries its [`Options`] and
/// serializes as a document with `$schema`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaFactory {
    options: Options,
}

impl SchemaFactory {
    pub fn new(options: Options) -> Self {
        SchemaFactory { options }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// A schema without `type`.
    pub fn empty(&self) -> BaseSchema {
        BaseSchema::new(self.options)
    }

    pub fn string(&self) -> StringSchema {
        StringSchema::new(self.options)
    }

    pub fn number(&self) -> NumberSchema {
        NumberSchema::number(self.options)
    }

    pub fn integer(&self) -> NumberSchema {
        NumberSchema::integer(self.options)
    }

    pub fn boolean(&self) -> BooleanSchema {
        BooleanSchema::new(self.options)
    }

    pub fn null(&self) -> NullSchema {
        NullSchema::new(self.options)
    }

    pub fn array(&self) -> ArraySchema {
        ArraySchema::new(self.options)
    }

    pub fn object(&self) -> ObjectSchema {
        ObjectSchema::new(self.options)
    }

    /// A schema whose `type` lists several kinds, e.g. `["string", "null"]`.
    pub fn mixed<I, T>(&self, types: I) -> Result<MixedSchema>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        MixedSchema::new(types, self.options)
    }

    /// Turn an existing JSON Schema document back into a builder.
    pub fn raw(&self, fragment: Value) -> Result<Schema> {
        schema::raw::ingest(fragment, self.options)
    }

    pub fn reference(&self, reference: impl Into<String>) -> BaseSchema {
        self.empty().reference(reference)
    }

    pub fn all_of(&self, schemas: &[&dyn AsSchema]) -> BaseSchema {
        self.empty().all_of(schemas)
    }

    pub fn any_of(&self, schemas: &[&dyn AsSchema]) -> BaseSchema {
        self.empty().any_of(schemas)
    }

    pub fn one_of(&self, schemas: &[&dyn AsSchema]) -> BaseSchema {
        self.empty().one_of(schemas)
    }

    pub fn not(&self, schema: &dyn AsSchema) -> BaseSchema {
        self.empty().not(schema)
    }
}

/// A factory whose builders use `options`.
pub fn with_options(options: Options) -> SchemaFactory {
    SchemaFactory::new(options)
}

pub fn empty() -> BaseSchema {
    SchemaFactory::default().empty()
}

pub fn string() -> StringSchema {
    SchemaFactory::default().string()
}

pub fn number() -> NumberSchema {
    SchemaFactory::default().number()
}

pub fn integer() -> NumberSchema {
    SchemaFactory::default().integer()
}

pub fn boolean() -> BooleanSchema {
    SchemaFactory::default().boolean()
}

pub fn null() -> NullSchema {
    SchemaFactory::default().null()
}

pub fn array() -> ArraySchema {
    SchemaFactory::default().array()
}

pub fn object() -> ObjectSchema {
    SchemaFactory::default().object()
}

pub fn mixed<I, T>(types: I) -> Result<MixedSchema>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    SchemaFactory::default().mixed(types)
}

pub fn raw(fragment: Value) -> Result<Schema> {
    SchemaFactory::default().raw(fragment)
}

pub fn reference(reference: impl Into<String>) -> BaseSchema {
    SchemaFactory::default().reference(reference)
}

pub fn all_of(schemas: &[&dyn AsSchema]) -> BaseSchema {
    SchemaFactory::default().all_of(schemas)
}

pub fn any_of(schemas: &[&dyn AsSchema]) -> BaseSchema {
    SchemaFactory::default().any_of(schemas)
}

pub fn one_of(schemas: &[&dyn AsSchema]) -> BaseSchema {
    SchemaFactory::default().one_of(schemas)
}

pub fn not(schema: &dyn AsSchema) -> BaseSchema {
    SchemaFactory::default().not(schema)
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_document() {
        let schema = object()
            .prop("name", &string())
            .unwrap()
            .required()
            .unwrap();
        assert_eq!(
            schema.value_of().unwrap(),
            json!({
                "$schema": DRAFT_07,
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_factory_kinds() {
        assert_eq!(empty().value_of().unwrap(), json!({"$schema": DRAFT_07}));
        assert_eq!(boolean().value_of_nested(), json!({"type": "boolean"}));
        assert_eq!(null().value_of_nested(), json!({"type": "null"}));
        assert_eq!(number().value_of_nested(), json!({"type": "number"}));
        assert_eq!(integer().value_of_nested(), json!({"type": "integer"}));
        assert_eq!(array().value_of_nested(), json!({"type": "array"}));
        assert_eq!(
            mixed(["number", "null"]).unwrap().value_of_nested(),
            json!({"type": ["number", "null"]})
        );
    }

    #[test]
    fn test_root_combinators() {
        let schema = one_of(&[&string(), &integer()]);
        assert_eq!(
            schema.value_of().unwrap(),
            json!({
                "$schema": DRAFT_07,
                "oneOf": [{"type": "string"}, {"type": "integer"}]
            })
        );
        assert_eq!(
            not(&string()).value_of_nested(),
            json!({"not": {"type": "string"}})
        );
        assert_eq!(
            reference("#/definitions/a").value_of().unwrap(),
            json!({"$schema": DRAFT_07, "$ref": "#/definitions/a"})
        );
        assert_eq!(
            all_of(&[&string()]).any_of(&[&null()]).value_of_nested(),
            json!({"allOf": [{"type": "string"}], "anyOf": [{"type": "null"}]})
        );
    }

    #[test]
    fn test_factory_threads_options() {
        let factory = with_options(Options::with_generated_ids());
        assert_eq!(factory.options(), Options::with_generated_ids());
        let schema = factory
            .object()
            .definition("address", &factory.object().prop("street", &factory.string()).unwrap())
            .unwrap();
        assert_eq!(
            schema.value_of_nested()["definitions"]["address"],
            json!({
                "$id": "#definitions/address",
                "type": "object",
                "properties": {
                    "street": {"$id": "#definitions/address/properties/street", "type": "string"}
                }
            })
        );
    }

    #[test]
    fn test_raw_roundtrip() {
        let schema = object()
            .prop("tags", &array().items(&string()).unwrap())
            .unwrap()
            .required()
            .unwrap();
        let document = schema.value_of().unwrap();
        assert_eq!(raw(document.clone()).unwrap().value_of().unwrap(), document);
    }
}
