use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::schema::array::ArrayKeywords;
use crate::schema::base::{impl_as_schema, FluentSchema};
use crate::schema::number::NumberKeywords;
use crate::schema::object::ObjectKeywords;
use crate::schema::state::SchemaState;
use crate::schema::string::StringKeywords;
use crate::types::{Kind, Options};

/// A schema whose `type` is a list, e.g. `["string", "null"]`.
///
/// The keywords of every listed kind are available; keywords of any other
/// kind fail with [`ValidationError::KeywordNotAvailable`].
#[derive(Debug, Clone, PartialEq)]
pub struct MixedSchema {
    state: SchemaState,
    options: Options,
    kinds: Vec<Kind>,
}

impl MixedSchema {
    /// Parse `types` into kinds. Unknown names and an empty list fail;
    /// repeated names are kept once.
    pub(crate) fn new<I, T>(types: I, options: Options) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut kinds: Vec<Kind> = Vec::new();
        for name in types {
            let kind: Kind = name.as_ref().parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Err(ValidationError::invalid(
                "type",
                "a non-empty list of type names",
                &Value::Array(Vec::new()),
            ));
        }

        let type_names = kinds
            .iter()
            .map(|kind| Value::String(kind.as_str().to_string()))
            .collect();
        Ok(MixedSchema {
            state: SchemaState::typed(Value::Array(type_names)),
            options,
            kinds,
        })
    }

    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }

    fn has(&self, kind: Kind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl_as_schema!(MixedSchema);

impl FluentSchema for MixedSchema {
    fn options(&self) -> Options {
        self.options
    }

    fn with_state(&self, state: SchemaState) -> Self {
        MixedSchema {
            state,
            options: self.options,
            kinds: self.kinds.clone(),
        }
    }

    fn supports(&self, kind: Kind) -> bool {
        match kind {
            Kind::Number | Kind::Integer => self.has(Kind::Number) || self.has(Kind::Integer),
            kind => self.has(kind),
        }
    }

    fn binds_id_to_root(&self) -> bool {
        self.has(Kind::Object)
    }
}

impl StringKeywords for MixedSchema {}

impl NumberKeywords for MixedSchema {
    fn integer_only(&self) -> bool {
        self.has(Kind::Integer) && !self.has(Kind::Number)
    }
}

impl ArrayKeywords for MixedSchema {}

impl ObjectKeywords for MixedSchema {}
