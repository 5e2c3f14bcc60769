use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::schema::AsSchema;

/// Draft-07 meta-schema URI written as `$schema` on root documents.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Builder configuration, threaded unchanged through every derived builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Synthesize `$id` values (`#properties/<name>`, `#definitions/<name>`)
    /// for sub-schemas that do not set one explicitly.
    pub generate_ids: bool,
}

impl Options {
    pub fn with_generated_ids() -> Self {
        Options { generate_ids: true }
    }
}

/// The seven JSON Schema instance types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::String,
        Kind::Number,
        Kind::Integer,
        Kind::Boolean,
        Kind::Object,
        Kind::Array,
        Kind::Null,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownType(s.to_string()))
    }
}

/// Values accepted by the `format` keyword of string schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    RelativeJsonPointer,
    JsonPointer,
    Uuid,
    Regex,
    Ipv6,
    Ipv4,
    Hostname,
    IdnHostname,
    Email,
    IdnEmail,
    Url,
    UriTemplate,
    UriReference,
    Uri,
    Iri,
    IriReference,
    Time,
    Date,
    DateTime,
    IsoTime,
    IsoDateTime,
}

impl Format {
    pub const ALL: [Format; 21] = [
        Format::RelativeJsonPointer,
        Format::JsonPointer,
        Format::Uuid,
        Format::Regex,
        Format::Ipv6,
        Format::Ipv4,
        Format::Hostname,
        Format::IdnHostname,
        Format::Email,
        Format::IdnEmail,
        Format::Url,
        Format::UriTemplate,
        Format::UriReference,
        Format::Uri,
        Format::Iri,
        Format::IriReference,
        Format::Time,
        Format::Date,
        Format::DateTime,
        Format::IsoTime,
        Format::IsoDateTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::RelativeJsonPointer => "relative-json-pointer",
            Format::JsonPointer => "json-pointer",
            Format::Uuid => "uuid",
            Format::Regex => "regex",
            Format::Ipv6 => "ipv6",
            Format::Ipv4 => "ipv4",
            Format::Hostname => "hostname",
            Format::IdnHostname => "idn-hostname",
            Format::Email => "email",
            Format::IdnEmail => "idn-email",
            Format::Url => "url",
            Format::UriTemplate => "uri-template",
            Format::UriReference => "uri-reference",
            Format::Uri => "uri",
            Format::Iri => "iri",
            Format::IriReference => "iri-reference",
            Format::Time => "time",
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::IsoTime => "iso-time",
            Format::IsoDateTime => "iso-date-time",
        }
    }
}

static FORMATS: Lazy<HashMap<&'static str, Format>> =
    Lazy::new(|| Format::ALL.iter().map(|f| (f.as_str(), *f)).collect());

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORMATS
            .get(s)
            .copied()
            .ok_or_else(|| ValidationError::UnknownFormat(s.to_string()))
    }
}

// `/source/flags`, as written in JavaScript regex literals
static REGEX_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?s)(.*)/[dgimsuvy]*$").unwrap());

/// Argument of the `pattern` keyword.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Used verbatim.
    Source(String),
    /// A compiled regex; its source text is emitted.
    Regex(Regex),
}

impl Pattern {
    /// Canonicalize a regex literal such as `/^a+$/i` to its source (`^a+$`).
    /// Strings without delimiters are kept as they are.
    pub fn literal(literal: &str) -> Self {
        match REGEX_LITERAL.captures(literal).and_then(|c| c.get(1)) {
            Some(source) => Pattern::Source(source.as_str().to_string()),
            None => Pattern::Source(literal.to_string()),
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Pattern::Source(s) => s,
            Pattern::Regex(re) => re.as_str(),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::Source(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Pattern::Source(s)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

impl From<&Regex> for Pattern {
    fn from(re: &Regex) -> Self {
        Pattern::Regex(re.clone())
    }
}

/// Keywords such as `additionalProperties` take either a boolean or a schema.
#[derive(Clone, Copy)]
pub enum BoolOrSchema<'a> {
    Bool(bool),
    Schema(&'a dyn AsSchema),
}

impl BoolOrSchema<'_> {
    pub(crate) fn to_value(self) -> Value {
        match self {
            BoolOrSchema::Bool(b) => Value::Bool(b),
            BoolOrSchema::Schema(schema) => schema.value_of_nested(),
        }
    }
}

impl From<bool> for BoolOrSchema<'_> {
    fn from(b: bool) -> Self {
        BoolOrSchema::Bool(b)
    }
}

impl<'a, T: AsSchema> From<&'a T> for BoolOrSchema<'a> {
    fn from(schema: &'a T) -> Self {
        BoolOrSchema::Schema(schema)
    }
}

/// A value of the `dependencies` keyword.
#[derive(Clone, Copy)]
pub enum Dependency<'a> {
    /// Schema dependency: the instance must also validate against it.
    Schema(&'a dyn AsSchema),
    /// Property dependency: these properties become required.
    Properties(&'a [&'a str]),
}

impl Dependency<'_> {
    pub(crate) fn to_value(self) -> Value {
        match self {
            Dependency::Schema(schema) => schema.value_of_nested(),
            Dependency::Properties(names) => {
                Value::Array(names.iter().map(|name| Value::from(*name)).collect())
            }
        }
    }
}
