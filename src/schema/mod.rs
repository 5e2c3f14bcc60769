//! Fluent JSON Schema builders
//!
//! Every builder is immutable: keyword methods return a new builder and leave
//! the receiver untouched, so partially built schemas can be shared and
//! extended freely.

mod array;
mod base;
mod mixed;
mod number;
mod object;
mod primitive;
pub(crate) mod raw;
mod state;
mod string;

pub use array::{ArrayKeywords, ArraySchema};
pub use base::{AsSchema, BaseSchema, Compose, FluentSchema, Keywords};
pub use mixed::MixedSchema;
pub use number::{NumberKeywords, NumberSchema};
pub use object::{ObjectKeywords, ObjectSchema};
pub use primitive::{BooleanSchema, NullSchema};
pub use raw::Schema;
pub use state::SchemaState;
pub use string::{StringKeywords, StringSchema};
