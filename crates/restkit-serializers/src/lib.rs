//! # restkit-serializers
//!
//! Declarative request validation: [`FieldDef`] definitions validated in
//! declaration order by [`Serializer`], with first-error short-circuiting
//! against the status catalog.

pub mod fields;
pub mod serializer;

pub use fields::{FieldDef, FieldType};
pub use serializer::Serializer;
