//! Schema introspection layer: metadata types, the provider contract, and
//! native-to-semantic type mapping.

pub mod provider;
pub mod schema;
pub mod type_map;

pub use provider::{SchemaProvider, YamlSchemaProvider};
pub use schema::{CastType, Column, ForeignKey, Index, Table};
pub use type_map::{TypeMapper, TypeMapping};
