//! Introspected schema metadata. Tables and columns are read-only facts
//! supplied by a [`SchemaProvider`](crate::provider::SchemaProvider); the
//! composer never mutates them.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

/// Semantic cast tag attached to a column by the type mapper. Drives the
/// generated `casts` map and date handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastType {
    Int,
    Float,
    Decimal,
    Bool,
    String,
    Date,
    DateTime,
    Json,
}

impl CastType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CastType::Int => "int",
            CastType::Float => "float",
            CastType::Decimal => "decimal",
            CastType::Bool => "bool",
            CastType::String => "string",
            CastType::Date => "date",
            CastType::DateTime => "datetime",
            CastType::Json => "json",
        }
    }
}

/// One database column with its derived naming variants and mapped types.
/// Immutable once produced for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Name exactly as reported by the schema.
    pub name: String,
    pub snake_name: String,
    pub camel_name: String,
    pub stud_name: String,
    /// Optional alias configured for the generated attribute.
    pub alias: Option<String>,
    /// Native database type, lowercased (`varchar`, `tinyint`, ...).
    pub native_type: String,
    pub length: Option<u32>,
    /// Language-level type tag used in generated documentation.
    pub doc_type: String,
    pub cast_type: CastType,
    pub nullable: bool,
    pub unsigned: bool,
    pub auto_increment: bool,
    pub is_date: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
}

impl Column {
    /// Build a column from raw schema facts. Type tags start at their
    /// generic string defaults; the type mapper refines them.
    pub fn from_raw(name: &str, native_type: &str) -> Self {
        Self {
            name: name.to_string(),
            snake_name: name.to_snake_case(),
            camel_name: name.to_lower_camel_case(),
            stud_name: name.to_upper_camel_case(),
            alias: None,
            native_type: native_type.to_lowercase(),
            length: None,
            doc_type: "String".to_string(),
            cast_type: CastType::String,
            nullable: false,
            unsigned: false,
            auto_increment: false,
            is_date: false,
            default: None,
            comment: None,
        }
    }

    /// Name the generated attribute should use: the alias when configured,
    /// the raw column name otherwise.
    pub fn attribute_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

/// One introspected table: ordered columns plus key and index facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key_column(&self) -> Option<&Column> {
        self.primary_key.as_deref().and_then(|pk| self.column(pk))
    }
}
