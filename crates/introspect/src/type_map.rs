//! Native database type to cast/doc type mapping.
//!
//! The base table is generic across drivers; driver-keyed overrides patch
//! the few types a driver reports differently (e.g. mysql enums), and the
//! raw-correction mode uses length information carried on the column to fix
//! lossy generic mappings such as `tinyint(1)` booleans.

use crate::schema::{CastType, Column};
use std::collections::HashMap;

/// Result of mapping one native type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    pub cast_type: CastType,
    pub doc_type: String,
    pub is_datetime: bool,
}

impl TypeMapping {
    fn new(cast_type: CastType, doc_type: &str) -> Self {
        Self {
            cast_type,
            doc_type: doc_type.to_string(),
            is_datetime: matches!(cast_type, CastType::Date | CastType::DateTime),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeMapper {
    /// driver name -> native type -> forced cast type
    driver_overrides: HashMap<String, HashMap<String, CastType>>,
    raw_corrections: bool,
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMapper {
    pub fn new() -> Self {
        let mut driver_overrides: HashMap<String, HashMap<String, CastType>> = HashMap::new();

        // mysql reports enums/sets with their value list; treat both as
        // plain strings.
        let mysql: HashMap<String, CastType> = [
            ("enum".to_string(), CastType::String),
            ("set".to_string(), CastType::String),
        ]
        .into_iter()
        .collect();
        driver_overrides.insert("mysql".to_string(), mysql);

        let sqlite: HashMap<String, CastType> =
            [("numeric".to_string(), CastType::Float)].into_iter().collect();
        driver_overrides.insert("sqlite".to_string(), sqlite);

        Self {
            driver_overrides,
            raw_corrections: false,
        }
    }

    /// Enable length-aware corrections of the generic mapping
    /// (`tinyint(1)` becomes a boolean instead of an int).
    pub fn with_raw_corrections(mut self, enabled: bool) -> Self {
        self.raw_corrections = enabled;
        self
    }

    pub fn add_override(&mut self, driver: &str, native_type: &str, cast: CastType) {
        self.driver_overrides
            .entry(driver.to_string())
            .or_default()
            .insert(native_type.to_lowercase(), cast);
    }

    pub fn map(&self, native_type: &str, length: Option<u32>, driver: &str) -> TypeMapping {
        let native = native_type.to_lowercase();

        if let Some(cast) = self
            .driver_overrides
            .get(driver)
            .and_then(|table| table.get(&native))
        {
            return TypeMapping::new(*cast, doc_type_for(*cast));
        }

        if self.raw_corrections && native == "tinyint" && length == Some(1) {
            return TypeMapping::new(CastType::Bool, "bool");
        }

        match native.as_str() {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "serial"
            | "bigserial" => TypeMapping::new(CastType::Int, "i64"),
            "decimal" | "numeric" | "money" => TypeMapping::new(CastType::Decimal, "Decimal"),
            "float" | "double" | "real" | "double precision" => {
                TypeMapping::new(CastType::Float, "f64")
            }
            "bool" | "boolean" | "bit" => TypeMapping::new(CastType::Bool, "bool"),
            "date" => TypeMapping::new(CastType::Date, "NaiveDate"),
            "datetime" | "timestamp" | "timestamptz" | "timestamp with time zone"
            | "timestamp without time zone" => {
                TypeMapping::new(CastType::DateTime, "DateTime<Utc>")
            }
            "json" | "jsonb" => TypeMapping::new(CastType::Json, "serde_json::Value"),
            "binary" | "varbinary" | "blob" | "bytea" => {
                TypeMapping::new(CastType::String, "Vec<u8>")
            }
            _ => TypeMapping::new(CastType::String, "String"),
        }
    }

    /// Fill the mapped fields of a column in place. Nullable columns get an
    /// `Option<...>`-wrapped doc type.
    pub fn annotate(&self, column: &mut Column, driver: &str) {
        let mapping = self.map(&column.native_type, column.length, driver);
        column.cast_type = mapping.cast_type;
        column.is_date = mapping.is_datetime;
        column.doc_type = if column.nullable {
            format!("Option<{}>", mapping.doc_type)
        } else {
            mapping.doc_type
        };
    }
}

fn doc_type_for(cast: CastType) -> &'static str {
    match cast {
        CastType::Int => "i64",
        CastType::Float => "f64",
        CastType::Decimal => "Decimal",
        CastType::Bool => "bool",
        CastType::String => "String",
        CastType::Date => "NaiveDate",
        CastType::DateTime => "DateTime<Utc>",
        CastType::Json => "serde_json::Value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn generic_mapping() {
        let mapper = TypeMapper::new();
        let mapping = mapper.map("BIGINT", None, "pgsql");
        assert_eq!(mapping.cast_type, CastType::Int);
        assert_eq!(mapping.doc_type, "i64");
        assert!(!mapping.is_datetime);

        let mapping = mapper.map("timestamp", None, "pgsql");
        assert_eq!(mapping.cast_type, CastType::DateTime);
        assert!(mapping.is_datetime);
    }

    #[test]
    fn driver_override_beats_base_table() {
        let mapper = TypeMapper::new();
        assert_eq!(mapper.map("enum", None, "mysql").cast_type, CastType::String);
        // without the override layer an unknown type is also a string, but
        // a custom override can redirect any native type
        let mut mapper = mapper;
        mapper.add_override("mysql", "year", CastType::Int);
        assert_eq!(mapper.map("year", None, "mysql").cast_type, CastType::Int);
        assert_eq!(mapper.map("year", None, "pgsql").cast_type, CastType::String);
    }

    #[test]
    fn tinyint_one_is_bool_only_with_corrections() {
        let plain = TypeMapper::new();
        assert_eq!(plain.map("tinyint", Some(1), "mysql").cast_type, CastType::Int);

        let corrected = TypeMapper::new().with_raw_corrections(true);
        assert_eq!(
            corrected.map("tinyint", Some(1), "mysql").cast_type,
            CastType::Bool
        );
        assert_eq!(
            corrected.map("tinyint", Some(4), "mysql").cast_type,
            CastType::Int
        );
    }

    #[test]
    fn annotate_wraps_nullable_doc_types() {
        let mapper = TypeMapper::new();
        let mut column = Column::from_raw("deleted_at", "datetime");
        column.nullable = true;
        mapper.annotate(&mut column, "mysql");
        assert_eq!(column.doc_type, "Option<DateTime<Utc>>");
        assert!(column.is_date);
        assert_eq!(column.cast_type, CastType::DateTime);
    }
}
