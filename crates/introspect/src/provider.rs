//! Schema provider contract plus the YAML-file-backed implementation used
//! by the CLI and tests. Live-database discovery sits behind the same trait
//! and is deliberately out of scope here.

use crate::schema::{Column, ForeignKey, Index, Table};
use crate::type_map::TypeMapper;
use sculpt_core::{Pattern, SchemaError, SculptResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Source of schema facts for one connection.
pub trait SchemaProvider {
    /// Driver name used for type-mapper overrides and config overlays.
    fn driver(&self) -> &str;

    /// All table names, minus those matching an exclude pattern, in the
    /// order the schema reports them.
    fn list_tables(&self, exclude: &[Pattern]) -> SculptResult<Vec<String>>;

    /// Full metadata for one table. A missing table is a
    /// [`SchemaError::TableNotFound`], distinct from a table that exists
    /// with zero columns.
    fn describe_table(&self, name: &str) -> SculptResult<Table>;
}

#[derive(Debug, Deserialize)]
struct SchemaDoc {
    #[serde(default = "default_driver")]
    driver: String,
    tables: Vec<TableDoc>,
}

fn default_driver() -> String {
    "generic".to_string()
}

#[derive(Debug, Deserialize)]
struct TableDoc {
    name: String,
    #[serde(default)]
    columns: Vec<ColumnDoc>,
    primary_key: Option<String>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    indexes: Vec<Index>,
}

#[derive(Debug, Deserialize)]
struct ColumnDoc {
    name: String,
    #[serde(rename = "type")]
    native_type: String,
    length: Option<u32>,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    unsigned: bool,
    #[serde(default)]
    auto_increment: bool,
    #[serde(default)]
    primary_key: bool,
    alias: Option<String>,
    default: Option<String>,
    comment: Option<String>,
}

/// Schema provider reading a declarative YAML schema document.
pub struct YamlSchemaProvider {
    driver: String,
    order: Vec<String>,
    tables: HashMap<String, Table>,
}

impl YamlSchemaProvider {
    pub fn from_path(path: &Path, mapper: &TypeMapper) -> SculptResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Unreadable(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content, mapper)
    }

    pub fn from_yaml(content: &str, mapper: &TypeMapper) -> SculptResult<Self> {
        let doc: SchemaDoc = serde_yaml::from_str(content)?;
        let driver = doc.driver;

        let mut order = Vec::with_capacity(doc.tables.len());
        let mut tables = HashMap::with_capacity(doc.tables.len());

        for table_doc in doc.tables {
            let table = build_table(table_doc, mapper, &driver);
            order.push(table.name.clone());
            tables.insert(table.name.clone(), table);
        }

        tracing::debug!(driver = %driver, tables = order.len(), "schema document loaded");

        Ok(Self {
            driver,
            order,
            tables,
        })
    }
}

fn build_table(doc: TableDoc, mapper: &TypeMapper, driver: &str) -> Table {
    let mut primary_key = doc.primary_key;

    let columns = doc
        .columns
        .into_iter()
        .map(|c| {
            if c.primary_key && primary_key.is_none() {
                primary_key = Some(c.name.clone());
            }
            let mut column = Column::from_raw(&c.name, &c.native_type);
            column.length = c.length;
            column.nullable = c.nullable;
            column.unsigned = c.unsigned;
            column.auto_increment = c.auto_increment;
            column.alias = c.alias;
            column.default = c.default;
            column.comment = c.comment;
            mapper.annotate(&mut column, driver);
            column
        })
        .collect();

    Table {
        name: doc.name,
        columns,
        primary_key,
        foreign_keys: doc.foreign_keys,
        indexes: doc.indexes,
    }
}

impl SchemaProvider for YamlSchemaProvider {
    fn driver(&self) -> &str {
        &self.driver
    }

    fn list_tables(&self, exclude: &[Pattern]) -> SculptResult<Vec<String>> {
        Ok(self
            .order
            .iter()
            .filter(|name| !Pattern::any_match(exclude, name))
            .cloned()
            .collect())
    }

    fn describe_table(&self, name: &str) -> SculptResult<Table> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::TableNotFound(name.to_string()).into())
    }
}
