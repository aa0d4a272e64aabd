//! Ordered modifier passes. Each pass augments the accumulating skeleton
//! from table facts and configuration; pass order is first-class
//! configuration, not registration order. Passes must be idempotent for an
//! unchanged table so regeneration can reach the identical-content no-op.

use crate::member::{Member, MemberKind, Value};
use crate::skeleton::{Skeleton, UseKind};
use sculpt_core::{Config, Pattern, SculptResult};
use sculpt_introspect::{CastType, Column, Table};

pub trait ModifierPass {
    fn id(&self) -> &'static str;

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, config: &Config) -> SculptResult<()>;
}

/// The stock pass order. Collection passes (`dates`) run before the passes
/// that read their output (`casts`).
pub const DEFAULT_PASS_IDS: &[&str] = &[
    "table-name",
    "primary-key",
    "timestamps",
    "soft-deletes",
    "dates",
    "casts",
    "fillable",
    "hidden",
    "doc-block",
];

pub fn pass_by_id(id: &str) -> Option<Box<dyn ModifierPass>> {
    match id {
        "table-name" => Some(Box::new(TableNamePass)),
        "primary-key" => Some(Box::new(PrimaryKeyPass)),
        "timestamps" => Some(Box::new(TimestampsPass)),
        "soft-deletes" => Some(Box::new(SoftDeletesPass)),
        "dates" => Some(Box::new(DatesPass)),
        "casts" => Some(Box::new(CastsPass)),
        "fillable" => Some(Box::new(FillablePass)),
        "hidden" => Some(Box::new(HiddenPass)),
        "doc-block" => Some(Box::new(DocBlockPass)),
        _ => None,
    }
}

fn field(pass: &dyn ModifierPass, name: &str, value: Value) -> Member {
    Member::new(MemberKind::Field, name, format!("pass:{}", pass.id())).with_value(value)
}

fn constant(pass: &dyn ModifierPass, name: &str, value: Value) -> Member {
    Member::new(MemberKind::Constant, name, format!("pass:{}", pass.id())).with_value(value)
}

fn created_at_column<'t>(table: &'t Table, config: &Config) -> SculptResult<Option<&'t Column>> {
    matching_date_column(table, config, "timestamps.created_at")
}

fn updated_at_column<'t>(table: &'t Table, config: &Config) -> SculptResult<Option<&'t Column>> {
    matching_date_column(table, config, "timestamps.updated_at")
}

fn matching_date_column<'t>(
    table: &'t Table,
    config: &Config,
    key: &str,
) -> SculptResult<Option<&'t Column>> {
    let patterns = config.get_patterns(key)?;
    Ok(table
        .columns
        .iter()
        .find(|c| c.is_date && Pattern::any_match(&patterns, &c.name)))
}

/// Records which table backs the class.
pub struct TableNamePass;

impl ModifierPass for TableNamePass {
    fn id(&self) -> &'static str {
        "table-name"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, _config: &Config) -> SculptResult<()> {
        skeleton.add_member(field(self, "table", Value::str(&table.name)))?;
        Ok(())
    }
}

/// Primary key name, increment behavior and key type.
pub struct PrimaryKeyPass;

impl ModifierPass for PrimaryKeyPass {
    fn id(&self) -> &'static str {
        "primary-key"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, _config: &Config) -> SculptResult<()> {
        let pk = match table.primary_key_column() {
            Some(pk) => pk,
            None => return Ok(()),
        };

        let key_type = match pk.cast_type {
            CastType::Int => "int",
            _ => "string",
        };
        let incrementing = pk.auto_increment && pk.cast_type == CastType::Int;

        skeleton.add_member(field(self, "primary_key", Value::str(&pk.name)))?;
        skeleton.add_member(field(self, "key_type", Value::str(key_type)))?;
        skeleton.add_member(field(self, "incrementing", Value::Bool(incrementing)))?;
        Ok(())
    }
}

/// Detects the created/updated column pair. When both are present the
/// column names are pinned as constants; otherwise timestamping is
/// switched off for the class.
pub struct TimestampsPass;

impl ModifierPass for TimestampsPass {
    fn id(&self) -> &'static str {
        "timestamps"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, config: &Config) -> SculptResult<()> {
        let created = created_at_column(table, config)?;
        let updated = updated_at_column(table, config)?;

        match (created, updated) {
            (Some(created), Some(updated)) => {
                skeleton.add_member(field(self, "timestamps", Value::Bool(true)))?;
                skeleton.add_member(constant(self, "CREATED_AT", Value::str(&created.name)))?;
                skeleton.add_member(constant(self, "UPDATED_AT", Value::str(&updated.name)))?;
            }
            _ => {
                skeleton.add_member(field(self, "timestamps", Value::Bool(false)))?;
            }
        }
        Ok(())
    }
}

/// Applies the soft-delete trait when the configured column is present.
pub struct SoftDeletesPass;

impl ModifierPass for SoftDeletesPass {
    fn id(&self) -> &'static str {
        "soft-deletes"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, config: &Config) -> SculptResult<()> {
        let column = match matching_date_column(table, config, "soft_deletes.column")? {
            Some(column) => column,
            None => return Ok(()),
        };

        let trait_path = config
            .get_str("soft_deletes.trait")
            .unwrap_or("orm::model::SoftDeletes")
            .to_string();
        skeleton.add_use(trait_path, None, UseKind::Trait)?;
        skeleton.add_member(constant(self, "DELETED_AT", Value::str(&column.name)))?;

        ensure_list(skeleton, "dates", self)?;
        if let Some(dates) = skeleton.fields.get_mut("dates")?.value_mut() {
            dates.push_unique(Value::str(&column.name));
        }
        Ok(())
    }
}

/// Collects remaining date columns into the dates list. Timestamp columns
/// are owned by the timestamps pass and stay out.
pub struct DatesPass;

impl ModifierPass for DatesPass {
    fn id(&self) -> &'static str {
        "dates"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, config: &Config) -> SculptResult<()> {
        let created = created_at_column(table, config)?.map(|c| c.name.clone());
        let updated = updated_at_column(table, config)?.map(|c| c.name.clone());

        ensure_list(skeleton, "dates", self)?;
        let dates = skeleton.fields.get_mut("dates")?;
        for column in table.columns.iter().filter(|c| c.is_date) {
            if Some(&column.name) == created.as_ref() || Some(&column.name) == updated.as_ref() {
                continue;
            }
            if let Some(list) = dates.value_mut() {
                list.push_unique(Value::str(&column.name));
            }
        }
        Ok(())
    }
}

/// Attribute casting map for columns with a non-string semantic type.
/// Columns already covered by the dates list are skipped.
pub struct CastsPass;

impl ModifierPass for CastsPass {
    fn id(&self) -> &'static str {
        "casts"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, _config: &Config) -> SculptResult<()> {
        let in_dates: Vec<String> = match skeleton.fields.get("dates").ok().and_then(Member::value)
        {
            Some(Value::List(items)) => items
                .iter()
                .filter_map(|v| match v {
                    Value::Str(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut casts = Value::empty_map();
        for column in &table.columns {
            if column.cast_type == CastType::String || column.auto_increment {
                continue;
            }
            if in_dates.contains(&column.name) {
                continue;
            }
            casts.map_insert(
                column.attribute_name(),
                Value::str(column.cast_type.as_str()),
            );
        }

        skeleton.add_member(field(self, "casts", casts))?;
        Ok(())
    }
}

/// Mass-assignable attribute list: everything except generated keys,
/// framework-managed date columns and configured exclusions.
pub struct FillablePass;

impl ModifierPass for FillablePass {
    fn id(&self) -> &'static str {
        "fillable"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, config: &Config) -> SculptResult<()> {
        let exclude = config.get_patterns("fillable.exclude")?;
        let created = created_at_column(table, config)?.map(|c| c.name.clone());
        let updated = updated_at_column(table, config)?.map(|c| c.name.clone());
        let soft_delete =
            matching_date_column(table, config, "soft_deletes.column")?.map(|c| c.name.clone());

        let managed = [created, updated, soft_delete];

        let fillable: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| !c.auto_increment)
            .filter(|c| table.primary_key.as_deref() != Some(c.name.as_str()))
            .filter(|c| !managed.iter().flatten().any(|m| *m == c.name))
            .filter(|c| !Pattern::any_match(&exclude, &c.name))
            .map(|c| c.attribute_name())
            .collect();

        skeleton.add_member(field(self, "fillable", Value::str_list(fillable)))?;
        Ok(())
    }
}

/// Attributes hidden from serialization, by configured pattern.
pub struct HiddenPass;

impl ModifierPass for HiddenPass {
    fn id(&self) -> &'static str {
        "hidden"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, config: &Config) -> SculptResult<()> {
        let patterns = config.get_patterns("hidden.columns")?;
        let hidden: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| Pattern::any_match(&patterns, &c.name))
            .map(|c| c.attribute_name())
            .collect();

        skeleton.add_member(field(self, "hidden", Value::str_list(hidden)))?;
        Ok(())
    }
}

/// Per-attribute documentation tags, rendered into the class doc block.
pub struct DocBlockPass;

impl ModifierPass for DocBlockPass {
    fn id(&self) -> &'static str {
        "doc-block"
    }

    fn apply(&self, skeleton: &mut Skeleton, table: &Table, _config: &Config) -> SculptResult<()> {
        for column in &table.columns {
            skeleton.add_doc_tag(column.attribute_name(), column.doc_type.clone())?;
        }
        Ok(())
    }
}

/// Collection fields may be absent when the skeleton was not seeded from a
/// descriptor (thin model layer); create an empty clean one on demand.
fn ensure_list(skeleton: &mut Skeleton, name: &str, pass: &dyn ModifierPass) -> SculptResult<()> {
    if !skeleton.fields.has(name) {
        skeleton.add_member(
            Member::seeded(
                MemberKind::Field,
                name,
                Value::str_list(Vec::<String>::new()),
                format!("pass:{}", pass.id()),
            )
            .with_value(Value::str_list(Vec::<String>::new())),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sculpt_introspect::{SchemaProvider, TypeMapper, YamlSchemaProvider};

    const SCHEMA: &str = r#"
driver: mysql
tables:
  - name: users
    columns:
      - name: id
        type: bigint
        unsigned: true
        auto_increment: true
        primary_key: true
      - name: name
        type: varchar
      - name: password
        type: varchar
      - name: age
        type: int
        nullable: true
      - name: created_at
        type: datetime
        nullable: true
      - name: updated_at
        type: datetime
        nullable: true
      - name: deleted_at
        type: datetime
        nullable: true
"#;

    fn users() -> Table {
        YamlSchemaProvider::from_yaml(SCHEMA, &TypeMapper::new())
            .unwrap()
            .describe_table("users")
            .unwrap()
    }

    fn run(pass_ids: &[&str]) -> Skeleton {
        let table = users();
        let config = Config::builtin();
        let mut skeleton = Skeleton::new("UserBase", "models::base");
        for id in pass_ids {
            pass_by_id(id)
                .unwrap()
                .apply(&mut skeleton, &table, &config)
                .unwrap();
        }
        skeleton
    }

    #[test]
    fn primary_key_pass_detects_incrementing_int() {
        let skeleton = run(&["primary-key"]);
        let fields = &skeleton.fields;
        assert_eq!(fields.get("primary_key").unwrap().value(), Some(&Value::str("id")));
        assert_eq!(fields.get("key_type").unwrap().value(), Some(&Value::str("int")));
        assert_eq!(fields.get("incrementing").unwrap().value(), Some(&Value::Bool(true)));
    }

    #[test]
    fn timestamps_pass_pins_column_constants() {
        let skeleton = run(&["timestamps"]);
        assert_eq!(
            skeleton.fields.get("timestamps").unwrap().value(),
            Some(&Value::Bool(true))
        );
        assert_eq!(
            skeleton.constants.get("CREATED_AT").unwrap().value(),
            Some(&Value::str("created_at"))
        );
        assert_eq!(
            skeleton.constants.get("UPDATED_AT").unwrap().value(),
            Some(&Value::str("updated_at"))
        );
    }

    #[test]
    fn soft_deletes_and_dates_deduplicate() {
        // both orders leave deleted_at in the list exactly once
        for order in [["soft-deletes", "dates"], ["dates", "soft-deletes"]] {
            let skeleton = run(&order);
            assert_eq!(
                skeleton.fields.get("dates").unwrap().value(),
                Some(&Value::str_list(["deleted_at"])),
                "pass order {:?}",
                order
            );
        }

        let skeleton = run(&["soft-deletes"]);
        assert_eq!(
            skeleton.constants.get("DELETED_AT").unwrap().value(),
            Some(&Value::str("deleted_at"))
        );
        assert_eq!(skeleton.uses_of(UseKind::Trait).count(), 1);
    }

    #[test]
    fn fillable_excludes_keys_managed_dates_and_patterns() {
        let skeleton = run(&["fillable"]);
        assert_eq!(
            skeleton.fields.get("fillable").unwrap().value(),
            Some(&Value::str_list(["name", "age"]))
        );
    }

    #[test]
    fn hidden_matches_configured_patterns() {
        let skeleton = run(&["hidden"]);
        assert_eq!(
            skeleton.fields.get("hidden").unwrap().value(),
            Some(&Value::str_list(["password"]))
        );
    }

    #[test]
    fn casts_skip_strings_keys_and_dates() {
        let skeleton = run(&["dates", "casts"]);
        let casts = skeleton.fields.get("casts").unwrap().value().unwrap();
        assert_eq!(
            casts,
            &Value::Map(vec![
                ("age".to_string(), Value::str("int")),
                ("created_at".to_string(), Value::str("datetime")),
                ("updated_at".to_string(), Value::str("datetime")),
            ])
        );
    }

    #[test]
    fn unknown_pass_id_is_none() {
        assert!(pass_by_id("relationships").is_none());
    }
}
