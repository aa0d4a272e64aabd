//! Builds one skeleton for one table: seed the registries from a parent,
//! then run the configured modifier passes in order. Any pass failure
//! aborts the build; partial skeletons are never handed to the renderer.

use crate::descriptor::ParentDescriptor;
use crate::member::{Member, Visibility};
use crate::passes::{self, ModifierPass};
use crate::skeleton::Skeleton;
use sculpt_core::{Config, SculptError, SculptResult};
use sculpt_introspect::Table;

/// What the new class extends and where its inherited defaults come from.
pub enum ParentSource<'a> {
    /// Introspect a static descriptor of the parent class.
    Descriptor(&'a ParentDescriptor),
    /// Inherit from a skeleton built earlier in the same run.
    Skeleton(&'a Skeleton),
}

pub struct SkeletonComposer<'a> {
    config: &'a Config,
    passes: Vec<Box<dyn ModifierPass>>,
}

impl std::fmt::Debug for SkeletonComposer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkeletonComposer").finish_non_exhaustive()
    }
}

impl<'a> SkeletonComposer<'a> {
    /// Composer with the stock pass order.
    pub fn new(config: &'a Config) -> SculptResult<Self> {
        Self::with_passes(config, passes::DEFAULT_PASS_IDS)
    }

    /// Composer with an explicit ordered pass list. Unknown pass ids are a
    /// configuration error raised before any table is processed.
    pub fn with_passes(config: &'a Config, pass_ids: &[&str]) -> SculptResult<Self> {
        let passes = pass_ids
            .iter()
            .map(|id| {
                passes::pass_by_id(id).ok_or_else(|| {
                    SculptError::Configuration(format!("unknown modifier pass `{}`", id))
                })
            })
            .collect::<SculptResult<Vec<_>>>()?;

        Ok(Self { config, passes })
    }

    /// Build a skeleton for `table`. With `seed_members` every non-private
    /// parent member is copied in as both default and current value, so
    /// dirtiness is relative to this parent; the thin model layer passes
    /// `false` and only records the parent name.
    pub fn compose(
        &self,
        table: &Table,
        class_name: &str,
        namespace: &str,
        parent: ParentSource<'_>,
        seed_members: bool,
    ) -> SculptResult<Skeleton> {
        let mut skeleton = Skeleton::new(class_name, namespace);
        self.seed(&mut skeleton, parent, seed_members)?;

        for pass in &self.passes {
            tracing::trace!(pass = pass.id(), table = %table.name, "applying modifier pass");
            pass.apply(&mut skeleton, table, self.config)?;
        }

        tracing::debug!(
            class = %skeleton.qualified_name(),
            table = %table.name,
            dirty_fields = skeleton.fields.dirty().len(),
            "skeleton composed"
        );
        Ok(skeleton)
    }

    fn seed(
        &self,
        skeleton: &mut Skeleton,
        parent: ParentSource<'_>,
        seed_members: bool,
    ) -> SculptResult<()> {
        match parent {
            ParentSource::Descriptor(descriptor) => {
                skeleton.set_parent(&descriptor.name);
                if !seed_members {
                    return Ok(());
                }
                let source = format!("parent:{}", descriptor.name);
                for member in descriptor.inheritable_members() {
                    let mut seeded =
                        Member::seeded(member.kind, &member.name, member.value.clone(), &source);
                    seeded.qualifiers = member.qualifiers;
                    if let Some(doc) = &member.doc {
                        seeded.doc_comment = Some(doc.clone());
                    }
                    skeleton.registry_mut(member.kind).add_unique(seeded)?;
                }
            }
            ParentSource::Skeleton(parent) => {
                skeleton.set_parent(&parent.class_name);
                if !seed_members {
                    return Ok(());
                }
                let source = format!("parent:{}", parent.class_name);
                for registry in [&parent.constants, &parent.fields, &parent.methods] {
                    for member in registry
                        .iter()
                        .filter(|m| m.qualifiers.visibility != Visibility::Private)
                    {
                        let value = member.value().cloned().unwrap_or(crate::member::Value::Null);
                        let mut seeded =
                            Member::seeded(member.kind(), member.name(), value, &source);
                        seeded.qualifiers = member.qualifiers;
                        skeleton.registry_mut(member.kind()).add_unique(seeded)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::Value;
    use crate::skeleton::UseKind;
    use sculpt_introspect::{SchemaProvider, TypeMapper, YamlSchemaProvider};

    const SCHEMA: &str = r#"
driver: mysql
tables:
  - name: users
    columns:
      - name: id
        type: bigint
        auto_increment: true
        primary_key: true
      - name: name
        type: varchar
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

    #[test]
    fn end_to_end_users_table() {
        let config = Config::builtin();
        let descriptor = ParentDescriptor::builtin();
        let composer = SkeletonComposer::new(&config).unwrap();

        let skeleton = composer
            .compose(
                &users(),
                "UserBase",
                "models::base",
                ParentSource::Descriptor(&descriptor),
                true,
            )
            .unwrap();

        assert_eq!(skeleton.parent(), Some("Model"));
        let fields = &skeleton.fields;
        assert_eq!(fields.get("primary_key").unwrap().value(), Some(&Value::str("id")));
        assert_eq!(fields.get("incrementing").unwrap().value(), Some(&Value::Bool(true)));
        assert_eq!(fields.get("key_type").unwrap().value(), Some(&Value::str("int")));
        assert_eq!(fields.get("timestamps").unwrap().value(), Some(&Value::Bool(true)));
        assert_eq!(
            skeleton.constants.get("CREATED_AT").unwrap().value(),
            Some(&Value::str("created_at"))
        );
        assert_eq!(
            skeleton.constants.get("UPDATED_AT").unwrap().value(),
            Some(&Value::str("updated_at"))
        );
        assert_eq!(
            skeleton.constants.get("DELETED_AT").unwrap().value(),
            Some(&Value::str("deleted_at"))
        );
        // soft-delete trait applied, deleted_at in dates exactly once
        assert_eq!(skeleton.uses_of(UseKind::Trait).count(), 1);
        assert_eq!(
            fields.get("dates").unwrap().value(),
            Some(&Value::str_list(["deleted_at"]))
        );

        // inherited values still at their default stay clean
        assert!(!fields.get("primary_key").unwrap().is_dirty());
        assert!(!fields.get("timestamps").unwrap().is_dirty());
        assert!(fields.get("table").unwrap().is_dirty());
        assert!(fields.get("dates").unwrap().is_dirty());
    }

    #[test]
    fn model_layer_inherits_without_member_seeding() {
        let config = Config::builtin();
        let descriptor = ParentDescriptor::builtin();
        let composer = SkeletonComposer::new(&config).unwrap();

        let base = composer
            .compose(
                &users(),
                "UserBase",
                "models::base",
                ParentSource::Descriptor(&descriptor),
                true,
            )
            .unwrap();

        let model = SkeletonComposer::with_passes(&config, &[])
            .unwrap()
            .compose(
                &users(),
                "User",
                "models",
                ParentSource::Skeleton(&base),
                false,
            )
            .unwrap();

        assert_eq!(model.parent(), Some("UserBase"));
        assert!(model.fields.is_empty());
        assert!(model.constants.is_empty());
    }

    #[test]
    fn seeding_from_parent_skeleton_copies_members_as_defaults() {
        let config = Config::builtin();
        let descriptor = ParentDescriptor::builtin();
        let composer = SkeletonComposer::new(&config).unwrap();

        let base = composer
            .compose(
                &users(),
                "UserBase",
                "models::base",
                ParentSource::Descriptor(&descriptor),
                true,
            )
            .unwrap();

        let child = SkeletonComposer::with_passes(&config, &[])
            .unwrap()
            .compose(
                &users(),
                "AuditedUser",
                "models",
                ParentSource::Skeleton(&base),
                true,
            )
            .unwrap();

        // copied as default and current: nothing is dirty relative to base
        let table = child.fields.get("table").unwrap();
        assert_eq!(table.value(), Some(&Value::str("users")));
        assert!(!table.is_dirty());
    }

    #[test]
    fn unknown_pass_id_aborts_before_composition() {
        let config = Config::builtin();
        let err = SkeletonComposer::with_passes(&config, &["table-name", "relationships"])
            .unwrap_err();
        assert!(matches!(err, SculptError::Configuration(_)));
    }
}
