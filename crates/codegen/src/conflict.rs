//! The rule set deciding whether two definitions of the same named entity
//! may coexist. Registries and the skeleton call in here at registration
//! time; conflicts are never deferred.

use crate::member::Member;
use sculpt_core::CompositionError;
use std::collections::HashMap;

/// Outcome of resolving a member registration against an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberResolution {
    /// No existing entry; insert the incoming one.
    Insert,
    /// Existing entry is still at its default; the incoming definition
    /// replaces its payload (last write wins while clean).
    ReplaceClean,
    /// Existing entry is dirty but the incoming definition is deep-equal;
    /// silently keep the first entry.
    IdenticalNoOp,
}

/// Member rule: a re-registration is accepted while the existing entry is
/// not dirty, regardless of qualifier mismatch. A dirty entry only
/// tolerates a behaviorally identical redefinition.
pub fn resolve_member(
    existing: Option<&Member>,
    incoming: &Member,
) -> Result<MemberResolution, CompositionError> {
    let existing = match existing {
        None => return Ok(MemberResolution::Insert),
        Some(member) => member,
    };

    if !existing.is_dirty() {
        return Ok(MemberResolution::ReplaceClean);
    }

    if existing.value() == incoming.value() && existing.qualifiers == incoming.qualifiers {
        return Ok(MemberResolution::IdenticalNoOp);
    }

    Err(CompositionError::MemberRedefinition {
        name: existing.name().to_string(),
        first_source: existing.source().to_string(),
        second_source: incoming.source().to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasResolution {
    New,
    /// Exact (name, alias) pair already registered.
    NoOp,
}

/// Import rule: each name binds exactly one alias and each alias resolves
/// to exactly one name; re-registering the same pair is a silent no-op.
pub fn resolve_alias(
    by_name: &HashMap<String, String>,
    by_alias: &HashMap<String, String>,
    name: &str,
    alias: &str,
) -> Result<AliasResolution, CompositionError> {
    if let Some(existing_name) = by_alias.get(alias) {
        if existing_name != name {
            return Err(CompositionError::AliasConflict {
                attempted: name.to_string(),
                alias: alias.to_string(),
                existing: existing_name.clone(),
            });
        }
    }

    if let Some(existing_alias) = by_name.get(name) {
        if existing_alias != alias {
            return Err(CompositionError::NameConflict {
                name: name.to_string(),
                attempted_alias: alias.to_string(),
                existing_alias: existing_alias.clone(),
            });
        }
        return Ok(AliasResolution::NoOp);
    }

    Ok(AliasResolution::New)
}

/// Tag rule: a tag name colliding with a structural member is a hard
/// error. Duplicate names among tags themselves are merged later by a
/// rendering pass, not rejected here.
pub fn resolve_tag(tag: &str, collides_with_member: bool) -> Result<(), CompositionError> {
    if collides_with_member {
        return Err(CompositionError::DuplicateTag(tag.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{MemberKind, Value};

    #[test]
    fn alias_rebind_fails() {
        let mut by_name = HashMap::new();
        let mut by_alias = HashMap::new();
        by_name.insert("orm::SoftDeletes".to_string(), "SoftDeletes".to_string());
        by_alias.insert("SoftDeletes".to_string(), "orm::SoftDeletes".to_string());

        let err = resolve_alias(&by_name, &by_alias, "app::SoftDeletes", "SoftDeletes").unwrap_err();
        assert!(matches!(err, CompositionError::AliasConflict { .. }));

        let err = resolve_alias(&by_name, &by_alias, "orm::SoftDeletes", "Trash").unwrap_err();
        assert!(matches!(err, CompositionError::NameConflict { .. }));

        assert_eq!(
            resolve_alias(&by_name, &by_alias, "orm::SoftDeletes", "SoftDeletes").unwrap(),
            AliasResolution::NoOp
        );
    }

    #[test]
    fn qualifier_mismatch_is_secondary_to_the_dirty_gate() {
        use crate::member::{Qualifiers, Visibility};

        let clean = Member::seeded(MemberKind::Field, "per_page", Value::Int(15), "parent:Model");
        let incoming = Member::new(MemberKind::Field, "per_page", "pass:x")
            .with_value(Value::Int(15))
            .with_qualifiers(Qualifiers {
                visibility: Visibility::Protected,
                is_static: true,
                is_abstract: false,
            });

        // clean entry accepts even with a qualifier mismatch
        assert_eq!(
            resolve_member(Some(&clean), &incoming).unwrap(),
            MemberResolution::ReplaceClean
        );
    }
}
