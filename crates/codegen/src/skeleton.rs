//! The in-memory representation of one generated class before rendering.

use crate::conflict::{self, AliasResolution};
use crate::member::{Member, MemberKind, MemberRegistry};
use sculpt_core::CompositionError;
use std::collections::HashMap;

/// How an imported name participates in the class declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    /// Plain import, referenced from member bodies or documentation.
    Import,
    /// Interface the class implements.
    Interface,
    /// Trait mixed into the class body.
    Trait,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Use {
    pub name: String,
    pub alias: String,
    pub kind: UseKind,
}

/// One class under construction: identity, imports with bidirectional
/// name/alias uniqueness, documentation tags, and three member registries.
/// Lives for one generation run.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub class_name: String,
    pub namespace: String,
    parent: Option<String>,
    uses: Vec<Use>,
    by_name: HashMap<String, String>,
    by_alias: HashMap<String, String>,
    doc_tags: Vec<(String, String)>,
    pub constants: MemberRegistry,
    pub fields: MemberRegistry,
    pub methods: MemberRegistry,
}

impl Skeleton {
    pub fn new(class_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}::{}", self.namespace, self.class_name)
        }
    }

    pub fn set_parent(&mut self, parent: impl Into<String>) {
        self.parent = Some(parent.into());
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Register an imported name. The alias defaults to the last path
    /// segment. Enforced at registration: one alias per name, one name per
    /// alias; the exact same pair again is a silent no-op.
    pub fn add_use(
        &mut self,
        name: impl Into<String>,
        alias: Option<&str>,
        kind: UseKind,
    ) -> Result<(), CompositionError> {
        let name = name.into();
        let alias = alias
            .map(str::to_string)
            .unwrap_or_else(|| default_alias(&name));

        match conflict::resolve_alias(&self.by_name, &self.by_alias, &name, &alias)? {
            AliasResolution::NoOp => Ok(()),
            AliasResolution::New => {
                self.by_name.insert(name.clone(), alias.clone());
                self.by_alias.insert(alias.clone(), name.clone());
                self.uses.push(Use { name, alias, kind });
                Ok(())
            }
        }
    }

    /// Registered uses in insertion order.
    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    pub fn uses_of(&self, kind: UseKind) -> impl Iterator<Item = &Use> {
        self.uses.iter().filter(move |u| u.kind == kind)
    }

    /// Attach a documentation tag. A tag whose name collides with a
    /// structural member is rejected; duplicates among tags are kept and
    /// merged at render time.
    pub fn add_doc_tag(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), CompositionError> {
        let name = name.into();
        let collides = self.constants.has(&name) || self.fields.has(&name) || self.methods.has(&name);
        conflict::resolve_tag(&name, collides)?;
        self.doc_tags.push((name, value.into()));
        Ok(())
    }

    pub fn doc_tags(&self) -> &[(String, String)] {
        &self.doc_tags
    }

    pub fn registry(&self, kind: MemberKind) -> &MemberRegistry {
        match kind {
            MemberKind::Constant => &self.constants,
            MemberKind::Field => &self.fields,
            MemberKind::Method => &self.methods,
        }
    }

    pub fn registry_mut(&mut self, kind: MemberKind) -> &mut MemberRegistry {
        match kind {
            MemberKind::Constant => &mut self.constants,
            MemberKind::Field => &mut self.fields,
            MemberKind::Method => &mut self.methods,
        }
    }

    /// Route a member to the registry matching its kind.
    pub fn add_member(&mut self, member: Member) -> Result<(), CompositionError> {
        self.registry_mut(member.kind()).add(member)
    }
}

fn default_alias(name: &str) -> String {
    name.rsplit("::").next().unwrap_or(name).to_string()
}
