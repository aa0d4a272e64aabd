//! Static descriptor of the base parent class being extended.
//!
//! Seeding defaults from a live class loader would couple the generator to
//! a runtime; instead the parent's members are supplied as a versioned data
//! table, either the built-in conventional ORM base model or one loaded
//! from a YAML document.

use crate::member::{MemberKind, Qualifiers, Value, Visibility};
use sculpt_core::{SculptError, SculptResult};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct DescriptorMember {
    pub name: String,
    pub kind: MemberKind,
    pub value: Value,
    pub qualifiers: Qualifiers,
    pub doc: Option<String>,
}

impl DescriptorMember {
    fn field(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            kind: MemberKind::Field,
            value,
            qualifiers: Qualifiers::default(),
            doc: None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.qualifiers.visibility == Visibility::Private
    }
}

/// Versioned member table for one parent class.
#[derive(Debug, Clone)]
pub struct ParentDescriptor {
    pub name: String,
    pub version: u32,
    members: Vec<DescriptorMember>,
}

impl ParentDescriptor {
    /// The conventional ORM base model: integer `id` primary key,
    /// auto-incrementing, timestamps on, empty attribute lists.
    pub fn builtin() -> Self {
        let private = Qualifiers {
            visibility: Visibility::Private,
            ..Qualifiers::default()
        };

        let mut members = vec![
            DescriptorMember::field("table", Value::Null),
            DescriptorMember::field("connection", Value::Null),
            DescriptorMember::field("primary_key", Value::str("id")),
            DescriptorMember::field("key_type", Value::str("int")),
            DescriptorMember::field("incrementing", Value::Bool(true)),
            DescriptorMember::field("timestamps", Value::Bool(true)),
            DescriptorMember::field("per_page", Value::Int(15)),
            DescriptorMember::field("fillable", Value::str_list(Vec::<String>::new())),
            DescriptorMember::field("hidden", Value::str_list(Vec::<String>::new())),
            DescriptorMember::field("casts", Value::empty_map()),
            DescriptorMember::field("dates", Value::str_list(Vec::<String>::new())),
        ];

        // internal bookkeeping member, never copied into skeletons
        members.push(DescriptorMember {
            name: "booted".to_string(),
            kind: MemberKind::Field,
            value: Value::Bool(false),
            qualifiers: private,
            doc: None,
        });

        Self {
            name: "Model".to_string(),
            version: 1,
            members,
        }
    }

    pub fn from_yaml(content: &str) -> SculptResult<Self> {
        let doc: DescriptorDoc = serde_yaml::from_str(content)?;
        let members = doc
            .members
            .into_iter()
            .map(DescriptorMember::try_from)
            .collect::<SculptResult<Vec<_>>>()?;

        Ok(Self {
            name: doc.name,
            version: doc.version,
            members,
        })
    }

    pub fn members(&self) -> &[DescriptorMember] {
        &self.members
    }

    /// Members a subclass inherits, in declaration order.
    pub fn inheritable_members(&self) -> impl Iterator<Item = &DescriptorMember> {
        self.members.iter().filter(|m| !m.is_private())
    }
}

#[derive(Debug, Deserialize)]
struct DescriptorDoc {
    name: String,
    #[serde(default = "default_version")]
    version: u32,
    members: Vec<MemberDoc>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct MemberDoc {
    name: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    value: serde_yaml::Value,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    r#static: bool,
    doc: Option<String>,
}

fn default_kind() -> String {
    "field".to_string()
}

impl TryFrom<MemberDoc> for DescriptorMember {
    type Error = SculptError;

    fn try_from(doc: MemberDoc) -> SculptResult<Self> {
        let kind = match doc.kind.as_str() {
            "constant" => MemberKind::Constant,
            "field" => MemberKind::Field,
            "method" => MemberKind::Method,
            other => {
                return Err(SculptError::Configuration(format!(
                    "unknown member kind `{}` in parent descriptor",
                    other
                )))
            }
        };

        let visibility = match doc.visibility.as_deref() {
            None | Some("public") => Visibility::Public,
            Some("protected") => Visibility::Protected,
            Some("private") => Visibility::Private,
            Some(other) => {
                return Err(SculptError::Configuration(format!(
                    "unknown visibility `{}` in parent descriptor",
                    other
                )))
            }
        };

        Ok(Self {
            name: doc.name,
            kind,
            value: Value::from_yaml(&doc.value)?,
            qualifiers: Qualifiers {
                visibility,
                is_static: doc.r#static,
                is_abstract: false,
            },
            doc: doc.doc,
        })
    }
}
