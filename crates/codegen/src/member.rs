//! Class members and the per-kind registry.
//!
//! A member carries two values: the `default` it inherited from the parent
//! at seeding time and the `value` modifier passes have left it with. Only
//! dirty members (value deep-unequal to default) are worth emitting in the
//! generated subclass body.

use crate::conflict::{self, MemberResolution};
use sculpt_core::{CompositionError, SculptError, SculptResult};
use std::collections::HashMap;

/// Deep-comparable member value. Equality is structural, which is what
/// dirty detection is defined over.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    /// Insertion-ordered key/value pairs; passes insert deterministically
    /// so ordering is stable run over run.
    Map(Vec<(String, Value)>),
    /// Verbatim code block, used by method members.
    Code(String),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn str_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::Str(s.into())).collect())
    }

    pub fn empty_map() -> Self {
        Value::Map(Vec::new())
    }

    /// Append to a list value, skipping deep-equal duplicates.
    pub fn push_unique(&mut self, item: Value) {
        if let Value::List(items) = self {
            if !items.contains(&item) {
                items.push(item);
            }
        }
    }

    /// Insert into a map value; an existing key keeps its position and
    /// takes the new value.
    pub fn map_insert(&mut self, key: impl Into<String>, value: Value) {
        if let Value::Map(pairs) = self {
            let key = key.into();
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(pair) => pair.1 = value,
                None => pairs.push((key, value)),
            }
        }
    }

    /// Numbers must fit `i64`; floats and overflowing values are rejected
    /// rather than degraded to null.
    pub fn from_yaml(value: &serde_yaml::Value) -> SculptResult<Self> {
        match value {
            serde_yaml::Value::Null => Ok(Value::Null),
            serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_yaml::Value::Number(n) => n.as_i64().map(Value::Int).ok_or_else(|| {
                SculptError::Configuration(format!(
                    "unsupported numeric value `{}`: member values take integers only",
                    n
                ))
            }),
            serde_yaml::Value::String(s) => Ok(Value::Str(s.clone())),
            serde_yaml::Value::Sequence(items) => Ok(Value::List(
                items
                    .iter()
                    .map(Value::from_yaml)
                    .collect::<SculptResult<_>>()?,
            )),
            serde_yaml::Value::Mapping(map) => Ok(Value::Map(
                map.iter()
                    .filter_map(|(k, v)| k.as_str().map(|k| (k, v)))
                    .map(|(k, v)| Ok((k.to_string(), Value::from_yaml(v)?)))
                    .collect::<SculptResult<_>>()?,
            )),
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(&tagged.value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Constant,
    Field,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Declared qualifier set for fields and methods. Compared for
/// compatibility, never for dirtiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qualifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    kind: MemberKind,
    default: Option<Value>,
    value: Option<Value>,
    pub qualifiers: Qualifiers,
    pub doc_comment: Option<String>,
    /// Contributing source, named in conflict errors
    /// (`parent:Model`, `pass:timestamps`, ...).
    source: String,
}

impl Member {
    /// A member created empty, with no inherited default.
    pub fn new(kind: MemberKind, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            value: None,
            qualifiers: Qualifiers::default(),
            doc_comment: None,
            source: source.into(),
        }
    }

    /// A member seeded from a parent: default and current value start equal,
    /// so dirtiness is computed relative to this parent.
    pub fn seeded(
        kind: MemberKind,
        name: impl Into<String>,
        default: Value,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default.clone()),
            value: Some(default),
            qualifiers: Qualifiers::default(),
            doc_comment: None,
            source: source.into(),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_qualifiers(mut self, qualifiers: Qualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }

    /// Mutable access for in-place list/map edits; treats an unset value
    /// as worth creating first via [`set_value`](Self::set_value).
    pub fn value_mut(&mut self) -> Option<&mut Value> {
        self.value.as_mut()
    }

    /// Deep inequality of current value against the inherited default.
    pub fn is_dirty(&self) -> bool {
        self.value != self.default
    }

    /// Adopt another definition's payload while keeping this entry's
    /// default, so dirtiness stays relative to the original parent.
    pub(crate) fn adopt(&mut self, other: &Member) {
        self.value = other.value.clone();
        self.qualifiers = other.qualifiers;
        if other.doc_comment.is_some() {
            self.doc_comment = other.doc_comment.clone();
        }
        self.source = other.source.clone();
    }
}

/// Named members in insertion order. Ordering is significant: it drives
/// emitted source ordering, which must be deterministic run over run.
#[derive(Debug, Clone, Default)]
pub struct MemberRegistry {
    order: Vec<String>,
    members: HashMap<String, Member>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member under the conflict-resolver rules: a clean
    /// existing entry accepts the new definition (last write wins), a
    /// dirty one only tolerates a deep-identical redefinition.
    pub fn add(&mut self, member: Member) -> Result<(), CompositionError> {
        match conflict::resolve_member(self.members.get(member.name()), &member)? {
            MemberResolution::Insert => {
                self.order.push(member.name().to_string());
                self.members.insert(member.name().to_string(), member);
            }
            MemberResolution::ReplaceClean => {
                if let Some(existing) = self.members.get_mut(member.name()) {
                    existing.adopt(&member);
                }
            }
            MemberResolution::IdenticalNoOp => {}
        }
        Ok(())
    }

    /// Strict insert used while seeding: the same name twice is a hard
    /// error regardless of dirtiness.
    pub fn add_unique(&mut self, member: Member) -> Result<(), CompositionError> {
        if self.members.contains_key(member.name()) {
            return Err(CompositionError::DuplicateMember(member.name().to_string()));
        }
        self.order.push(member.name().to_string());
        self.members.insert(member.name().to_string(), member);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Member, CompositionError> {
        self.members
            .get(name)
            .ok_or_else(|| CompositionError::MemberNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Member, CompositionError> {
        self.members
            .get_mut(name)
            .ok_or_else(|| CompositionError::MemberNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Remove silently; absent names are a no-op.
    pub fn remove(&mut self, name: &str) {
        if self.members.remove(name).is_some() {
            self.order.retain(|n| n != name);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.order.iter().filter_map(|name| self.members.get(name))
    }

    /// Dirty subset in insertion order.
    pub fn dirty(&self) -> Vec<&Member> {
        self.iter().filter(|m| m.is_dirty()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
