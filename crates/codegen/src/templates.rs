//! Structured template rendering.
//!
//! Stubs carry named `{{slot}}` markers; every slot is filled with a typed
//! value (identifier, code block, identifier list, doc block) so rendering
//! is not order-of-replacement-sensitive and multi-valued slots keep the
//! deterministic ordering the skeleton established.

use crate::member::{Member, MemberKind, Value};
use crate::skeleton::{Skeleton, UseKind};
use regex::Regex;
use sculpt_core::{SculptError, SculptResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Marker line recording the parent class in generated files. The
/// regeneration guard reads it back to detect hierarchy drift.
pub const EXTENDS_MARKER: &str = "// sculpt:extends ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Ident(String),
    CodeBlock(String),
    /// Pre-formatted lines, joined with newlines in order.
    Lines(Vec<String>),
    /// Doc lines, prefixed with `//!` at render time.
    DocBlock(Vec<String>),
}

impl SlotValue {
    fn format(&self) -> String {
        match self {
            SlotValue::Ident(s) => s.clone(),
            SlotValue::CodeBlock(s) => s.clone(),
            SlotValue::Lines(lines) => lines.join("\n"),
            SlotValue::DocBlock(lines) => lines
                .iter()
                .map(|l| {
                    if l.is_empty() {
                        "//!".to_string()
                    } else {
                        format!("//! {}", l)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    slots: BTreeMap<String, SlotValue>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: SlotValue) {
        self.slots.insert(name.to_string(), value);
    }

    pub fn ident(&mut self, name: &str, value: impl Into<String>) {
        self.insert(name, SlotValue::Ident(value.into()));
    }

    fn get(&self, name: &str) -> Option<&SlotValue> {
        self.slots.get(name)
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub text: String,
}

impl Template {
    pub fn base() -> Self {
        Self {
            name: "base".to_string(),
            text: BASE_TEMPLATE.to_string(),
        }
    }

    pub fn model() -> Self {
        Self {
            name: "model".to_string(),
            text: MODEL_TEMPLATE.to_string(),
        }
    }

    /// User-supplied stub override. A missing or unreadable stub is a
    /// render error for the artifact, not an io error.
    pub fn from_path(path: &Path) -> SculptResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SculptError::Render(format!("stub `{}` unreadable: {}", path.display(), e))
        })?;
        Ok(Self {
            name: path.display().to_string(),
            text,
        })
    }
}

static BASE_TEMPLATE: &str = r#"//! Generated from table `{{table}}`. Regenerated on every run; edits
//! here will be overwritten.

{{imports}}
{{doc_block}}
// sculpt:extends {{parent}}
pub struct {{class_name}};

impl {{class_name}} {
{{constants}}
{{fields}}
{{methods}}
}

{{traits}}
"#;

static MODEL_TEMPLATE: &str = r#"//! `{{class_name}}` model layer. Generated once; safe to extend by
//! hand, regeneration will not overwrite this file.

{{imports}}
// sculpt:extends {{parent}}
pub type {{class_name}} = {{parent}};
"#;

/// Substitute every `{{slot}}` marker from the context. A marker without a
/// slot value fails; nothing is substituted positionally.
pub fn render(template: &Template, context: &TemplateContext) -> SculptResult<String> {
    let marker = Regex::new(r"\{\{([a-z_]+)\}\}").map_err(|e| SculptError::Render(e.to_string()))?;

    let mut missing: Vec<String> = Vec::new();
    let rendered = marker.replace_all(&template.text, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match context.get(name) {
            Some(value) => value.format(),
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(SculptError::Render(format!(
            "stub `{}` references unfilled slot(s): {}",
            template.name,
            missing.join(", ")
        )));
    }

    // collapse the blank lines empty sections leave behind
    let mut out = String::with_capacity(rendered.len());
    let mut blank_run = 0;
    for line in rendered.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Assemble the context for a fully generated base-class file.
pub fn base_context(skeleton: &Skeleton, table_name: &str) -> TemplateContext {
    let mut context = TemplateContext::new();
    context.ident("class_name", &skeleton.class_name);
    context.ident("parent", skeleton.parent().unwrap_or("Model"));
    context.ident("table", table_name);
    context.insert("imports", SlotValue::Lines(use_lines(skeleton)));
    context.insert("doc_block", SlotValue::DocBlock(doc_lines(skeleton)));
    context.insert(
        "constants",
        SlotValue::CodeBlock(member_block(&skeleton.constants.dirty())),
    );
    context.insert(
        "fields",
        SlotValue::CodeBlock(member_block(&skeleton.fields.dirty())),
    );
    context.insert(
        "methods",
        SlotValue::CodeBlock(member_block(&skeleton.methods.dirty())),
    );
    context.insert("traits", SlotValue::Lines(trait_lines(skeleton)));
    context
}

/// Assemble the context for the thin, generated-once model file.
pub fn model_context(skeleton: &Skeleton, base_module: &str) -> TemplateContext {
    let mut context = TemplateContext::new();
    context.ident("class_name", &skeleton.class_name);
    context.ident("parent", skeleton.parent().unwrap_or("Model"));

    let mut lines = vec![format!(
        "use super::base::{}::{};",
        base_module,
        skeleton.parent().unwrap_or("Model")
    )];
    lines.extend(use_lines(skeleton));
    context.insert("imports", SlotValue::Lines(lines));
    context
}

fn use_lines(skeleton: &Skeleton) -> Vec<String> {
    skeleton
        .uses()
        .iter()
        .map(|u| {
            let last = u.name.rsplit("::").next().unwrap_or(&u.name);
            if u.alias == last {
                format!("use {};", u.name)
            } else {
                format!("use {} as {};", u.name, u.alias)
            }
        })
        .collect()
}

/// Merge exact duplicate tags, keep first-seen order.
fn doc_lines(skeleton: &Skeleton) -> Vec<String> {
    let mut seen: Vec<(String, String)> = Vec::new();
    for (name, value) in skeleton.doc_tags() {
        if !seen.iter().any(|(n, v)| n == name && v == value) {
            seen.push((name.clone(), value.clone()));
        }
    }
    seen.into_iter()
        .map(|(name, value)| format!("@property {} {}", value, name))
        .collect()
}

fn trait_lines(skeleton: &Skeleton) -> Vec<String> {
    skeleton
        .uses_of(UseKind::Trait)
        .map(|u| format!("impl {} for {} {{}}", u.alias, skeleton.class_name))
        .collect()
}

fn member_block(members: &[&Member]) -> String {
    let mut lines = Vec::new();
    for member in members {
        if let Some(doc) = &member.doc_comment {
            for line in doc.lines() {
                lines.push(format!("    /// {}", line));
            }
        }
        lines.push(member_line(member));
    }
    lines.join("\n")
}

fn member_line(member: &Member) -> String {
    let value = member.value().unwrap_or(&Value::Null);
    match member.kind() {
        MemberKind::Constant => format!(
            "    pub const {}: {} = {};",
            member.name(),
            const_type(value),
            literal(value)
        ),
        MemberKind::Field => format!(
            "    pub fn {}() -> {} {{\n        {}\n    }}",
            member.name(),
            fn_return_type(value),
            literal(value)
        ),
        MemberKind::Method => match value {
            Value::Code(code) => indent(code, 4),
            other => format!("    // {}: {}", member.name(), literal(other)),
        },
    }
}

fn const_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::Int(_) => "i64",
        _ => "&'static str",
    }
}

fn fn_return_type(value: &Value) -> String {
    match value {
        Value::Null => "Option<&'static str>".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Int(_) => "i64".to_string(),
        Value::Str(_) => "&'static str".to_string(),
        Value::List(_) => "&'static [&'static str]".to_string(),
        Value::Map(_) => "&'static [(&'static str, &'static str)]".to_string(),
        Value::Code(_) => "()".to_string(),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Str(s) => format!("{:?}", s),
        Value::List(items) => {
            let rendered: Vec<String> = items.iter().map(literal).collect();
            format!("&[{}]", rendered.join(", "))
        }
        Value::Map(pairs) => {
            let rendered: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("({:?}, {})", k, literal(v)))
                .collect();
            format!("&[{}]", rendered.join(", "))
        }
        Value::Code(code) => code.clone(),
    }
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|l| {
            if l.is_empty() {
                l.to_string()
            } else {
                format!("{}{}", pad, l)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{Member, MemberKind};

    fn skeleton() -> Skeleton {
        let mut skeleton = Skeleton::new("UserBase", "models::base");
        skeleton.set_parent("Model");
        skeleton
            .add_use("orm::model::SoftDeletes", None, UseKind::Trait)
            .unwrap();
        skeleton
            .add_member(
                Member::new(MemberKind::Constant, "DELETED_AT", "pass:soft-deletes")
                    .with_value(Value::str("deleted_at")),
            )
            .unwrap();
        skeleton
            .add_member(
                Member::new(MemberKind::Field, "table", "pass:table-name")
                    .with_value(Value::str("users")),
            )
            .unwrap();
        skeleton.add_doc_tag("id", "i64").unwrap();
        skeleton.add_doc_tag("id", "i64").unwrap(); // merged at render
        skeleton
    }

    #[test]
    fn renders_base_stub_with_typed_slots() {
        let skeleton = skeleton();
        let context = base_context(&skeleton, "users");
        let rendered = render(&Template::base(), &context).unwrap();

        assert!(rendered.contains("pub struct UserBase;"));
        assert!(rendered.contains("// sculpt:extends Model"));
        assert!(rendered.contains("pub const DELETED_AT: &'static str = \"deleted_at\";"));
        assert!(rendered.contains("pub fn table() -> &'static str"));
        assert!(rendered.contains("use orm::model::SoftDeletes;"));
        assert!(rendered.contains("impl SoftDeletes for UserBase {}"));
        // duplicate tag merged
        assert_eq!(rendered.matches("@property i64 id").count(), 1);
    }

    #[test]
    fn rendering_is_deterministic() {
        let skeleton = skeleton();
        let a = render(&Template::base(), &base_context(&skeleton, "users")).unwrap();
        let b = render(&Template::base(), &base_context(&skeleton, "users")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unfilled_slot_is_a_render_error() {
        let template = Template {
            name: "custom".to_string(),
            text: "{{class_name}} {{nonexistent}}".to_string(),
        };
        let mut context = TemplateContext::new();
        context.ident("class_name", "UserBase");

        let err = render(&template, &context).unwrap_err();
        assert!(matches!(err, SculptError::Render(_)));
        assert!(err.to_string().contains("nonexistent"));
    }

    #[test]
    fn missing_stub_file_is_a_render_error() {
        let err = Template::from_path(Path::new("/nonexistent/stub.rs.tmpl")).unwrap_err();
        assert!(matches!(err, SculptError::Render(_)));
    }

    #[test]
    fn value_literals() {
        assert_eq!(literal(&Value::str_list(["a", "b"])), "&[\"a\", \"b\"]");
        assert_eq!(
            literal(&Value::Map(vec![("age".into(), Value::str("int"))])),
            "&[(\"age\", \"int\")]"
        );
        assert_eq!(literal(&Value::Bool(true)), "true");
        assert_eq!(literal(&Value::Null), "None");
    }

    #[test]
    fn model_stub_references_base_module() {
        let mut skeleton = Skeleton::new("User", "models");
        skeleton.set_parent("UserBase");
        let rendered = render(&Template::model(), &model_context(&skeleton, "user")).unwrap();
        assert!(rendered.contains("pub type User = UserBase;"));
        assert!(rendered.contains("use super::base::user::UserBase;"));
    }
}
