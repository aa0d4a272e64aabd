//! Layered generator configuration.
//!
//! Lookup walks three layers from most to least specific: a
//! connection-specific overlay, a driver-specific overlay, then the tool
//! defaults. Keys are addressed with dotted paths (`timestamps.created_at`).

use crate::error::{SculptError, SculptResult};
use crate::pattern::Pattern;
use serde_yaml::Value;
use std::path::Path;

/// Tool defaults, always present as the lowest-precedence layer.
static DEFAULTS: &str = r#"
generation:
  namespace: "models"
  base_suffix: "Base"
  output_dir: "generated"
  override: "ask"
timestamps:
  created_at: "created_at|createdAt"
  updated_at: "updated_at|updatedAt"
soft_deletes:
  column: "deleted_at|deletedAt"
  trait: "orm::model::SoftDeletes"
fillable:
  exclude: "id|*_token|password|remember_token"
hidden:
  columns: "password|*_token|*secret*"
"#;

#[derive(Debug, Clone)]
pub struct Config {
    /// Precedence order: later layers win.
    layers: Vec<Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Config {
    /// Configuration consisting only of the tool defaults.
    pub fn builtin() -> Self {
        let defaults: Value =
            serde_yaml::from_str(DEFAULTS).unwrap_or(Value::Null);
        Self {
            layers: vec![defaults],
        }
    }

    /// Load a config document and assemble the layered view for one
    /// driver/connection pair. The document may carry `defaults`, `drivers.*`
    /// and `connections.*` sections; absent sections are skipped.
    pub fn load(path: &Path, driver: &str, connection: Option<&str>) -> SculptResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let doc: Value = serde_yaml::from_str(&content)?;
        let config = Self::from_document(&doc, driver, connection);
        tracing::debug!(
            path = %path.display(),
            driver = %driver,
            layers = config.layers.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn from_document(doc: &Value, driver: &str, connection: Option<&str>) -> Self {
        let mut config = Self::builtin();

        if let Some(defaults) = doc.get("defaults") {
            config.push_layer(defaults.clone());
        }
        if let Some(overlay) = doc.get("drivers").and_then(|d| d.get(driver)) {
            config.push_layer(overlay.clone());
        }
        if let Some(name) = connection {
            if let Some(overlay) = doc.get("connections").and_then(|c| c.get(name)) {
                config.push_layer(overlay.clone());
            }
        }

        config
    }

    pub fn push_layer(&mut self, layer: Value) {
        self.layers.push(layer);
    }

    /// Dotted-path lookup across layers, most specific first.
    pub fn get(&self, path: &str) -> Option<&Value> {
        for layer in self.layers.iter().rev() {
            if let Some(value) = lookup(layer, path) {
                return Some(value);
            }
        }
        None
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Read a pattern set. The value may be a single pattern string (already
    /// carrying `|` alternatives) or a list of pattern strings.
    pub fn get_patterns(&self, path: &str) -> SculptResult<Vec<Pattern>> {
        match self.get(path) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![Pattern::new(s)?]),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| match item.as_str() {
                    Some(s) => Pattern::new(s),
                    None => Err(SculptError::Configuration(format!(
                        "pattern list at `{}` must contain strings",
                        path
                    ))),
                })
                .collect(),
            Some(other) => Err(SculptError::Configuration(format!(
                "expected pattern string or list at `{}`, found {:?}",
                path, other
            ))),
        }
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn builtin_defaults_resolve() {
        let config = Config::builtin();
        assert_eq!(config.get_str("generation.base_suffix"), Some("Base"));
        assert_eq!(
            config.get_str("soft_deletes.column"),
            Some("deleted_at|deletedAt")
        );
    }

    #[test]
    fn connection_overlay_wins_over_driver_and_defaults() {
        let document = doc(r#"
defaults:
  timestamps:
    created_at: "creation_date"
drivers:
  mysql:
    timestamps:
      created_at: "created"
connections:
  main:
    timestamps:
      created_at: "made_at"
"#);
        let config = Config::from_document(&document, "mysql", Some("main"));
        assert_eq!(config.get_str("timestamps.created_at"), Some("made_at"));

        let config = Config::from_document(&document, "mysql", None);
        assert_eq!(config.get_str("timestamps.created_at"), Some("created"));

        let config = Config::from_document(&document, "pgsql", None);
        assert_eq!(config.get_str("timestamps.created_at"), Some("creation_date"));
    }

    #[test]
    fn missing_keys_fall_through_to_defaults() {
        let document = doc("defaults:\n  generation:\n    namespace: app\n");
        let config = Config::from_document(&document, "mysql", None);
        assert_eq!(config.get_str("generation.namespace"), Some("app"));
        // untouched default still visible
        assert_eq!(config.get_str("generation.base_suffix"), Some("Base"));
    }

    #[test]
    fn pattern_lists_compile() {
        let document = doc("defaults:\n  hidden:\n    columns:\n      - \"password\"\n      - \"*_secret\"\n");
        let config = Config::from_document(&document, "mysql", None);
        let patterns = config.get_patterns("hidden.columns").unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(Pattern::any_match(&patterns, "api_secret"));
        assert!(!Pattern::any_match(&patterns, "name"));
    }
}
