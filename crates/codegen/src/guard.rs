//! Decides whether a freshly rendered artifact may replace what is on
//! disk: identical content is a no-op, new files are written outright, and
//! a differing file is only overwritten when the override policy (or the
//! operator, under `ask`) allows it. Declined updates are classified by a
//! line diff so pending generator-driven additions are surfaced rather
//! than silently dropped.

use crate::diff::{diff_lines, DiffSummary};
use crate::templates::EXTENDS_MARKER;
use sculpt_core::{Outcome, SculptError, SculptResult, Warning};
use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Filesystem access used by the guard. Abstracted so decision logic is
/// testable and dry runs can target an in-memory store.
pub trait FileStore {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> SculptResult<String>;
    /// Returns the number of bytes actually written; the guard treats a
    /// shortfall as fatal for the artifact.
    fn write(&mut self, path: &Path, content: &str) -> SculptResult<usize>;
    fn mkdir_all(&mut self, path: &Path) -> SculptResult<()>;
    /// All files under `dir`, recursively. Used for stale-file detection;
    /// a missing directory is an empty listing, not an error.
    fn list(&self, dir: &Path) -> SculptResult<Vec<PathBuf>>;
}

pub struct OsFileStore;

impl FileStore for OsFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> SculptResult<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&mut self, path: &Path, content: &str) -> SculptResult<usize> {
        let mut file = std::fs::File::create(path)?;
        let written = file.write(content.as_bytes())?;
        file.flush()?;
        Ok(written)
    }

    fn mkdir_all(&mut self, path: &Path) -> SculptResult<()> {
        Ok(std::fs::create_dir_all(path)?)
    }

    fn list(&self, dir: &Path) -> SculptResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        if dir.is_dir() {
            collect_files(dir, &mut files)?;
        }
        files.sort();
        Ok(files)
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> SculptResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: HashMap<PathBuf, String>,
    /// When set, writes report at most this many bytes.
    pub short_write_limit: Option<usize>,
    pub writes: usize,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn get(&self, path: &Path) -> Option<&String> {
        self.files.get(path)
    }
}

impl FileStore for MemoryFileStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> SculptResult<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SculptError::Persistence(format!("{} not found", path.display())))
    }

    fn write(&mut self, path: &Path, content: &str) -> SculptResult<usize> {
        self.writes += 1;
        let written = self
            .short_write_limit
            .map(|limit| limit.min(content.len()))
            .unwrap_or(content.len());
        self.files
            .insert(path.to_path_buf(), content[..written].to_string());
        Ok(written)
    }

    fn mkdir_all(&mut self, _path: &Path) -> SculptResult<()> {
        Ok(())
    }

    fn list(&self, dir: &Path) -> SculptResult<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect();
        files.sort();
        Ok(files)
    }
}

/// Operator confirmation capability, injected so the `ask` policy is
/// testable without a terminal. Blocks until answered; no timeout.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Fixed-answer confirmation for non-interactive runs and tests.
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverridePolicy {
    Always,
    Never,
    Ask,
}

impl FromStr for OverridePolicy {
    type Err = SculptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(OverridePolicy::Always),
            "never" => Ok(OverridePolicy::Never),
            "ask" => Ok(OverridePolicy::Ask),
            other => Err(SculptError::Configuration(format!(
                "unknown override policy `{}`, expected always, never or ask",
                other
            ))),
        }
    }
}

#[derive(Debug)]
pub struct ReconcileReport {
    pub outcome: Outcome,
    pub warnings: Vec<Warning>,
}

pub struct RegenerationGuard<S: FileStore> {
    store: S,
}

impl<S: FileStore> RegenerationGuard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconcile one artifact with the file at `path`.
    pub fn reconcile(
        &mut self,
        path: &Path,
        content: &str,
        policy: OverridePolicy,
        expected_parent: Option<&str>,
        confirm: &mut dyn Confirm,
    ) -> SculptResult<ReconcileReport> {
        if !self.store.exists(path) {
            self.write_checked(path, content)?;
            tracing::info!(path = %path.display(), "created");
            return Ok(ReconcileReport {
                outcome: Outcome::Created,
                warnings: Vec::new(),
            });
        }

        let existing = self.store.read(path)?;
        if existing == content {
            return Ok(ReconcileReport {
                outcome: Outcome::Identical,
                warnings: Vec::new(),
            });
        }

        let mut warnings = Vec::new();

        // hierarchy drift is checked independently of the override decision
        if let Some(expected) = expected_parent {
            if let Some(found) = extract_parent(&existing) {
                if found != expected {
                    warnings.push(Warning::ParentDrift {
                        path: path.to_path_buf(),
                        expected: expected.to_string(),
                        found: found.to_string(),
                    });
                }
            }
        }

        let summary = DiffSummary::of(&diff_lines(&existing, content));

        let overwrite = match policy {
            OverridePolicy::Always => true,
            OverridePolicy::Never => false,
            OverridePolicy::Ask => confirm.confirm(&format!(
                "{} differs (+{} -{} lines); overwrite?",
                path.display(),
                summary.inserted,
                summary.deleted
            )),
        };

        if overwrite {
            self.write_checked(path, content)?;
            tracing::info!(path = %path.display(), "updated");
            return Ok(ReconcileReport {
                outcome: Outcome::Updated,
                warnings,
            });
        }

        if summary.has_insertions() {
            warnings.push(Warning::PendingAdditions {
                path: path.to_path_buf(),
                inserted_lines: summary.inserted,
            });
        } else {
            warnings.push(Warning::DiffersNotRequired {
                path: path.to_path_buf(),
            });
        }

        Ok(ReconcileReport {
            outcome: Outcome::Skipped,
            warnings,
        })
    }

    fn write_checked(&mut self, path: &Path, content: &str) -> SculptResult<()> {
        if let Some(parent) = path.parent() {
            self.store.mkdir_all(parent)?;
        }
        let written = self.store.write(path, content)?;
        if written < content.len() {
            return Err(SculptError::Persistence(format!(
                "{}: wrote {} of {} bytes",
                path.display(),
                written,
                content.len()
            )));
        }
        Ok(())
    }
}

/// Read the parent class recorded in a previously generated file.
pub fn extract_parent(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.trim_start().strip_prefix(EXTENDS_MARKER))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> RegenerationGuard<MemoryFileStore> {
        RegenerationGuard::new(MemoryFileStore::new())
    }

    fn path() -> PathBuf {
        PathBuf::from("models/base/user.rs")
    }

    #[test]
    fn missing_file_is_created() {
        let mut guard = guard();
        let report = guard
            .reconcile(&path(), "content\n", OverridePolicy::Never, None, &mut AutoConfirm(false))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Created);
        assert_eq!(guard.store().get(&path()).unwrap(), "content\n");
    }

    #[test]
    fn identical_content_is_a_no_op() {
        let mut guard = guard();
        guard.store.insert(path(), "same\n");
        let report = guard
            .reconcile(&path(), "same\n", OverridePolicy::Always, None, &mut AutoConfirm(false))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Identical);
        assert_eq!(guard.store().writes, 0);
    }

    #[test]
    fn regeneration_is_idempotent() {
        let mut guard = guard();
        let content = "a\nb\nc\n";
        let first = guard
            .reconcile(&path(), content, OverridePolicy::Ask, None, &mut AutoConfirm(false))
            .unwrap();
        assert_eq!(first.outcome, Outcome::Created);

        let second = guard
            .reconcile(&path(), content, OverridePolicy::Ask, None, &mut AutoConfirm(false))
            .unwrap();
        assert_eq!(second.outcome, Outcome::Identical);
        assert_eq!(guard.store().writes, 1);
    }

    #[test]
    fn always_overwrites_differing_content() {
        let mut guard = guard();
        guard.store.insert(path(), "old\n");
        let report = guard
            .reconcile(&path(), "new\n", OverridePolicy::Always, None, &mut AutoConfirm(false))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Updated);
        assert_eq!(guard.store().get(&path()).unwrap(), "new\n");
    }

    #[test]
    fn declined_update_with_insertions_warns_pending() {
        let mut guard = guard();
        guard.store.insert(path(), "a\nc\n");
        let report = guard
            .reconcile(&path(), "a\nb\nc\n", OverridePolicy::Never, None, &mut AutoConfirm(false))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Skipped);
        assert!(matches!(
            report.warnings.as_slice(),
            [Warning::PendingAdditions { inserted_lines: 1, .. }]
        ));
    }

    #[test]
    fn declined_update_without_insertions_is_milder() {
        let mut guard = guard();
        // the file carries extra hand-written lines the generator no
        // longer produces; nothing new is pending
        guard.store.insert(path(), "a\nhand edit\nb\n");
        let report = guard
            .reconcile(&path(), "a\nb\n", OverridePolicy::Never, None, &mut AutoConfirm(false))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Skipped);
        assert!(matches!(
            report.warnings.as_slice(),
            [Warning::DiffersNotRequired { .. }]
        ));
    }

    #[test]
    fn ask_policy_consults_the_capability() {
        let mut guard = guard();
        guard.store.insert(path(), "old\n");
        let report = guard
            .reconcile(&path(), "new\n", OverridePolicy::Ask, None, &mut AutoConfirm(true))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Updated);

        guard.store.insert(path(), "old\n");
        let report = guard
            .reconcile(&path(), "new\n", OverridePolicy::Ask, None, &mut AutoConfirm(false))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Skipped);
    }

    #[test]
    fn parent_drift_is_reported_independently_of_policy() {
        let mut guard = guard();
        guard
            .store
            .insert(path(), "// sculpt:extends TenantModel\nold\n");
        let report = guard
            .reconcile(
                &path(),
                "// sculpt:extends Model\nnew\n",
                OverridePolicy::Never,
                Some("Model"),
                &mut AutoConfirm(false),
            )
            .unwrap();
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::ParentDrift { found, .. } if found == "TenantModel")));
    }

    #[test]
    fn short_write_is_fatal() {
        let mut store = MemoryFileStore::new();
        store.short_write_limit = Some(3);
        let mut guard = RegenerationGuard::new(store);
        let err = guard
            .reconcile(&path(), "longer than three\n", OverridePolicy::Always, None, &mut AutoConfirm(false))
            .unwrap_err();
        assert!(matches!(err, SculptError::Persistence(_)));
    }

    #[test]
    fn extract_parent_reads_the_marker() {
        assert_eq!(
            extract_parent("//! doc\n// sculpt:extends Model\npub struct X;\n"),
            Some("Model")
        );
        assert_eq!(extract_parent("no marker here\n"), None);
    }
}
