//! Per-artifact outcomes and the accumulated end-of-run summary.

use std::path::PathBuf;

/// What the regeneration guard did with one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    /// On-disk content already matches; nothing was written.
    Identical,
    /// Content differs but the override policy declined the write.
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Identical => "identical",
            Outcome::Skipped => "skipped",
        }
    }
}

/// Non-fatal findings. Warnings never abort a run; they are collected and
/// surfaced in the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Overwrite was declined while the new generation would have added
    /// lines the existing file lacks.
    PendingAdditions { path: PathBuf, inserted_lines: usize },
    /// Overwrite was declined but the only differences are lines the
    /// generator no longer produces.
    DiffersNotRequired { path: PathBuf },
    /// The parent recorded in the existing generated file no longer matches
    /// the configured parent. Signals configuration drift or a hand edit.
    ParentDrift {
        path: PathBuf,
        expected: String,
        found: String,
    },
    /// A file in the output directory not accounted for by the current
    /// generation set.
    StaleFile { path: PathBuf },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::PendingAdditions {
                path,
                inserted_lines,
            } => write!(
                f,
                "{}: update cancelled, {} pending generator-driven line(s) not applied",
                path.display(),
                inserted_lines
            ),
            Warning::DiffersNotRequired { path } => {
                write!(f, "{}: differs, but no update required", path.display())
            }
            Warning::ParentDrift {
                path,
                expected,
                found,
            } => write!(
                f,
                "{}: extends `{}` but configuration expects `{}`",
                path.display(),
                found,
                expected
            ),
            Warning::StaleFile { path } => {
                write!(f, "{}: not produced by the current generation set", path.display())
            }
        }
    }
}

/// Result of processing one table in a bulk run.
#[derive(Debug)]
pub struct TableReport {
    pub table: String,
    pub artifacts: Vec<(PathBuf, Outcome)>,
    pub error: Option<String>,
}

impl TableReport {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            artifacts: Vec::new(),
            error: None,
        }
    }

    pub fn record(&mut self, path: PathBuf, outcome: Outcome) {
        self.artifacts.push((path, outcome));
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Accumulated state for a whole run across tables.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<TableReport>,
    pub warnings: Vec<Warning>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_report(&mut self, report: TableReport) {
        self.reports.push(report);
    }

    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn failures(&self) -> impl Iterator<Item = &TableReport> {
        self.reports.iter().filter(|r| r.failed())
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.reports
            .iter()
            .flat_map(|r| r.artifacts.iter())
            .filter(|(_, o)| *o == outcome)
            .count()
    }
}
