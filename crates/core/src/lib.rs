//! Core primitives shared across the sculpt workspace: the error taxonomy,
//! layered configuration with dotted-path lookup, shell-style pattern
//! matching, and run reporting types.

pub mod config;
pub mod error;
pub mod pattern;
pub mod report;

pub use config::Config;
pub use error::{CompositionError, SchemaError, SculptError, SculptResult};
pub use pattern::Pattern;
pub use report::{Outcome, RunSummary, TableReport, Warning};
