//! Skeleton composition and safe regeneration.
//!
//! The pipeline: a [`composer::SkeletonComposer`] seeds a
//! [`skeleton::Skeleton`] from a [`descriptor::ParentDescriptor`] and runs
//! ordered [`passes`] over it, with every registration routed through the
//! [`conflict`] rules; [`templates`] renders the result and the
//! [`guard::RegenerationGuard`] decides whether the rendered artifact may
//! replace what is on disk.

pub mod composer;
pub mod conflict;
pub mod descriptor;
pub mod diff;
pub mod generator;
pub mod guard;
pub mod member;
pub mod passes;
pub mod skeleton;
pub mod templates;

pub use composer::{ParentSource, SkeletonComposer};
pub use descriptor::ParentDescriptor;
pub use generator::ModelGenerator;
pub use guard::{
    AutoConfirm, Confirm, FileStore, MemoryFileStore, OsFileStore, OverridePolicy,
    ReconcileReport, RegenerationGuard,
};
pub use member::{Member, MemberKind, MemberRegistry, Qualifiers, Value, Visibility};
pub use skeleton::{Skeleton, Use, UseKind};
pub use templates::{Template, TemplateContext};
