//! Modelos neutrales (ResourceRef, StepContext).

pub mod context;
pub mod resource;

pub use context::StepContext;
pub use resource::{ResourceKind, ResourceRef};
