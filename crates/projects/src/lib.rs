//! Projects domain module.
//!
//! Pure record types and validation rules; storage and HTTP live elsewhere.

pub mod project;

pub use project::{NewProject, Phase, Priority, Project, ProjectId, ProjectPatch, ProjectStatus};
