//! `sitebook-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, the `Record` contract every stored
//! resource implements, and the lenient input decoders used by request DTOs.

pub mod error;
pub mod id;
pub mod input;
pub mod record;
pub mod validate;

pub use error::{DomainError, DomainResult};
pub use id::{TenantId, UserId};
pub use record::{Creatable, Editable, Record, Timestamps};
