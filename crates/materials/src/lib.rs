//! Materials domain module.
//!
//! - `material`: the material master catalog
//! - `requirement`: planned quantities per project phase
//! - `transaction`: the append-only stock movement log
//! - `ledger`: read-side aggregation of that log into running totals

pub mod cost;
pub mod ledger;
pub mod material;
pub mod requirement;
pub mod transaction;

pub use cost::line_total;
pub use ledger::{LedgerSummary, MaterialLedger, TransactionFilter, ledger_for};
pub use material::{Material, MaterialId, MaterialPatch, NewMaterial};
pub use requirement::{MaterialRequirement, NewRequirement, RequirementId, RequirementPatch};
pub use transaction::{MaterialTransaction, NewTransaction, TransactionId, TransactionKind};
