use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainResult, Record, Timestamps, input, record_id, validate};

use crate::cost::line_total;
use crate::material::MaterialId;

record_id!(
    /// Material transaction identifier.
    TransactionId
);

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Received into stock.
    In,
    /// Consumed from stock.
    Out,
}

/// Record: one entry of the append-only material movement log.
///
/// Transactions are never updated or deleted; corrections are new entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTransaction {
    pub id: TransactionId,
    pub material_id: MaterialId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub quantity: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub date: NaiveDate,
    /// Procurement order that produced this movement, if any.
    pub reference_order: Option<Uuid>,
    pub supplier: Option<String>,
    pub project: Option<String>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub material_id: MaterialId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(deserialize_with = "input::number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub unit_cost: Option<f64>,
    /// Defaults to `quantity * unit_cost` when omitted.
    #[serde(default, deserialize_with = "input::opt_number")]
    pub total_cost: Option<f64>,
    /// Defaults to the day the entry is recorded.
    #[serde(default, deserialize_with = "input::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub reference_order: Option<Uuid>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

impl Record for MaterialTransaction {
    const RESOURCE: &'static str = "transactions";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn search_fields(&self) -> Vec<&str> {
        self.supplier
            .as_deref()
            .into_iter()
            .chain(self.project.as_deref())
            .chain(self.notes.as_deref())
            .collect()
    }
}

impl Creatable for MaterialTransaction {
    type Draft = NewTransaction;

    fn from_draft(id: Uuid, draft: NewTransaction, now: DateTime<Utc>) -> DomainResult<Self> {
        validate::positive("quantity", draft.quantity)?;
        let unit_cost = draft.unit_cost.unwrap_or(0.0);
        validate::non_negative("unit_cost", unit_cost)?;
        let total_cost = draft
            .total_cost
            .unwrap_or_else(|| line_total(draft.quantity, unit_cost));
        validate::non_negative("total_cost", total_cost)?;

        Ok(MaterialTransaction {
            id: TransactionId::from_uuid(id),
            material_id: draft.material_id,
            kind: draft.kind,
            quantity: draft.quantity,
            unit_cost,
            total_cost,
            date: draft.date.unwrap_or_else(|| now.date_naive()),
            reference_order: draft.reference_order,
            supplier: draft.supplier,
            project: draft.project,
            notes: draft.notes,
            timestamps: Timestamps::new(now),
        })
    }
}
