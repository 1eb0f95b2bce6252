use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{
    Creatable, DomainError, DomainResult, Editable, Record, Timestamps, input, record_id, validate,
};
use sitebook_materials::{MaterialId, NewTransaction, RequirementId, TransactionKind, line_total};

record_id!(
    /// Procurement order identifier.
    ProcurementOrderId
);

/// Delivery status of an order.
///
/// The usual path is `Pending -> Ordered -> Shipped -> Received`, with
/// `Delayed` and `Cancelled` as side states. Transitions are not restricted:
/// an order may be moved to any status by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Ordered,
    Shipped,
    Received,
    Delayed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Ordered,
        OrderStatus::Shipped,
        OrderStatus::Received,
        OrderStatus::Delayed,
        OrderStatus::Cancelled,
    ];

    /// Receiving is offered for every status except `Received`.
    pub fn can_receive(self) -> bool {
        self != OrderStatus::Received
    }
}

/// Actions a client may offer for an order in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderActions {
    pub receive: bool,
    pub edit: bool,
}

/// Record: a purchase of a material from a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementOrder {
    pub id: ProcurementOrderId,
    pub material_id: MaterialId,
    pub requirement_id: Option<RequirementId>,
    pub supplier: String,
    pub quantity: f64,
    pub unit_cost: f64,
    /// Always `quantity * unit_cost`.
    pub total_cost: f64,
    pub order_date: NaiveDate,
    pub expected_delivery: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProcurementOrder {
    pub material_id: MaterialId,
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub requirement_id: Option<RequirementId>,
    pub supplier: String,
    #[serde(deserialize_with = "input::number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub unit_cost: Option<f64>,
    /// Defaults to the day the order is recorded.
    #[serde(default, deserialize_with = "input::opt_date")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub expected_delivery: Option<NaiveDate>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcurementOrderPatch {
    pub material_id: Option<MaterialId>,
    #[serde(default, deserialize_with = "input::patch_ref")]
    pub requirement_id: Option<Option<RequirementId>>,
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub unit_cost: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "input::patch_date")]
    pub expected_delivery: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "input::patch_date")]
    pub received_date: Option<Option<NaiveDate>>,
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub notes: Option<Option<String>>,
}

impl ProcurementOrder {
    pub fn actions(&self) -> OrderActions {
        OrderActions {
            receive: self.status.can_receive(),
            edit: true,
        }
    }

    /// Mark the order received and describe the stock movement it produces.
    ///
    /// Fails with a conflict when the order was already received, in which
    /// case the order is left unchanged.
    pub fn receive(&mut self, now: DateTime<Utc>) -> DomainResult<NewTransaction> {
        if !self.status.can_receive() {
            return Err(DomainError::conflict("order has already been received"));
        }

        let today = now.date_naive();
        self.status = OrderStatus::Received;
        self.received_date = Some(today);
        self.timestamps.touch(now);

        Ok(NewTransaction {
            material_id: self.material_id,
            kind: TransactionKind::In,
            quantity: self.quantity,
            unit_cost: Some(self.unit_cost),
            total_cost: Some(self.total_cost),
            date: Some(today),
            reference_order: Some(*self.id.as_uuid()),
            supplier: Some(self.supplier.clone()),
            project: None,
            notes: self.notes.clone(),
        })
    }

    fn validate(&self) -> DomainResult<()> {
        validate::non_empty("supplier", &self.supplier)?;
        validate::positive("quantity", self.quantity)?;
        validate::non_negative("unit_cost", self.unit_cost)?;
        if let Some(expected) = self.expected_delivery {
            if expected < self.order_date {
                return Err(DomainError::validation(
                    "expected_delivery",
                    "must not be before order_date",
                ));
            }
        }
        Ok(())
    }

    fn recompute_total(&mut self) {
        self.total_cost = line_total(self.quantity, self.unit_cost);
    }

    fn fill(&mut self, draft: NewProcurementOrder, today: NaiveDate) {
        self.material_id = draft.material_id;
        self.requirement_id = draft.requirement_id;
        self.supplier = draft.supplier.trim().to_string();
        self.quantity = draft.quantity;
        self.unit_cost = draft.unit_cost.unwrap_or(0.0);
        self.order_date = draft.order_date.unwrap_or(today);
        self.expected_delivery = draft.expected_delivery;
        self.status = draft.status;
        self.notes = draft.notes;
        self.recompute_total();
    }
}

impl Record for ProcurementOrder {
    const RESOURCE: &'static str = "procurement";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.supplier.as_str()];
        fields.extend(self.notes.as_deref());
        fields
    }
}

impl Creatable for ProcurementOrder {
    type Draft = NewProcurementOrder;

    fn from_draft(id: Uuid, draft: NewProcurementOrder, now: DateTime<Utc>) -> DomainResult<Self> {
        let today = now.date_naive();
        let mut order = ProcurementOrder {
            id: ProcurementOrderId::from_uuid(id),
            material_id: draft.material_id,
            requirement_id: None,
            supplier: String::new(),
            quantity: 0.0,
            unit_cost: 0.0,
            total_cost: 0.0,
            order_date: today,
            expected_delivery: None,
            received_date: None,
            status: OrderStatus::default(),
            notes: None,
            timestamps: Timestamps::new(now),
        };
        order.fill(draft, today);
        order.validate()?;
        Ok(order)
    }
}

impl Editable for ProcurementOrder {
    type Patch = ProcurementOrderPatch;

    fn replace(&mut self, draft: NewProcurementOrder, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        next.fill(draft, now.date_naive());
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }

    fn apply_patch(&mut self, patch: ProcurementOrderPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(material_id) = patch.material_id {
            next.material_id = material_id;
        }
        if let Some(requirement_id) = patch.requirement_id {
            next.requirement_id = requirement_id;
        }
        if let Some(supplier) = patch.supplier {
            next.supplier = supplier.trim().to_string();
        }
        if let Some(quantity) = patch.quantity {
            next.quantity = quantity;
        }
        if let Some(unit_cost) = patch.unit_cost {
            next.unit_cost = unit_cost;
        }
        if let Some(order_date) = patch.order_date {
            next.order_date = order_date;
        }
        if let Some(expected) = patch.expected_delivery {
            next.expected_delivery = expected;
        }
        if let Some(received) = patch.received_date {
            next.received_date = received;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(notes) = patch.notes {
            next.notes = notes;
        }
        next.recompute_total();
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }
}
