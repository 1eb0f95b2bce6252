//! Procurement domain module (purchase orders for materials).
//!
//! Deterministic domain logic only: order validation, the status workflow and
//! the transaction an order produces when it is received.

pub mod order;

pub use order::{
    NewProcurementOrder, OrderActions, OrderStatus, ProcurementOrder, ProcurementOrderId,
    ProcurementOrderPatch,
};
