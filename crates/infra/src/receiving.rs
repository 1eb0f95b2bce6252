//! Receiving a procurement order into stock.
//!
//! Two writes: the order moves to `Received`, then one `in` transaction is
//! appended to the material ledger. They are not grouped; if the append fails
//! the order stays received and the failure is reported.
//!
//! The status write is conditional on the stored order still being
//! receivable, so of two concurrent receives only one appends stock.

use chrono::{DateTime, Utc};
use thiserror::Error;

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainError, TenantId};
use sitebook_materials::MaterialTransaction;
use sitebook_procurement::ProcurementOrder;

use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct ReceivedOrder {
    pub order: ProcurementOrder,
    pub transaction: MaterialTransaction,
}

pub async fn receive_order(
    orders: &dyn RecordStore<ProcurementOrder>,
    transactions: &dyn RecordStore<MaterialTransaction>,
    tenant_id: TenantId,
    order_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ReceivedOrder, ReceiveError> {
    let mut order = orders
        .get(tenant_id, order_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let draft = order.receive(now)?;
    let transaction = MaterialTransaction::from_draft(Uuid::now_v7(), draft, now)?;

    let receivable = |current: &ProcurementOrder| current.status.can_receive();
    if !orders.update_if(tenant_id, order.clone(), &receivable).await? {
        return Err(DomainError::conflict("order has already been received").into());
    }
    if let Err(e) = transactions.insert(tenant_id, transaction.clone()).await {
        tracing::warn!(
            order_id = %order_id,
            tenant_id = %tenant_id,
            "order marked received but its stock transaction was not recorded: {e}"
        );
        return Err(e.into());
    }

    tracing::info!(
        order_id = %order_id,
        transaction_id = %transaction.id,
        quantity = transaction.quantity,
        "procurement order received"
    );
    Ok(ReceivedOrder { order, transaction })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::store::{InMemoryRecordStore, StoreResult};
    use sitebook_materials::{MaterialId, TransactionKind};
    use sitebook_procurement::OrderStatus;

    async fn stored_order(store: &InMemoryRecordStore<ProcurementOrder>, tenant: TenantId) -> Uuid {
        let draft = serde_json::from_value(json!({
            "material_id": MaterialId::new(),
            "supplier": "Acme",
            "quantity": 100,
            "unit_cost": 5,
            "status": "Shipped",
        }))
        .unwrap();
        let order = ProcurementOrder::from_draft(Uuid::now_v7(), draft, Utc::now()).unwrap();
        let id = *order.id.as_uuid();
        store.insert(tenant, order).await.unwrap();
        id
    }

    #[tokio::test]
    async fn receiving_updates_the_order_and_appends_stock() {
        let orders = InMemoryRecordStore::new();
        let transactions = InMemoryRecordStore::new();
        let tenant = TenantId::new();
        let id = stored_order(&orders, tenant).await;

        let received = receive_order(&orders, &transactions, tenant, id, Utc::now())
            .await
            .unwrap();

        assert_eq!(received.order.status, OrderStatus::Received);
        let stored = orders.get(tenant, id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Received);

        let ledger = transactions.list(tenant).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, TransactionKind::In);
        assert_eq!(ledger[0].total_cost, 500.0);
        assert_eq!(ledger[0].reference_order, Some(id));
    }

    #[tokio::test]
    async fn second_receive_conflicts_without_new_stock() {
        let orders = InMemoryRecordStore::new();
        let transactions = InMemoryRecordStore::new();
        let tenant = TenantId::new();
        let id = stored_order(&orders, tenant).await;

        receive_order(&orders, &transactions, tenant, id, Utc::now()).await.unwrap();
        let err = receive_order(&orders, &transactions, tenant, id, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ReceiveError::Domain(DomainError::Conflict(_))));
        assert_eq!(transactions.list(tenant).await.unwrap().len(), 1);
    }

    /// Holds every read long enough for concurrent callers to interleave.
    struct SlowReads(InMemoryRecordStore<ProcurementOrder>);

    #[async_trait]
    impl RecordStore<ProcurementOrder> for SlowReads {
        async fn get(&self, tenant_id: TenantId, id: Uuid) -> StoreResult<Option<ProcurementOrder>> {
            let found = self.0.get(tenant_id, id).await;
            tokio::time::sleep(Duration::from_millis(50)).await;
            found
        }
        async fn list(&self, tenant_id: TenantId) -> StoreResult<Vec<ProcurementOrder>> {
            self.0.list(tenant_id).await
        }
        async fn insert(&self, tenant_id: TenantId, record: ProcurementOrder) -> StoreResult<()> {
            self.0.insert(tenant_id, record).await
        }
        async fn update(&self, tenant_id: TenantId, record: ProcurementOrder) -> StoreResult<()> {
            self.0.update(tenant_id, record).await
        }
        async fn update_if(
            &self,
            tenant_id: TenantId,
            record: ProcurementOrder,
            expected: &(dyn for<'a> Fn(&'a ProcurementOrder) -> bool + Send + Sync),
        ) -> StoreResult<bool> {
            self.0.update_if(tenant_id, record, expected).await
        }
        async fn delete(&self, tenant_id: TenantId, id: Uuid) -> StoreResult<bool> {
            self.0.delete(tenant_id, id).await
        }
    }

    #[tokio::test]
    async fn concurrent_receives_append_stock_once() {
        let inner = InMemoryRecordStore::new();
        let tenant = TenantId::new();
        let id = stored_order(&inner, tenant).await;
        let orders = SlowReads(inner);
        let transactions = InMemoryRecordStore::new();

        let (a, b) = tokio::join!(
            receive_order(&orders, &transactions, tenant, id, Utc::now()),
            receive_order(&orders, &transactions, tenant, id, Utc::now()),
        );

        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|r| matches!(
            r,
            Err(ReceiveError::Domain(DomainError::Conflict(_)))
        )));
        assert_eq!(transactions.list(tenant).await.unwrap().len(), 1);
        let stored = orders.get(tenant, id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Received);
    }

    #[tokio::test]
    async fn other_tenants_orders_are_not_found() {
        let orders = InMemoryRecordStore::new();
        let transactions = InMemoryRecordStore::<MaterialTransaction>::new();
        let id = stored_order(&orders, TenantId::new()).await;

        let err = receive_order(&orders, &transactions, TenantId::new(), id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ReceiveError::Domain(DomainError::NotFound)));
    }
}
