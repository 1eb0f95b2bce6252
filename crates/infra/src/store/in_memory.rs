use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use sitebook_core::id::Uuid;
use sitebook_core::{Record, TenantId};

use super::{RecordStore, StoreError, StoreResult};

/// In-memory tenant-isolated store for tests/dev.
#[derive(Debug)]
pub struct InMemoryRecordStore<V> {
    inner: RwLock<BTreeMap<(TenantId, Uuid), V>>,
}

impl<V> InMemoryRecordStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<V> Default for InMemoryRecordStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl<V: Record> RecordStore<V> for InMemoryRecordStore<V> {
    async fn get(&self, tenant_id: TenantId, id: Uuid) -> StoreResult<Option<V>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&(tenant_id, id)).cloned())
    }

    async fn list(&self, tenant_id: TenantId) -> StoreResult<Vec<V>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .range((tenant_id, Uuid::nil())..=(tenant_id, Uuid::max()))
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn insert(&self, tenant_id: TenantId, record: V) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let id = record.record_id();
        if map.contains_key(&(tenant_id, id)) {
            return Err(StoreError::Duplicate(id));
        }
        map.insert((tenant_id, id), record);
        Ok(())
    }

    async fn update(&self, tenant_id: TenantId, record: V) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&(tenant_id, record.record_id())) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn update_if(
        &self,
        tenant_id: TenantId,
        record: V,
        expected: &(dyn for<'a> Fn(&'a V) -> bool + Send + Sync),
    ) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let Some(slot) = map.get_mut(&(tenant_id, record.record_id())) else {
            return Err(StoreError::NotFound);
        };
        if !expected(slot) {
            return Ok(false);
        }
        *slot = record;
        Ok(true)
    }

    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&(tenant_id, id)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use sitebook_core::Creatable;
    use sitebook_materials::{Material, NewMaterial};

    fn material(name: &str) -> Material {
        let draft: NewMaterial =
            serde_json::from_value(json!({ "name": name, "unit": "bags" })).unwrap();
        Material::from_draft(Uuid::now_v7(), draft, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn records_are_tenant_isolated() {
        let store = InMemoryRecordStore::<Material>::new();
        let t1 = TenantId::new();
        let t2 = TenantId::new();
        let cement = material("Cement");
        let id = *cement.id.as_uuid();

        store.insert(t1, cement.clone()).await.unwrap();

        assert_eq!(store.get(t1, id).await.unwrap(), Some(cement));
        assert_eq!(store.get(t2, id).await.unwrap(), None);
        assert!(store.list(t2).await.unwrap().is_empty());
        assert!(!store.delete(t2, id).await.unwrap());
        assert!(store.delete(t1, id).await.unwrap());
        assert_eq!(store.get(t1, id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_in_id_order() {
        let store = InMemoryRecordStore::<Material>::new();
        let tenant = TenantId::new();
        let mut expected = Vec::new();
        for name in ["Sand", "Cement", "Rebar"] {
            let m = material(name);
            expected.push(*m.id.as_uuid());
            store.insert(tenant, m).await.unwrap();
        }
        store.insert(TenantId::new(), material("Gravel")).await.unwrap();

        expected.sort();
        let listed: Vec<Uuid> = store
            .list(tenant)
            .await
            .unwrap()
            .iter()
            .map(|m| *m.id.as_uuid())
            .collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn duplicate_insert_and_missing_update_fail() {
        let store = InMemoryRecordStore::<Material>::new();
        let tenant = TenantId::new();
        let m = material("Cement");

        store.insert(tenant, m.clone()).await.unwrap();
        assert!(matches!(store.insert(tenant, m.clone()).await, Err(StoreError::Duplicate(_))));
        assert!(matches!(store.update(TenantId::new(), m).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn conditional_update_leaves_stale_writes_out() {
        let store = InMemoryRecordStore::<Material>::new();
        let tenant = TenantId::new();
        let m = material("Cement");
        store.insert(tenant, m.clone()).await.unwrap();

        let mut renamed = m.clone();
        renamed.name = "Portland cement".into();
        let still_cement = |current: &Material| current.name == "Cement";
        assert!(store.update_if(tenant, renamed.clone(), &still_cement).await.unwrap());

        let mut again = m.clone();
        again.name = "White cement".into();
        assert!(!store.update_if(tenant, again, &still_cement).await.unwrap());
        assert_eq!(store.get(tenant, *m.id.as_uuid()).await.unwrap(), Some(renamed));

        assert!(matches!(
            store.update_if(TenantId::new(), m, &still_cement).await,
            Err(StoreError::NotFound)
        ));
    }
}
