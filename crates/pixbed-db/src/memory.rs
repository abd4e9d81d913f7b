//! In-memory implementations of the store and audit traits
//!
//! Used by pipeline and API tests, and handy for local experiments. The
//! memory store honors the same contract as the PostgreSQL store, including
//! atomic counter increments (the increment happens under the store's own
//! lock, never as a caller-side read-modify-write).

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use tokio::sync::RwLock;

use pixbed_core::models::{Asset, CounterKind, NewAsset, StoreStats};
use pixbed_core::{AppError, AssetId};

use crate::audit::{AuditEvent, AuditSink};
use crate::store::AssetStore;

/// HashMap-backed asset store.
#[derive(Default)]
pub struct MemoryAssetStore {
    assets: RwLock<HashMap<String, Asset>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn insert(&self, asset: NewAsset) -> Result<Asset, AppError> {
        let mut assets = self.assets.write().await;
        if assets.contains_key(asset.id.as_str()) {
            return Err(AppError::Internal(format!(
                "Duplicate asset id: {}",
                asset.id
            )));
        }
        let committed = Asset {
            id: asset.id.clone(),
            owner_id: asset.owner_id,
            storage_key: asset.storage_key,
            original_name: asset.original_name,
            content_type: asset.content_type,
            file_size: asset.file_size,
            width: asset.width,
            height: asset.height,
            is_public: asset.is_public,
            view_count: 0,
            download_count: 0,
            created_at: asset.created_at,
            updated_at: asset.created_at,
        };
        assets.insert(asset.id.as_str().to_string(), committed.clone());
        Ok(committed)
    }

    async fn get(&self, id: &AssetId) -> Result<Option<Asset>, AppError> {
        Ok(self.assets.read().await.get(id.as_str()).cloned())
    }

    async fn list_public(&self, limit: i64, offset: i64) -> Result<(Vec<Asset>, i64), AppError> {
        let assets = self.assets.read().await;
        let mut public: Vec<Asset> = assets.values().filter(|a| a.is_public).cloned().collect();
        public.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = public.len() as i64;
        let page = public
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn set_visibility(
        &self,
        id: &AssetId,
        is_public: bool,
    ) -> Result<Option<Asset>, AppError> {
        let mut assets = self.assets.write().await;
        Ok(assets.get_mut(id.as_str()).map(|asset| {
            asset.is_public = is_public;
            asset.updated_at = Utc::now();
            asset.clone()
        }))
    }

    async fn increment_counter(&self, id: &AssetId, kind: CounterKind) -> Result<(), AppError> {
        let mut assets = self.assets.write().await;
        let asset = assets
            .get_mut(id.as_str())
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))?;
        match kind {
            CounterKind::View => asset.view_count += 1,
            CounterKind::Download => asset.download_count += 1,
        }
        Ok(())
    }

    async fn delete(&self, id: &AssetId) -> Result<Option<Asset>, AppError> {
        Ok(self.assets.write().await.remove(id.as_str()))
    }

    async fn stats(&self) -> Result<StoreStats, AppError> {
        let assets = self.assets.read().await;
        Ok(StoreStats {
            asset_count: assets.len() as i64,
            total_bytes: assets.values().map(|a| a.file_size).sum(),
        })
    }
}

/// Audit sink that records events for inspection in tests.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: StdMutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit lock poisoned").clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn append(&self, event: AuditEvent) -> Result<(), AppError> {
        self.events.lock().expect("audit lock poisoned").push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    fn new_asset(id: AssetId) -> NewAsset {
        NewAsset {
            id,
            owner_id: Uuid::new_v4(),
            storage_key: "2026/08/test.png".to_string(),
            original_name: "test.png".to_string(),
            content_type: "image/png".to_string(),
            file_size: 128,
            width: Some(10),
            height: Some(10),
            is_public: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryAssetStore::new();
        let id = AssetId::generate();
        let asset = store.insert(new_asset(id.clone())).await.unwrap();
        assert_eq!(asset.view_count, 0);
        assert_eq!(asset.created_at, asset.updated_at);

        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
    }

    #[tokio::test]
    async fn test_insert_duplicate_rejected() {
        let store = MemoryAssetStore::new();
        let id = AssetId::generate();
        store.insert(new_asset(id.clone())).await.unwrap();
        assert!(store.insert(new_asset(id)).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_returns_record() {
        let store = MemoryAssetStore::new();
        let id = AssetId::generate();
        store.insert(new_asset(id.clone())).await.unwrap();

        let deleted = store.delete(&id).await.unwrap();
        assert!(deleted.is_some());
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.delete(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_visibility_bumps_updated_at() {
        let store = MemoryAssetStore::new();
        let id = AssetId::generate();
        let before = store.insert(new_asset(id.clone())).await.unwrap();

        let after = store.set_visibility(&id, false).await.unwrap().unwrap();
        assert!(!after.is_public);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_increment_missing_is_not_found() {
        let store = MemoryAssetStore::new();
        let result = store
            .increment_counter(&AssetId::generate(), CounterKind::View)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_increments_lose_nothing() {
        const CALLERS: usize = 1000;

        let store = Arc::new(MemoryAssetStore::new());
        let id = AssetId::generate();
        store.insert(new_asset(id.clone())).await.unwrap();

        let mut handles = Vec::with_capacity(CALLERS);
        for i in 0..CALLERS {
            let store = store.clone();
            let id = id.clone();
            let kind = if i % 2 == 0 {
                CounterKind::View
            } else {
                CounterKind::Download
            };
            handles.push(tokio::spawn(async move {
                store.increment_counter(&id, kind).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let asset = store.get(&id).await.unwrap().unwrap();
        assert_eq!(asset.view_count, (CALLERS / 2) as i64);
        assert_eq!(asset.download_count, (CALLERS / 2) as i64);
        // Counter traffic must not move the cache validator.
        assert_eq!(asset.updated_at, asset.created_at);
    }

    #[tokio::test]
    async fn test_list_public_paginates_newest_first() {
        let store = MemoryAssetStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let id = AssetId::generate();
            let mut asset = new_asset(id.clone());
            asset.created_at = Utc::now() + chrono::Duration::seconds(i);
            asset.is_public = i != 2;
            store.insert(asset).await.unwrap();
            ids.push(id);
        }

        let (page, total) = store.list_public(2, 0).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[4]);
        assert_eq!(page[1].id, ids[3]);

        let (rest, _) = store.list_public(10, 2).await.unwrap();
        assert_eq!(rest.len(), 2);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = MemoryAssetStore::new();
        for _ in 0..3 {
            store.insert(new_asset(AssetId::generate())).await.unwrap();
        }
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.asset_count, 3);
        assert_eq!(stats.total_bytes, 3 * 128);
    }

    #[tokio::test]
    async fn test_recording_audit_sink() {
        let sink = RecordingAuditSink::new();
        sink.append(AuditEvent::new("upload", "abc", Uuid::new_v4()))
            .await
            .unwrap();
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "upload");
    }
}
