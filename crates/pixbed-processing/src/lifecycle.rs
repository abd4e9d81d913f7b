//! Asset lifecycle: deletion and visibility
//!
//! Deletion is physical and immediate. The metadata record goes first - once
//! it is gone, the asset no longer exists as far as clients are concerned -
//! and the backing file removal is best-effort: a failure is logged, never
//! rolled back, and never fails the operation.

use std::sync::Arc;

use pixbed_core::models::{Asset, Principal};
use pixbed_core::{AppError, AssetId};
use pixbed_db::{AssetStore, AuditEvent, AuditSink};
use pixbed_storage::Storage;

pub struct AssetLifecycle {
    store: Arc<dyn AssetStore>,
    storage: Arc<dyn Storage>,
    audit: Arc<dyn AuditSink>,
}

impl AssetLifecycle {
    pub fn new(
        store: Arc<dyn AssetStore>,
        storage: Arc<dyn Storage>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            storage,
            audit,
        }
    }

    /// Delete an asset. Only the owning principal or an admin may delete;
    /// everyone else gets `Forbidden` without learning more than "it exists".
    #[tracing::instrument(skip(self), fields(asset_id = %id, principal_id = %principal.id))]
    pub async fn remove(&self, id: &AssetId, principal: Principal) -> Result<(), AppError> {
        let asset = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        if !principal.can_modify(&asset) {
            return Err(AppError::Forbidden(
                "No permission to delete this image".to_string(),
            ));
        }

        // Record first: its absence is the authoritative signal that the
        // asset is gone. A concurrent delete landing in between surfaces as
        // not-found here.
        let deleted = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        if let Err(err) = self.storage.delete(&deleted.storage_key).await {
            tracing::warn!(
                asset_id = %id,
                storage_key = %deleted.storage_key,
                error = %err,
                "Failed to remove backing file; record already deleted"
            );
        }

        tracing::info!(asset_id = %id, "Asset deleted");
        self.emit_audit("delete", &deleted, principal);

        Ok(())
    }

    /// Flip the visibility flag. Same authorization as deletion; bumps
    /// `updated_at`, invalidating cached entity tags.
    #[tracing::instrument(skip(self), fields(asset_id = %id, principal_id = %principal.id))]
    pub async fn set_visibility(
        &self,
        id: &AssetId,
        principal: Principal,
        is_public: bool,
    ) -> Result<Asset, AppError> {
        let asset = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        if !principal.can_modify(&asset) {
            return Err(AppError::Forbidden(
                "No permission to edit this image".to_string(),
            ));
        }

        let updated = self
            .store
            .set_visibility(id, is_public)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        self.emit_audit("update_visibility", &updated, principal);

        Ok(updated)
    }

    fn emit_audit(&self, action: &str, asset: &Asset, principal: Principal) {
        let audit = self.audit.clone();
        let event = AuditEvent::new(action, asset.id.as_str(), principal.id).with_detail(
            serde_json::json!({
                "storage_key": asset.storage_key,
                "is_public": asset.is_public,
            }),
        );
        tokio::spawn(async move {
            if let Err(err) = audit.append(event).await {
                tracing::warn!(error = %err, "Failed to append audit event");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use pixbed_core::models::{Role, UploadProfile};
    use pixbed_db::{MemoryAssetStore, RecordingAuditSink};
    use pixbed_storage::LocalStorage;
    use std::io::Cursor;
    use tempfile::TempDir;
    use uuid::Uuid;

    use crate::ingest::{IngestPipeline, Upload};

    struct Fixture {
        _dir: TempDir,
        store: Arc<MemoryAssetStore>,
        storage: Arc<LocalStorage>,
        ingest: IngestPipeline,
        lifecycle: AssetLifecycle,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryAssetStore::new());
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let audit = Arc::new(RecordingAuditSink::new());
        let ingest = IngestPipeline::new(store.clone(), storage.clone(), audit.clone());
        let lifecycle = AssetLifecycle::new(store.clone(), storage.clone(), audit);
        Fixture {
            _dir: dir,
            store,
            storage,
            ingest,
            lifecycle,
        }
    }

    fn user() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role: Role::User,
        }
    }

    fn admin() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role: Role::Admin,
        }
    }

    fn profile() -> UploadProfile {
        UploadProfile::new("authenticated", vec!["image/png".to_string()], 1024 * 1024)
    }

    fn upload() -> Upload {
        let img = RgbaImage::from_pixel(8, 8, Rgba([7, 7, 7, 255]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        Upload {
            data: buffer,
            declared_mime: "image/png".to_string(),
            declared_name: Some("pic.png".to_string()),
        }
    }

    #[tokio::test]
    async fn test_owner_delete_removes_record_and_file() {
        let fx = fixture().await;
        let owner = user();
        let asset = fx.ingest.ingest(upload(), owner, &profile()).await.unwrap();

        fx.lifecycle.remove(&asset.id, owner).await.unwrap();

        assert!(fx.store.get(&asset.id).await.unwrap().is_none());
        assert!(!fx.storage.exists(&asset.storage_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_stranger_delete_is_forbidden() {
        let fx = fixture().await;
        let asset = fx.ingest.ingest(upload(), user(), &profile()).await.unwrap();

        let err = fx.lifecycle.remove(&asset.id, user()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(fx.store.get(&asset.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_admin_can_delete_any_asset() {
        let fx = fixture().await;
        let asset = fx.ingest.ingest(upload(), user(), &profile()).await.unwrap();

        fx.lifecycle.remove(&asset.id, admin()).await.unwrap();
        assert!(fx.store.get(&asset.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_guest_cannot_delete_guest_uploads() {
        let fx = fixture().await;
        let asset = fx
            .ingest
            .ingest(upload(), Principal::guest(), &profile())
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .remove(&asset.id, Principal::guest())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let fx = fixture().await;
        let err = fx
            .lifecycle
            .remove(&AssetId::generate(), admin())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_survives_missing_file() {
        let fx = fixture().await;
        let owner = user();
        let asset = fx.ingest.ingest(upload(), owner, &profile()).await.unwrap();

        // File vanished out from under us (prior inconsistency); the record
        // deletion still wins.
        fx.storage.delete(&asset.storage_key).await.unwrap();
        fx.lifecycle.remove(&asset.id, owner).await.unwrap();
        assert!(fx.store.get(&asset.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_visibility_bumps_validator() {
        let fx = fixture().await;
        let owner = user();
        let asset = fx.ingest.ingest(upload(), owner, &profile()).await.unwrap();

        let updated = fx
            .lifecycle
            .set_visibility(&asset.id, owner, false)
            .await
            .unwrap();
        assert!(!updated.is_public);
        assert!(updated.updated_at >= asset.updated_at);

        let err = fx
            .lifecycle
            .set_visibility(&asset.id, user(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
