//! Ingestion pipeline: validate -> identify -> probe -> store -> commit
//!
//! An asset record exists if and only if ingestion fully completed. The
//! metadata insert is the commit point; a failed write leaves no partial
//! file behind (the storage backend cleans up), and a failed commit removes
//! the just-written file best-effort before the error propagates.

use chrono::Utc;
use std::sync::Arc;

use pixbed_core::models::{Asset, NewAsset, Principal, UploadProfile};
use pixbed_core::{validation, AppError, AssetId};
use pixbed_db::{AssetStore, AuditEvent, AuditSink};
use pixbed_storage::{Storage, StorageKey};

use crate::image::probe::probe_dimensions;
use crate::map_storage_err;

/// A buffered upload as received from the HTTP layer. The declared values
/// come from the client and are validated here; the size ceiling is enforced
/// on the buffered bytes, never on client-declared headers.
#[derive(Debug, Clone)]
pub struct Upload {
    pub data: Vec<u8>,
    pub declared_mime: String,
    pub declared_name: Option<String>,
}

/// The validate-store-commit sequence that creates an Asset from an upload.
pub struct IngestPipeline {
    store: Arc<dyn AssetStore>,
    storage: Arc<dyn Storage>,
    audit: Arc<dyn AuditSink>,
}

impl IngestPipeline {
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

    /// Ingest one upload under the given validation profile, on behalf of
    /// `principal`. Returns the committed asset's public fields.
    #[tracing::instrument(
        skip(self, upload),
        fields(
            principal_id = %principal.id,
            profile = %profile.label,
            declared_mime = %upload.declared_mime,
            size_bytes = upload.data.len(),
        )
    )]
    pub async fn ingest(
        &self,
        upload: Upload,
        principal: Principal,
        profile: &UploadProfile,
    ) -> Result<Asset, AppError> {
        let content_type = validation::validate_content_type(profile, &upload.declared_mime)?;
        validation::validate_size(profile, upload.data.len())?;

        let id = self.fresh_id().await?;
        let created_at = Utc::now();
        let key = StorageKey::resolve(&id, &content_type, created_at).map_err(map_storage_err)?;

        // Probing is non-fatal: vector formats and undecodable rasters ingest
        // with absent dimensions.
        let dimensions = {
            let data = upload.data.clone();
            tokio::task::spawn_blocking(move || probe_dimensions(&data))
                .await
                .ok()
                .flatten()
        };
        if dimensions.is_none() {
            tracing::debug!(asset_id = %id, "Could not probe image dimensions");
        }

        let file_size = upload.data.len() as i64;
        self.storage
            .put(&key, upload.data)
            .await
            .map_err(map_storage_err)?;

        let original_name =
            validation::sanitize_filename(upload.declared_name.as_deref().unwrap_or("unknown"));

        let new_asset = NewAsset {
            id: id.clone(),
            owner_id: principal.id,
            storage_key: key.as_str().to_string(),
            original_name,
            content_type: content_type.clone(),
            file_size,
            width: dimensions.map(|(w, _)| w as i32),
            height: dimensions.map(|(_, h)| h as i32),
            is_public: true,
            created_at,
        };

        let asset = match self.store.insert(new_asset).await {
            Ok(asset) => asset,
            Err(err) => {
                // The record never existed, so the file must not either.
                if let Err(cleanup_err) = self.storage.delete(key.as_str()).await {
                    tracing::warn!(
                        asset_id = %id,
                        storage_key = %key,
                        error = %cleanup_err,
                        "Failed to remove orphaned file after metadata commit failure"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            asset_id = %asset.id,
            storage_key = %asset.storage_key,
            content_type = %asset.content_type,
            file_size = asset.file_size,
            "Asset ingested"
        );

        self.emit_audit(&asset, principal, profile);

        Ok(asset)
    }

    /// Generate an identifier and confirm it is unused before it becomes a
    /// storage key. Entropy makes a retry astronomically unlikely; the loop
    /// is a guard, not a code path we expect to take.
    async fn fresh_id(&self) -> Result<AssetId, AppError> {
        for _ in 0..3 {
            let id = AssetId::generate();
            if self.store.get(&id).await?.is_none() {
                return Ok(id);
            }
            tracing::warn!(asset_id = %id, "Identifier collision, regenerating");
        }
        Err(AppError::Internal(
            "Could not generate an unused asset identifier".to_string(),
        ))
    }

    /// One-way audit emission after the outcome is decided; never blocks or
    /// fails the ingestion.
    fn emit_audit(&self, asset: &Asset, principal: Principal, profile: &UploadProfile) {
        let audit = self.audit.clone();
        let event = AuditEvent::new("upload", asset.id.as_str(), principal.id).with_detail(
            serde_json::json!({
                "profile": profile.label,
                "content_type": asset.content_type,
                "file_size": asset.file_size,
                "original_name": asset.original_name,
            }),
        );
        tokio::spawn(async move {
            if let Err(err) = audit.append(event).await {
                tracing::warn!(error = %err, "Failed to append audit event");
            }
        });
    }
}
