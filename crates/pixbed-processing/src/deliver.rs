//! Delivery pipeline: lookup -> verify -> count -> transform -> respond
//!
//! Delivery is read-only with respect to an asset's immutable fields; only
//! usage counters are mutated, and those fire-and-forget. A transform
//! failure of any kind degrades to serving the original bytes - the client
//! never sees a broken image because of a resize bug.

use bytes::Bytes;
use std::sync::Arc;

use pixbed_core::constants::MAX_TRANSFORM_DIMENSION;
use pixbed_core::models::{CounterKind, DeliveryMode};
use pixbed_core::{AppError, AssetId};
use pixbed_db::AssetStore;
use pixbed_storage::{Storage, StorageError};

use crate::image::resize::ResizeTarget;
use crate::image::transformer::ImageTransformer;
use crate::map_storage_err;

/// Optional transform request attached to a delivery. Bounds are validated
/// before any bytes are read so pathological boxes cannot burn CPU.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
}

impl TransformParams {
    pub fn wants_resize(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value {
                if v == 0 || v > MAX_TRANSFORM_DIMENSION {
                    return Err(AppError::InvalidInput(format!(
                        "{} must be between 1 and {}",
                        name, MAX_TRANSFORM_DIMENSION
                    )));
                }
            }
        }
        if let Some(q) = self.quality {
            if q == 0 || q > 100 {
                return Err(AppError::InvalidInput(
                    "quality must be between 1 and 100".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Resolved delivery: the bytes to stream plus everything the HTTP layer
/// needs to build headers.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub bytes: Bytes,
    pub content_type: String,
    pub etag: String,
    pub original_name: String,
}

/// The lookup-verify-transform-respond sequence that serves an asset.
pub struct DeliveryPipeline {
    store: Arc<dyn AssetStore>,
    storage: Arc<dyn Storage>,
    default_quality: u8,
}

impl DeliveryPipeline {
    pub fn new(store: Arc<dyn AssetStore>, storage: Arc<dyn Storage>, default_quality: u8) -> Self {
        Self {
            store,
            storage,
            default_quality,
        }
    }

    /// Deliver an asset, bumping the counter selected by `mode` and applying
    /// the requested transform if any.
    #[tracing::instrument(skip(self), fields(asset_id = %id))]
    pub async fn deliver(
        &self,
        id: &AssetId,
        params: TransformParams,
        mode: DeliveryMode,
    ) -> Result<Delivery, AppError> {
        params.validate()?;

        let asset = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        if !self
            .storage
            .exists(&asset.storage_key)
            .await
            .map_err(map_storage_err)?
        {
            // Orphan record: report not-found to the client, flag internally
            // for the reconciliation sweep.
            tracing::warn!(
                asset_id = %id,
                storage_key = %asset.storage_key,
                "Metadata record has no backing file"
            );
            return Err(AppError::NotFound("Image not found".to_string()));
        }

        self.bump_counter(asset.id.clone(), mode.counter_kind());

        let original = self.read_original(&asset.storage_key).await?;

        let bytes = if params.wants_resize() {
            let target = ResizeTarget {
                width: params.width,
                height: params.height,
            };
            let quality = params.quality.unwrap_or(self.default_quality);
            let content_type = asset.content_type.clone();
            let asset_id = asset.id.clone();

            let join = tokio::task::spawn_blocking(move || {
                let result = ImageTransformer::transform(&original, &content_type, target, quality);
                (original, result)
            })
            .await;

            match join {
                Ok((_, Ok(transformed))) => transformed,
                Ok((original, Err(err))) => {
                    tracing::warn!(
                        asset_id = %asset_id,
                        error = %err,
                        "Transform failed; serving original bytes"
                    );
                    Bytes::from(original)
                }
                Err(join_err) => {
                    tracing::warn!(
                        asset_id = %asset_id,
                        error = %join_err,
                        "Transform task failed; serving original bytes"
                    );
                    Bytes::from(self.read_original(&asset.storage_key).await?)
                }
            }
        } else {
            Bytes::from(original)
        };

        let etag = asset.etag();
        Ok(Delivery {
            bytes,
            content_type: asset.content_type,
            etag,
            original_name: asset.original_name,
        })
    }

    /// Serve the original bytes verbatim, without a counter increment and
    /// without any transform.
    #[tracing::instrument(skip(self), fields(asset_id = %id))]
    pub async fn raw(&self, id: &AssetId) -> Result<Delivery, AppError> {
        let asset = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        let bytes = Bytes::from(self.read_original(&asset.storage_key).await?);

        let etag = asset.etag();
        Ok(Delivery {
            bytes,
            content_type: asset.content_type,
            etag,
            original_name: asset.original_name,
        })
    }

    async fn read_original(&self, storage_key: &str) -> Result<Vec<u8>, AppError> {
        self.storage.get(storage_key).await.map_err(|err| {
            // A delete racing this delivery may remove the file between the
            // existence check and the read; that surfaces as not-found, never
            // as a half-deleted payload.
            match err {
                StorageError::NotFound(_) => AppError::NotFound("Image not found".to_string()),
                other => map_storage_err(other),
            }
        })
    }

    /// One-way counter emission after the delivery decision. Must never
    /// block or fail the response; errors are logged and dropped.
    fn bump_counter(&self, id: AssetId, kind: CounterKind) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.increment_counter(&id, kind).await {
                tracing::warn!(asset_id = %id, error = %err, "Failed to record usage counter");
            }
        });
    }
}
