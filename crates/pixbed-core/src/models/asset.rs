use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::id::AssetId;

/// How an asset is being delivered; selects the usage counter to bump and the
/// response headers to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Inline view: long-lived cache headers, view counter.
    View,
    /// Forced download: content-disposition attachment, download counter.
    Download,
}

impl DeliveryMode {
    pub fn counter_kind(self) -> CounterKind {
        match self {
            DeliveryMode::View => CounterKind::View,
            DeliveryMode::Download => CounterKind::Download,
        }
    }
}

/// Which usage counter an increment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    View,
    Download,
}

/// A stored image and its metadata record. This is the central entity: one
/// asset owns exactly one physical file at `storage_key` under the upload
/// root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub owner_id: Uuid,
    pub storage_key: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub is_public: bool,
    pub view_count: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Entity tag derived from `(id, updated_at)`. Counter increments never
    /// move `updated_at`, so the tag stays stable while the content and its
    /// visible metadata are unchanged.
    pub fn etag(&self) -> String {
        format!("\"{}-{}\"", self.id, self.updated_at.timestamp_millis())
    }
}

/// Fields needed to commit a new asset record. Counters start at zero and
/// `updated_at` starts equal to `created_at`.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub id: AssetId,
    pub owner_id: Uuid,
    pub storage_key: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Database row for the assets table.
#[derive(Debug)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct AssetRow {
    pub id: String,
    pub owner_id: Uuid,
    pub storage_key: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub is_public: bool,
    pub view_count: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetRow {
    pub fn into_asset(self) -> Asset {
        Asset {
            id: AssetId::from_storage(self.id),
            owner_id: self.owner_id,
            storage_key: self.storage_key,
            original_name: self.original_name,
            content_type: self.content_type,
            file_size: self.file_size,
            width: self.width,
            height: self.height,
            is_public: self.is_public,
            view_count: self.view_count,
            download_count: self.download_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Public fields of an asset as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    pub id: String,
    pub url: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub is_public: bool,
    pub view_count: i64,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        AssetResponse {
            url: format!("/images/{}", asset.id),
            id: asset.id.as_str().to_string(),
            original_name: asset.original_name,
            content_type: asset.content_type,
            file_size: asset.file_size,
            width: asset.width,
            height: asset.height,
            is_public: asset.is_public,
            view_count: asset.view_count,
            download_count: asset.download_count,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

/// Aggregate statistics over the metadata store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct StoreStats {
    pub asset_count: i64,
    pub total_bytes: i64,
}
