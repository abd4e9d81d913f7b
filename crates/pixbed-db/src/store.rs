//! Asset store trait
//!
//! Abstracts the metadata database so pipelines and tests are not coupled to
//! PostgreSQL.

use async_trait::async_trait;

use pixbed_core::models::{Asset, CounterKind, NewAsset, StoreStats};
use pixbed_core::{AppError, AssetId};

/// Durable record store for assets, keyed by identifier.
///
/// An asset record exists if and only if ingestion fully completed; the
/// insert is the commit point of the ingestion pipeline. Counter increments
/// are atomic at the storage layer - implementations must never read, add
/// and write back.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Commit a new asset record. Fails if the identifier already exists.
    async fn insert(&self, asset: NewAsset) -> Result<Asset, AppError>;

    /// Fetch an asset by identifier.
    async fn get(&self, id: &AssetId) -> Result<Option<Asset>, AppError>;

    /// List public assets, newest first, with the total public count.
    async fn list_public(&self, limit: i64, offset: i64) -> Result<(Vec<Asset>, i64), AppError>;

    /// Update the visibility flag, bumping `updated_at` (the cache
    /// validator). Returns the updated asset, or None if the id is unknown.
    async fn set_visibility(&self, id: &AssetId, is_public: bool)
        -> Result<Option<Asset>, AppError>;

    /// Atomically increment one usage counter. Lost updates are not
    /// acceptable at any concurrency level; `updated_at` is left untouched.
    async fn increment_counter(&self, id: &AssetId, kind: CounterKind) -> Result<(), AppError>;

    /// Delete the record, returning it so the caller can remove the backing
    /// file. Returns None if the id is unknown.
    async fn delete(&self, id: &AssetId) -> Result<Option<Asset>, AppError>;

    /// Count/aggregate statistics over all assets.
    async fn stats(&self) -> Result<StoreStats, AppError>;
}
