//! PostgreSQL asset store

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row};

use pixbed_core::models::{Asset, AssetRow, CounterKind, NewAsset, StoreStats};
use pixbed_core::{AppError, AssetId};

use crate::store::AssetStore;

/// Asset repository backed by PostgreSQL.
#[derive(Clone)]
pub struct PgAssetStore {
    pool: PgPool,
}

impl PgAssetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for PgAssetStore {
    #[tracing::instrument(skip(self, asset), fields(db.table = "assets", db.operation = "insert", asset_id = %asset.id))]
    async fn insert(&self, asset: NewAsset) -> Result<Asset, AppError> {
        let row: AssetRow = sqlx::query_as::<Postgres, AssetRow>(
            r#"
            INSERT INTO assets (
                id, owner_id, storage_key, original_name, content_type,
                file_size, width, height, is_public,
                view_count, download_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 0, $10, $10)
            RETURNING *
            "#,
        )
        .bind(asset.id.as_str())
        .bind(asset.owner_id)
        .bind(&asset.storage_key)
        .bind(&asset.original_name)
        .bind(&asset.content_type)
        .bind(asset.file_size)
        .bind(asset.width)
        .bind(asset.height)
        .bind(asset.is_public)
        .bind(asset.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_asset())
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select", asset_id = %id))]
    async fn get(&self, id: &AssetId) -> Result<Option<Asset>, AppError> {
        let row: Option<AssetRow> =
            sqlx::query_as::<Postgres, AssetRow>("SELECT * FROM assets WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(AssetRow::into_asset))
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    async fn list_public(&self, limit: i64, offset: i64) -> Result<(Vec<Asset>, i64), AppError> {
        let rows: Vec<AssetRow> = sqlx::query_as::<Postgres, AssetRow>(
            "SELECT * FROM assets WHERE is_public = TRUE ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query("SELECT COUNT(*) AS count FROM assets WHERE is_public = TRUE")
            .fetch_one(&self.pool)
            .await?
            .get("count");

        Ok((rows.into_iter().map(AssetRow::into_asset).collect(), total))
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "update", asset_id = %id))]
    async fn set_visibility(
        &self,
        id: &AssetId,
        is_public: bool,
    ) -> Result<Option<Asset>, AppError> {
        let row: Option<AssetRow> = sqlx::query_as::<Postgres, AssetRow>(
            "UPDATE assets SET is_public = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id.as_str())
        .bind(is_public)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AssetRow::into_asset))
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "update", asset_id = %id))]
    async fn increment_counter(&self, id: &AssetId, kind: CounterKind) -> Result<(), AppError> {
        // Single-statement increment: atomic at the database, no lost updates
        // under concurrency. updated_at is deliberately untouched so the
        // entity tag stays stable across views.
        let query = match kind {
            CounterKind::View => "UPDATE assets SET view_count = view_count + 1 WHERE id = $1",
            CounterKind::Download => {
                "UPDATE assets SET download_count = download_count + 1 WHERE id = $1"
            }
        };

        let result = sqlx::query(query)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset not found: {}", id)));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "delete", asset_id = %id))]
    async fn delete(&self, id: &AssetId) -> Result<Option<Asset>, AppError> {
        let row: Option<AssetRow> =
            sqlx::query_as::<Postgres, AssetRow>("DELETE FROM assets WHERE id = $1 RETURNING *")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(AssetRow::into_asset))
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    async fn stats(&self) -> Result<StoreStats, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS asset_count, COALESCE(SUM(file_size), 0)::BIGINT AS total_bytes FROM assets",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            asset_count: row.get("asset_count"),
            total_bytes: row.get("total_bytes"),
        })
    }
}
