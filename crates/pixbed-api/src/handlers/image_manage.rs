//! Mutation handlers: delete, visibility, and statistics

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::RequirePrincipal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use pixbed_core::models::{AssetResponse, StoreStats};
use pixbed_core::{AppError, AssetId};

#[utoipa::path(
    delete,
    path = "/images/{id}",
    tag = "images",
    params(
        ("id" = String, Path, description = "Asset identifier")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(asset_id = %id, principal_id = %principal.0.id, operation = "delete_image"))]
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    principal: RequirePrincipal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = AssetId::parse(&id)?;

    state.lifecycle.remove(&id, principal.0).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVisibilityRequest {
    pub is_public: bool,
}

#[utoipa::path(
    patch,
    path = "/images/{id}",
    tag = "images",
    params(
        ("id" = String, Path, description = "Asset identifier")
    ),
    request_body = UpdateVisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = AssetResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(asset_id = %id, principal_id = %principal.0.id, operation = "update_visibility"))]
pub async fn update_visibility(
    State(state): State<Arc<AppState>>,
    principal: RequirePrincipal,
    Path(id): Path<String>,
    Json(body): Json<UpdateVisibilityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = AssetId::parse(&id)?;

    let asset = state
        .lifecycle
        .set_visibility(&id, principal.0, body.is_public)
        .await?;

    Ok(Json(AssetResponse::from(asset)))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Store statistics", body = StoreStats),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(principal_id = %principal.0.id, operation = "get_stats"))]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    principal: RequirePrincipal,
) -> Result<impl IntoResponse, HttpAppError> {
    if !principal.0.is_admin() {
        return Err(AppError::Forbidden("Statistics require admin privileges".to_string()).into());
    }

    // Cached with a short TTL; staleness is harmless here and the endpoint
    // behaves identically (just slower) with the cache disabled.
    if let Some(stats) = state.stats_cache.get(&"stats") {
        return Ok(Json(stats));
    }

    let stats = state.store.stats().await?;
    state.stats_cache.insert("stats", stats);

    Ok(Json(stats))
}
