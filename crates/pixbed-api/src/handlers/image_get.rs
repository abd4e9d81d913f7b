//! Delivery handlers
//!
//! `GET /images/{id}` serves bytes (optionally resized/re-encoded) and bumps
//! the view or download counter; `/raw` serves the stored bytes verbatim
//! without counting; `/info` returns the metadata record; the collection
//! route lists public assets.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use pixbed_core::models::{AssetResponse, DeliveryMode};
use pixbed_core::{AppError, AssetId};
use pixbed_processing::{Delivery, TransformParams};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DeliveryQuery {
    /// Target width in pixels
    pub w: Option<u32>,
    /// Target height in pixels
    pub h: Option<u32>,
    /// Re-encode quality (1-100)
    pub q: Option<u8>,
    /// Set to "1" to force a download response
    pub download: Option<String>,
}

const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=31536000, immutable";

fn view_response(delivery: Delivery) -> Result<Response, HttpAppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, delivery.content_type)
        .header(header::CONTENT_LENGTH, delivery.bytes.len())
        .header(header::ETAG, delivery.etag)
        .header(header::CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE)
        .body(Body::from(delivery.bytes))
        .map_err(|e| AppError::Internal(e.to_string()).into())
}

fn download_response(delivery: Delivery) -> Result<Response, HttpAppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, delivery.content_type)
        .header(header::CONTENT_LENGTH, delivery.bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", delivery.original_name),
        )
        .body(Body::from(delivery.bytes))
        .map_err(|e| AppError::Internal(e.to_string()).into())
}

fn not_modified_response(etag: String) -> Result<Response, HttpAppError> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::ETAG, etag)
        .header(header::CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE)
        .body(Body::empty())
        .map_err(|e| AppError::Internal(e.to_string()).into())
}

#[utoipa::path(
    get,
    path = "/images/{id}",
    tag = "images",
    params(
        ("id" = String, Path, description = "Asset identifier"),
        DeliveryQuery
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 304, description = "Not modified"),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers), fields(asset_id = %id, operation = "get_image"))]
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DeliveryQuery>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let id = AssetId::parse(&id)?;

    let mode = if query.download.as_deref() == Some("1") {
        DeliveryMode::Download
    } else {
        DeliveryMode::View
    };

    let params = TransformParams {
        width: query.w,
        height: query.h,
        quality: query.q,
    };

    let delivery = state.deliver.deliver(&id, params, mode).await?;

    match mode {
        DeliveryMode::Download => download_response(delivery),
        DeliveryMode::View => {
            let if_none_match = headers
                .get(header::IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok());
            if if_none_match == Some(delivery.etag.as_str()) {
                return not_modified_response(delivery.etag);
            }
            view_response(delivery)
        }
    }
}

#[utoipa::path(
    get,
    path = "/images/{id}/raw",
    tag = "images",
    params(
        ("id" = String, Path, description = "Asset identifier")
    ),
    responses(
        (status = 200, description = "Original image bytes", content_type = "image/*"),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(asset_id = %id, operation = "get_image_raw"))]
pub async fn get_image_raw(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let id = AssetId::parse(&id)?;
    let delivery = state.deliver.raw(&id).await?;
    view_response(delivery)
}

#[utoipa::path(
    get,
    path = "/images/{id}/info",
    tag = "images",
    params(
        ("id" = String, Path, description = "Asset identifier")
    ),
    responses(
        (status = 200, description = "Asset metadata", body = AssetResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(asset_id = %id, operation = "get_image_info"))]
pub async fn get_image_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = AssetId::parse(&id)?;

    let asset = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    Ok(Json(AssetResponse::from(asset)))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageListResponse {
    pub images: Vec<AssetResponse>,
    pub pagination: Pagination,
}

#[utoipa::path(
    get,
    path = "/images",
    tag = "images",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Public images, newest first", body = ImageListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_images"))]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = pagination.limit.clamp(1, 100);
    let page = pagination.page.max(1);
    let offset = (page - 1) * limit;

    let (assets, total) = state.store.list_public(limit, offset).await?;

    Ok(Json(ImageListResponse {
        images: assets.into_iter().map(AssetResponse::from).collect(),
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        },
    }))
}
