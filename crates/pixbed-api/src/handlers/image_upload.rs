//! Upload handlers
//!
//! Authenticated uploads run under the permissive profile; the guest route
//! is feature-gated by configuration and runs under the stricter guest
//! profile, owned by the deterministic guest principal.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::auth::RequirePrincipal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use pixbed_core::models::{AssetResponse, Principal};
use pixbed_core::AppError;
use pixbed_processing::Upload;

/// Extract the upload from multipart form data. Exactly one field named
/// "file" is accepted; the payload is buffered in full so the size ceiling
/// applies to measured bytes, not declared headers.
async fn extract_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if upload.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let declared_name = field.file_name().map(|s: &str| s.to_string());
            let declared_mime = field
                .content_type()
                .map(|s: &str| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

            upload = Some(Upload {
                data: data.to_vec(),
                declared_mime,
                declared_name,
            });
        }
    }

    upload.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
}

#[utoipa::path(
    post,
    path = "/images",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded successfully", body = AssetResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(principal_id = %principal.0.id, operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    principal: RequirePrincipal,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = extract_upload(multipart).await?;

    let asset = state
        .ingest
        .ingest(upload, principal.0, &state.profiles.authenticated)
        .await?;

    Ok((StatusCode::CREATED, Json(AssetResponse::from(asset))))
}

#[utoipa::path(
    post,
    path = "/images/guest",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded successfully", body = AssetResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Guest uploads disabled", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_guest_image"))]
pub async fn upload_guest_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.config.guest_uploads_enabled {
        return Err(AppError::Forbidden("Guest uploads are disabled".to_string()).into());
    }

    let upload = extract_upload(multipart).await?;

    let asset = state
        .ingest
        .ingest(upload, Principal::guest(), &state.profiles.guest)
        .await?;

    Ok((StatusCode::CREATED, Json(AssetResponse::from(asset))))
}
