//! OpenAPI document

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use pixbed_core::models::{AssetResponse, StoreStats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pixbed",
        description = "Image hosting service: upload, deliver (with on-the-fly resize), and manage image assets."
    ),
    paths(
        handlers::image_upload::upload_image,
        handlers::image_upload::upload_guest_image,
        handlers::image_get::get_image,
        handlers::image_get::get_image_raw,
        handlers::image_get::get_image_info,
        handlers::image_get::list_images,
        handlers::image_manage::delete_image,
        handlers::image_manage::update_visibility,
        handlers::image_manage::get_stats,
    ),
    components(schemas(
        AssetResponse,
        ErrorResponse,
        StoreStats,
        handlers::image_get::ImageListResponse,
        handlers::image_get::Pagination,
        handlers::image_manage::UpdateVisibilityRequest,
    )),
    tags(
        (name = "images", description = "Image ingestion and delivery"),
        (name = "stats", description = "Aggregate statistics")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("/images/{id}"));
        assert!(json.contains("/stats"));
    }
}
