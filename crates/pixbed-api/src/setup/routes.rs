//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::ApiDoc;
use crate::handlers::{image_get, image_manage, image_upload};
use crate::state::AppState;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Multipart framing adds overhead on top of the payload itself; leave
    // headroom so the size ceiling is enforced by validation, not by the
    // transport cutting the body short.
    let body_limit = state
        .config
        .max_file_size_bytes
        .max(state.config.guest_max_file_size_bytes)
        + 1024 * 1024;

    let rapidoc: Router<Arc<AppState>> = RapiDoc::new("/api/openapi.json").path("/docs").into();

    Router::new()
        .route("/api/openapi.json", get(openapi_json))
        .route(
            "/images",
            post(image_upload::upload_image).get(image_get::list_images),
        )
        .route("/images/guest", post(image_upload::upload_guest_image))
        .route(
            "/images/{id}",
            get(image_get::get_image)
                .patch(image_manage::update_visibility)
                .delete(image_manage::delete_image),
        )
        .route("/images/{id}/raw", get(image_get::get_image_raw))
        .route("/images/{id}/info", get(image_get::get_image_info))
        .route("/stats", get(image_manage::get_stats))
        .merge(rapidoc)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
