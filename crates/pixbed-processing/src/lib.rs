//! Image processing and the ingestion/delivery pipelines
//!
//! This crate holds the core of the service: probing and transforming image
//! bytes, and the validate-store-commit (ingestion), lookup-verify-transform
//! (delivery), and authorize-delete (lifecycle) flows on top of the storage
//! and metadata-store abstractions.

pub mod deliver;
pub mod image;
pub mod ingest;
pub mod lifecycle;

pub use crate::image::probe::probe_dimensions;
pub use crate::image::resize::{fit_within, ResizeTarget};
pub use crate::image::transformer::ImageTransformer;
pub use deliver::{Delivery, DeliveryPipeline, TransformParams};
pub use ingest::{IngestPipeline, Upload};
pub use lifecycle::AssetLifecycle;

use pixbed_core::AppError;
use pixbed_storage::StorageError;

/// Map storage-layer errors into the unified error taxonomy.
pub(crate) fn map_storage_err(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        StorageError::UnsupportedContentType(msg) => {
            AppError::InvalidType(format!("Unsupported content type: {}", msg))
        }
        other => AppError::Storage(other.to_string()),
    }
}
