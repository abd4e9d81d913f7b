use serde::{Deserialize, Serialize};

/// Validation limits applied to one upload route. Profiles are resolved once
/// at startup from configuration and passed by value into the ingestion
/// pipeline; nothing reads them from ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadProfile {
    /// Short label for logs and audit events ("authenticated", "guest").
    pub label: String,
    /// Normalized (lowercase, parameter-free) MIME types accepted by this route.
    pub allowed_content_types: Vec<String>,
    /// Ceiling on the buffered payload size in bytes.
    pub max_bytes: usize,
}

impl UploadProfile {
    pub fn new(
        label: impl Into<String>,
        allowed_content_types: Vec<String>,
        max_bytes: usize,
    ) -> Self {
        UploadProfile {
            label: label.into(),
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_ascii_lowercase())
                .collect(),
            max_bytes,
        }
    }

    pub fn allows(&self, normalized_content_type: &str) -> bool {
        self.allowed_content_types
            .iter()
            .any(|ct| ct == normalized_content_type)
    }
}
