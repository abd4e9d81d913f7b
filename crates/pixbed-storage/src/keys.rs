//! Storage key resolution
//!
//! A storage key is the relative path of an asset's backing file under the
//! upload root: `YYYY/MM/<identifier>.<ext>`. Sharding by calendar month
//! bounds directory fan-out. The key is a pure function of the identifier,
//! the upload instant, and the validated MIME type - the client-supplied
//! file name never participates, so double extensions and traversal payloads
//! cannot reach the filesystem.

use chrono::{DateTime, Datelike, Utc};

use crate::traits::{StorageError, StorageResult};
use pixbed_core::AssetId;

/// File extension for a validated MIME type. Unknown types have no storage
/// representation and are rejected during validation, before a key is ever
/// resolved.
pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

/// Resolved location of an asset's backing file, relative to the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    /// Resolve the storage key for `(id, content_type, at)`. Two calls with
    /// the same identifier in the same calendar month always yield the same
    /// key.
    pub fn resolve(
        id: &AssetId,
        content_type: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<StorageKey> {
        let ext = extension_for_mime(content_type).ok_or_else(|| {
            StorageError::UnsupportedContentType(content_type.to_string())
        })?;
        Ok(StorageKey(format!(
            "{:04}/{:02}/{}.{}",
            at.year(),
            at.month(),
            id,
            ext
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_mime("image/jpg"), Some("jpg"));
        assert_eq!(extension_for_mime("image/png"), Some("png"));
        assert_eq!(extension_for_mime("image/svg+xml"), Some("svg"));
        assert_eq!(extension_for_mime("application/pdf"), None);
    }

    #[test]
    fn test_resolve_is_deterministic_within_month() {
        let id = AssetId::generate();
        let a = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 8, 31, 23, 59, 59).unwrap();

        let key_a = StorageKey::resolve(&id, "image/png", a).unwrap();
        let key_b = StorageKey::resolve(&id, "image/png", b).unwrap();
        assert_eq!(key_a, key_b);
        assert_eq!(key_a.as_str(), format!("2026/08/{}.png", id));
    }

    #[test]
    fn test_resolve_shards_by_month() {
        let id = AssetId::generate();
        let aug = Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap();
        let sep = Utc.with_ymd_and_hms(2026, 9, 15, 12, 0, 0).unwrap();

        let key_aug = StorageKey::resolve(&id, "image/jpeg", aug).unwrap();
        let key_sep = StorageKey::resolve(&id, "image/jpeg", sep).unwrap();
        assert_ne!(key_aug, key_sep);
        assert!(key_aug.as_str().starts_with("2026/08/"));
        assert!(key_sep.as_str().starts_with("2026/09/"));
    }

    #[test]
    fn test_resolve_rejects_unknown_mime() {
        let id = AssetId::generate();
        let now = Utc::now();
        let result = StorageKey::resolve(&id, "text/html", now);
        assert!(matches!(
            result,
            Err(StorageError::UnsupportedContentType(_))
        ));
    }

    #[test]
    fn test_key_never_contains_traversal() {
        // The identifier alphabet is closed over [0-9A-Za-z_-], so resolved
        // keys cannot contain path separators or dot segments beyond the
        // single extension dot.
        let id = AssetId::generate();
        let key = StorageKey::resolve(&id, "image/webp", Utc::now()).unwrap();
        assert!(!key.as_str().contains(".."));
        assert_eq!(key.as_str().matches('.').count(), 1);
        assert_eq!(key.as_str().matches('/').count(), 2);
    }
}
