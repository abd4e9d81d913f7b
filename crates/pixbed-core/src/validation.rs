//! Upload validation helpers
//!
//! Validation runs against an [`UploadProfile`](crate::models::UploadProfile)
//! after the full payload has been buffered; declared sizes from client
//! headers are never trusted.

use crate::error::AppError;
use crate::models::UploadProfile;

/// Normalize a MIME type by stripping parameters and case
/// (e.g. "image/JPEG; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_ascii_lowercase()
}

/// Validate the declared content type against the profile allow-list.
/// Returns the normalized MIME type on success.
pub fn validate_content_type(
    profile: &UploadProfile,
    content_type: &str,
) -> Result<String, AppError> {
    let normalized = normalize_mime(content_type);
    if !profile.allows(&normalized) {
        return Err(AppError::InvalidType(format!(
            "Content type '{}' is not allowed. Allowed types: {}",
            normalized,
            profile.allowed_content_types.join(", ")
        )));
    }
    Ok(normalized)
}

/// Validate the measured payload size against the profile ceiling.
pub fn validate_size(profile: &UploadProfile, size: usize) -> Result<(), AppError> {
    if size == 0 {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }
    if size > profile.max_bytes {
        return Err(AppError::FileTooLarge(format!(
            "File size {} bytes exceeds the {} byte limit",
            size, profile.max_bytes
        )));
    }
    Ok(())
}

/// Sanitize a client-supplied file name for display and content-disposition
/// purposes. The name is never used to derive a storage path.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let path = std::path::Path::new(filename);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "file".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim_matches(&['_', '.'][..]).is_empty() {
        "file".to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_profile() -> UploadProfile {
        UploadProfile::new(
            "test",
            vec!["image/jpeg".to_string(), "image/png".to_string()],
            1024 * 1024,
        )
    }

    #[test]
    fn test_normalize_mime() {
        assert_eq!(normalize_mime("image/jpeg"), "image/jpeg");
        assert_eq!(normalize_mime("IMAGE/PNG"), "image/png");
        assert_eq!(normalize_mime("image/jpeg; charset=utf-8"), "image/jpeg");
        assert_eq!(normalize_mime(" image/webp "), "image/webp");
    }

    #[test]
    fn test_validate_content_type_ok() {
        let profile = test_profile();
        assert_eq!(
            validate_content_type(&profile, "IMAGE/JPEG; q=1").unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn test_validate_content_type_rejected() {
        let profile = test_profile();
        let err = validate_content_type(&profile, "image/gif").unwrap_err();
        assert!(matches!(err, AppError::InvalidType(_)));
    }

    #[test]
    fn test_validate_size() {
        let profile = test_profile();
        assert!(validate_size(&profile, 512).is_ok());
        assert!(matches!(
            validate_size(&profile, 0),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_size(&profile, 2 * 1024 * 1024),
            Err(AppError::FileTooLarge(_))
        ));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        // Directory components are stripped before sanitizing...
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        // ...and a base name still carrying dot segments is replaced wholesale.
        assert_eq!(sanitize_filename("..evil.jpg"), "file");
        assert_eq!(sanitize_filename("///"), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn test_sanitize_filename_strips_directories() {
        assert_eq!(sanitize_filename("/tmp/upload/cat.png"), "cat.png");
    }
}
