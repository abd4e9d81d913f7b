//! Authentication collaborator boundary
//!
//! Authentication itself (accounts, sessions, token verification) lives in
//! front of this service. The upstream layer injects the authenticated
//! principal as trusted headers; this module only parses them:
//!
//! - `x-principal-id`: UUID of the principal
//! - `x-principal-role`: `user` or `admin`
//!
//! Handlers that require a principal extract [`RequirePrincipal`] and get a
//! 401 when the headers are absent or malformed.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap};

use crate::error::HttpAppError;
use pixbed_core::models::{Principal, Role};
use pixbed_core::AppError;

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

/// Parse the principal headers, if present and well-formed.
pub fn principal_from_headers(headers: &HeaderMap) -> Result<Option<Principal>, AppError> {
    let id_value = match headers.get(PRINCIPAL_ID_HEADER) {
        Some(value) => value,
        None => return Ok(None),
    };

    let id = id_value
        .to_str()
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::Unauthorized("Malformed principal id".to_string()))?;

    let role = match headers.get(PRINCIPAL_ROLE_HEADER) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(Role::parse)
            .ok_or_else(|| AppError::Unauthorized("Malformed principal role".to_string()))?,
        None => Role::User,
    };

    Ok(Some(Principal { id, role }))
}

/// Extractor for handlers that require an authenticated principal.
#[derive(Debug, Clone, Copy)]
pub struct RequirePrincipal(pub Principal);

impl<S> FromRequestParts<S> for RequirePrincipal
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = principal_from_headers(&parts.headers)?
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        Ok(RequirePrincipal(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn headers(id: Option<&str>, role: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(id) = id {
            map.insert(PRINCIPAL_ID_HEADER, HeaderValue::from_str(id).unwrap());
        }
        if let Some(role) = role {
            map.insert(PRINCIPAL_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        }
        map
    }

    #[test]
    fn test_absent_headers_is_unauthenticated() {
        let result = principal_from_headers(&headers(None, None)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_valid_principal() {
        let id = Uuid::new_v4();
        let principal = principal_from_headers(&headers(Some(&id.to_string()), Some("admin")))
            .unwrap()
            .unwrap();
        assert_eq!(principal.id, id);
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn test_role_defaults_to_user() {
        let id = Uuid::new_v4();
        let principal = principal_from_headers(&headers(Some(&id.to_string()), None))
            .unwrap()
            .unwrap();
        assert_eq!(principal.role, Role::User);
    }

    #[test]
    fn test_malformed_id_is_unauthorized() {
        let result = principal_from_headers(&headers(Some("not-a-uuid"), None));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_malformed_role_is_unauthorized() {
        let id = Uuid::new_v4();
        let result = principal_from_headers(&headers(Some(&id.to_string()), Some("root")));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
