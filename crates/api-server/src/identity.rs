//! Caller identity resolution
//!
//! The identity layer in front of this service authenticates the request
//! and forwards the provider's opaque subject reference in a header. The
//! core never sees ambient auth state; routes resolve the identity here
//! and thread it into every operation explicitly.

use axum::http::HeaderMap;

/// Header carrying the external identity reference.
pub const IDENTITY_HEADER: &str = "x-auth-subject";

/// Extract the caller's external identity reference.
///
/// Missing and malformed identities are indistinguishable: both return
/// `None`, and routes answer with one generic unauthorized response.
pub fn resolve_identity(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(IDENTITY_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_resolves_trimmed_subject() {
        let mut headers = HeaderMap::new();
        headers.insert(IDENTITY_HEADER, HeaderValue::from_static("  user_abc "));
        assert_eq!(resolve_identity(&headers).as_deref(), Some("user_abc"));
    }

    #[test]
    fn test_missing_and_malformed_are_equivalent() {
        assert!(resolve_identity(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(IDENTITY_HEADER, HeaderValue::from_static(""));
        assert!(resolve_identity(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(IDENTITY_HEADER, HeaderValue::from_bytes(b"\xff\xfe").unwrap());
        assert!(resolve_identity(&headers).is_none());
    }
}
