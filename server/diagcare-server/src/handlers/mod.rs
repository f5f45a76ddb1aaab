pub mod auth;
pub mod health;
pub mod security_config;
pub mod users;

use crate::error::ApiError;
use auth_access::ClientInfo;
use axum::http::{header, HeaderMap};
use uuid::Uuid;

/// Pull the session id from `Authorization: Bearer <uuid>`.
pub(crate) fn session_id_from_headers(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthenticated("missing session credential"))?;

    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::unauthenticated("malformed session credential"))
}

/// Transport metadata recorded with login attempts.
pub(crate) fn client_info(headers: &HeaderMap) -> ClientInfo {
    let source_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string());
    let client_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    ClientInfo {
        source_address,
        client_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_session_id_is_extracted() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {id}")).unwrap(),
        );

        assert_eq!(session_id_from_headers(&headers).unwrap(), id);
    }

    #[test]
    fn missing_or_malformed_credentials_are_rejected() {
        let headers = HeaderMap::new();
        assert!(session_id_from_headers(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(session_id_from_headers(&headers).is_err());
    }

    #[test]
    fn first_forwarded_address_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        let info = client_info(&headers);
        assert_eq!(info.source_address.as_deref(), Some("203.0.113.7"));
        assert!(info.client_agent.is_none());
    }
}
