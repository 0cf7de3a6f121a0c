//! Caller identity
//!
//! Authentication itself happens upstream; the services only receive the
//! caller's user id in the `X-User-ID` header and scope every query to it.

use crate::errors::{AppError, Result};
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Header carrying the authenticated caller's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the request id set by the request-id layer
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extracted identity available to handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Caller's user id
    pub user_id: Uuid,

    /// Request ID for tracing
    pub request_id: String,
}

/// Parse the caller id out of a raw header value
pub fn parse_user_id(value: Option<&str>) -> Result<Uuid> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing X-User-ID header".to_string(),
        })?;

    Uuid::parse_str(raw).map_err(|_| AppError::Unauthorized {
        message: "Invalid X-User-ID header".to_string(),
    })
}

/// Axum extractor for AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let user_id = parse_user_id(
            parts
                .headers
                .get(USER_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        )?;

        tracing::Span::current().record("user_id", tracing::field::display(user_id));

        Ok(AuthContext {
            user_id,
            request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_parse_user_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(Some(&id.to_string())).unwrap(), id);
        assert!(matches!(parse_user_id(None), Err(AppError::Unauthorized { .. })));
        assert!(matches!(parse_user_id(Some("  ")), Err(AppError::Unauthorized { .. })));
        assert!(matches!(parse_user_id(Some("alice")), Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_extractor_reads_headers() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(USER_ID_HEADER, id.to_string())
            .header(REQUEST_ID_HEADER, "req-1")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let ctx = AuthContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.user_id, id);
        assert_eq!(ctx.request_id, "req-1");
    }

    #[tokio::test]
    async fn test_extractor_rejects_missing_identity() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let result = AuthContext::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }
}
