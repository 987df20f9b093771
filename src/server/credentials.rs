use crate::catalog::AccessToken;

use axum::{extract::OptionalFromRequestParts, http::request::Parts};
use std::convert::Infallible;
use tracing::debug;

pub const HEADER_CATALOG_TOKEN_KEY: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// Catalog access token forwarded by the caller in `Authorization: Bearer <token>`.
///
/// The token is only held for the duration of the request.
#[derive(Debug)]
pub struct CatalogCredentials(pub AccessToken);

fn extract_bearer_token(parts: &Parts) -> Option<AccessToken> {
    let raw = parts.headers.get(HEADER_CATALOG_TOKEN_KEY)?.to_str().ok()?;
    let value = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw);
    match AccessToken::new(value) {
        Ok(token) => {
            debug!("Got catalog token {}...", token.prefix());
            Some(token)
        }
        Err(_) => {
            debug!("Authorization header carries no usable token");
            None
        }
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for CatalogCredentials {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _ctx: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(extract_bearer_token(parts).map(CatalogCredentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/v1/discover");
        if let Some(value) = value {
            builder = builder.header(HEADER_CATALOG_TOKEN_KEY, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn extracts_bearer_token() {
        let parts = parts_with_auth(Some("Bearer abc123"));
        let token = extract_bearer_token(&parts).unwrap();
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn accepts_raw_token_without_scheme() {
        let parts = parts_with_auth(Some("abc123"));
        assert_eq!(extract_bearer_token(&parts).unwrap().as_str(), "abc123");
    }

    #[test]
    fn missing_or_blank_header_yields_nothing() {
        assert!(extract_bearer_token(&parts_with_auth(None)).is_none());
        assert!(extract_bearer_token(&parts_with_auth(Some("Bearer   "))).is_none());
    }

    #[tokio::test]
    async fn optional_extractor_yields_none_without_token() {
        let mut parts = parts_with_auth(None);
        let result =
            <CatalogCredentials as OptionalFromRequestParts<()>>::from_request_parts(&mut parts, &())
                .await;
        assert!(matches!(result, Ok(None)));

        let mut parts = parts_with_auth(Some("Bearer abc123"));
        let result =
            <CatalogCredentials as OptionalFromRequestParts<()>>::from_request_parts(&mut parts, &())
                .await;
        assert_eq!(result.unwrap().unwrap().0.as_str(), "abc123");
    }
}
