use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use libris_auth::IdentityResolver;
use libris_core::{DomainError, UnauthorizedReason};

use crate::app::errors;
use crate::context::IdentityContext;

#[derive(Clone)]
pub struct AuthState {
    pub resolver: IdentityResolver,
}

/// Resolve the bearer token into an identity, or reject with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .map_err(errors::domain_error_to_response)?
        .to_owned();

    let identity = state
        .resolver
        .resolve(&token)
        .await
        .map_err(errors::domain_error_to_response)?;

    req.extensions_mut().insert(IdentityContext::new(identity));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, DomainError> {
    let missing = || DomainError::unauthorized(UnauthorizedReason::MissingToken);

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let header = header.strip_prefix("Bearer ").ok_or_else(missing)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    fn headers(value: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static(value));
        h
    }

    #[test]
    fn bearer_token_is_extracted_and_trimmed() {
        assert_eq!(extract_bearer(&headers("Bearer  abc.def ")).unwrap(), "abc.def");
    }

    #[test]
    fn missing_or_malformed_header_is_missing_token() {
        let expected = DomainError::unauthorized(UnauthorizedReason::MissingToken);
        assert_eq!(extract_bearer(&HeaderMap::new()).unwrap_err(), expected);
        assert_eq!(extract_bearer(&headers("Basic abc")).unwrap_err(), expected);
        assert_eq!(extract_bearer(&headers("Bearer   ")).unwrap_err(), expected);
    }
}
