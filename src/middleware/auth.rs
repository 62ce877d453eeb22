use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, cookies, TokenError};
use crate::database::models::User;
use crate::database::users;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user loaded from the database for this request.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }
}

/// Token authentication middleware: extracts the token (Authorization header
/// takes priority over the `token` cookie), verifies signature and expiry,
/// loads the user and injects it into request extensions. Every failure is a
/// uniform 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("No token, authorization denied"))?;

    let claims = auth::decode_token(&token, &state.config.security.jwt_secret).map_err(|e| {
        match e {
            TokenError::Expired => ApiError::unauthorized("Token has expired"),
            TokenError::Malformed => ApiError::unauthorized("Invalid token format"),
            TokenError::MissingSecret => {
                tracing::error!("JWT secret not configured");
                ApiError::unauthorized("Token is not valid")
            }
        }
    })?;

    let user = users::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Token is not valid - user not found"))?;

    request.extensions_mut().insert(AuthUser(user));

    Ok(next.run(request).await)
}

/// Bearer token from the Authorization header, falling back to the cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            if !token.trim().is_empty() {
                return Some(token.trim().to_string());
            }
        }
    }

    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(cookies::token_from_cookie_header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn bearer_token_is_extracted() {
        let map = headers(&[("authorization", "Bearer abc123")]);
        assert_eq!(extract_token(&map), Some("abc123".to_string()));
    }

    #[test]
    fn header_takes_priority_over_cookie() {
        let map = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "token=from-cookie"),
        ]);
        assert_eq!(extract_token(&map), Some("from-header".to_string()));
    }

    #[test]
    fn cookie_is_used_when_header_is_absent() {
        let map = headers(&[("cookie", "theme=dark; token=from-cookie")]);
        assert_eq!(extract_token(&map), Some("from-cookie".to_string()));
    }

    #[test]
    fn non_bearer_header_falls_through_to_cookie() {
        let map = headers(&[("authorization", "Basic dXNlcg=="), ("cookie", "token=t")]);
        assert_eq!(extract_token(&map), Some("t".to_string()));
    }

    #[test]
    fn empty_bearer_token_is_rejected() {
        let map = headers(&[("authorization", "Bearer ")]);
        assert_eq!(extract_token(&map), None);
    }
}
