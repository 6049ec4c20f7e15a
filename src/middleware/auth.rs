use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{Claims, TokenError};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            is_admin: claims.is_admin,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context.
///
/// A request without a usable bearer token stops here with 401 and the
/// token is never verified; an invalid or expired token stops with 401 too.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(request.headers()) else {
        tracing::warn!("Rejected {} {}: no token", request.method(), request.uri().path());
        return Err(TokenError::MissingToken.into());
    };

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::from(e)
    })?;

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header; anything else counts as absent
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderValue, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::database::Store;

    fn state() -> AppState {
        AppState::new(AppConfig::for_tests("middleware-secret"), Store::memory())
    }

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(|Extension(user): Extension<AuthUser>| async move { user.email }))
            .layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
            .with_state(state)
    }

    async fn call(state: AppState, auth: Option<String>) -> (StatusCode, String) {
        let mut request = Request::builder().uri("/whoami");
        if let Some(auth) = auth {
            request = request.header(AUTHORIZATION, auth);
        }
        let response = router(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_token_is_rejected_before_verification() {
        let (status, body) = call(state(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("unauthorized, no token"));
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let (status, body) = call(state(), Some("Bearer nonsense".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("unauthorized, invalid token"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let state = state();
        let issued_at = Utc::now() - Duration::hours(25);
        let token = state
            .tokens
            .issue_at(Uuid::new_v4(), "late@example.com", false, issued_at)
            .unwrap();
        let (status, body) = call(state, Some(format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("invalid token"));
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let state = state();
        let token = state.tokens.issue(Uuid::new_v4(), "amina@example.com", false).unwrap();
        let (status, body) = call(state, Some(format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "amina@example.com");
    }

    #[test]
    fn only_bearer_scheme_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def"));
    }
}
