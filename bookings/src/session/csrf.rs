//! CSRF (Cross-Site Request Forgery) protection.
//!
//! # How it works
//!
//! 1. A token is generated on first use and stored in the session
//! 2. The renderer places it in every template's data as `csrf_token`
//! 3. Forms echo it back in a hidden `csrf_token` field (or the `X-CSRF-Token` header)
//! 4. [`CsrfLayer`] rejects POST/PUT/DELETE/PATCH requests whose token does not match
//!
//! ```html
//! <form method="post" action="/make-reservation">
//!     <input type="hidden" name="csrf_token" value="{{ csrf_token }}">
//!     ...
//! </form>
//! ```

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    response::{IntoResponse, Response},
};
use rand::Rng;
use tower_sessions::Session;

use super::config::CsrfConfig;
use super::store::SessionExt;
use crate::error::Result;

const CSRF_SESSION_KEY: &str = "_csrf_token";

/// A session-bound anti-forgery token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Create a new CSRF token with the given value.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Get the raw token string.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning the raw string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Generate a new random CSRF token.
    #[must_use]
    pub fn generate(length: usize) -> Self {
        let token: String = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Get or create a CSRF token from the session.
    ///
    /// If a token exists in the session, it is returned.
    /// Otherwise, a new token is generated and stored.
    pub async fn get_or_create(session: &Session, length: usize) -> Result<Self> {
        if let Some(token) = session.get_as::<String>(CSRF_SESSION_KEY).await? {
            return Ok(Self(token));
        }

        let token = Self::generate(length);
        session.put(CSRF_SESSION_KEY, &token.0).await?;

        Ok(token)
    }
}

impl std::fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CSRF protection middleware layer.
///
/// Validates tokens on non-safe HTTP methods. The token can be provided via:
/// - Header: `X-CSRF-Token` (configurable)
/// - Form field: `csrf_token` (configurable), for `application/x-www-form-urlencoded` bodies
///
/// Must run inside the session layer so the `Session` extension is present.
#[derive(Debug, Clone)]
pub struct CsrfLayer {
    config: CsrfConfig,
}

impl CsrfLayer {
    /// Create a new CSRF layer with the given configuration.
    #[must_use]
    pub fn new(config: CsrfConfig) -> Self {
        Self { config }
    }
}

impl<S> tower::Layer<S> for CsrfLayer {
    type Service = CsrfMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfMiddleware {
            inner,
            config: self.config.clone(),
        }
    }
}

/// CSRF middleware service.
#[derive(Debug, Clone)]
pub struct CsrfMiddleware<S> {
    inner: S,
    config: CsrfConfig,
}

impl<S> tower::Service<Request<Body>> for CsrfMiddleware<S>
where
    S: tower::Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if !config.enabled {
                return inner.call(request).await;
            }

            let is_safe = config
                .safe_methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(request.method().as_str()));

            if is_safe {
                return inner.call(request).await;
            }

            let Some(session) = request.extensions().get::<Session>().cloned() else {
                tracing::warn!("CSRF validation failed: no session found");
                return Ok(csrf_error_response("CSRF validation failed: no session"));
            };

            let expected_token = match session.get_as::<String>(CSRF_SESSION_KEY).await {
                Ok(token) => token,
                Err(e) => {
                    tracing::error!("CSRF validation failed: session unavailable: {}", e);
                    return Ok(e.into_response());
                }
            };

            let Some(expected_token) = expected_token else {
                tracing::warn!("CSRF validation failed: no token in session");
                return Ok(csrf_error_response(
                    "CSRF validation failed: no token in session",
                ));
            };

            let header_token = request
                .headers()
                .get(&config.header_name)
                .and_then(|v| v.to_str().ok())
                .map(String::from);

            let (request, provided_token) = match header_token {
                Some(token) => (request, Some(token)),
                None if is_form_body(&request) => {
                    match form_token(request, &config.form_field_name).await {
                        Ok(found) => found,
                        Err(response) => return Ok(response),
                    }
                }
                None => (request, None),
            };

            let Some(provided_token) = provided_token else {
                tracing::warn!("CSRF validation failed: no token provided");
                return Ok(csrf_error_response(
                    "CSRF validation failed: no token provided",
                ));
            };

            if !constant_time_compare(&expected_token, &provided_token) {
                tracing::warn!("CSRF validation failed: token mismatch");
                return Ok(csrf_error_response("CSRF validation failed: invalid token"));
            }

            inner.call(request).await
        })
    }
}

fn is_form_body(request: &Request<Body>) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// Buffer the body, pull the token field out of it, and hand back an equivalent request.
async fn form_token(
    request: Request<Body>,
    field: &str,
) -> std::result::Result<(Request<Body>, Option<String>), Response> {
    let (parts, body) = request.into_parts();

    // The server-wide body limit layer bounds this read.
    let bytes = axum::body::to_bytes(body, usize::MAX).await.map_err(|e| {
        tracing::warn!("CSRF validation failed: unreadable body: {}", e);
        csrf_error_response("CSRF validation failed: unreadable body")
    })?;

    let token = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == field)
        .map(|(_, value)| value.into_owned());

    Ok((Request::from_parts(parts, Body::from(bytes)), token))
}

/// Create a CSRF error response.
fn csrf_error_response(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        [("Content-Type", "application/json")],
        format!(
            r#"{{"error": "csrf_validation_failed", "message": "{}"}}"#,
            message
        ),
    )
        .into_response()
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Router};
    use std::sync::Arc;
    use tower::ServiceExt;
    use tower_sessions_memory_store::MemoryStore;

    #[test]
    fn test_csrf_token_generation() {
        let token = CsrfToken::generate(32);
        assert_eq!(token.token().len(), 32);

        let token2 = CsrfToken::generate(32);
        assert_ne!(token.token(), token2.token());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
        assert!(!constant_time_compare("ab", "abc"));
    }

    #[tokio::test]
    async fn test_get_or_create_is_stable_per_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let first = CsrfToken::get_or_create(&session, 16).await.unwrap();
        let second = CsrfToken::get_or_create(&session, 16).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.token().len(), 16);
    }

    /// Router with the CSRF layer and a session pre-seeded with `token`.
    fn guarded_app(session: Session) -> Router {
        Router::new()
            .route("/submit", post(|| async { "accepted" }))
            .layer(CsrfLayer::new(CsrfConfig::default()))
            .layer(axum::Extension(session))
    }

    async fn seeded_session(token: &str) -> Session {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session.put(CSRF_SESSION_KEY, &token).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_form_field_token_accepted() {
        let app = guarded_app(seeded_session("tok123").await);
        let request = Request::post("/submit")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("first_name=Ann&csrf_token=tok123"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_header_token_accepted() {
        let app = guarded_app(seeded_session("tok123").await);
        let request = Request::post("/submit")
            .header("X-CSRF-Token", "tok123")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mismatched_token_rejected() {
        let app = guarded_app(seeded_session("tok123").await);
        let request = Request::post("/submit")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("csrf_token=forged"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unreadable_session_token_is_server_error() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session.put(CSRF_SESSION_KEY, &42).await.unwrap();
        let app = guarded_app(session);

        let request = Request::post("/submit")
            .header("X-CSRF-Token", "42")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let app = guarded_app(seeded_session("tok123").await);
        let request = Request::post("/submit").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
