//! CORS headers for the storefront form.
//!
//! The form is served from the Shopify storefront domain and posts
//! cross-origin, so every response (including errors and 405s) carries the
//! CORS headers. Preflight requests never reach a handler.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::config::CorsConfig;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With, X-Request-Id";

/// Add CORS headers to all responses and answer preflight requests.
///
/// Headers applied:
/// - `Access-Control-Allow-Origin: *`
/// - `Access-Control-Allow-Methods: POST, OPTIONS`
/// - `Access-Control-Allow-Headers: Content-Type, Authorization, X-Requested-With, X-Request-Id`
/// - `Access-Control-Max-Age` when configured
/// - `Access-Control-Allow-Credentials: true` when configured
///
/// `OPTIONS` on any path returns `204 No Content` with an empty body.
pub async fn cors_middleware(
    State(cors): State<CorsConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        let mut preflight = Response::new(Body::empty());
        *preflight.status_mut() = StatusCode::NO_CONTENT;
        preflight
    } else {
        next.run(request).await
    };

    apply_cors_headers(response.headers_mut(), cors);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, cors: CorsConfig) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );

    if let Some(max_age) = cors.max_age_secs {
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
    }

    if cors.allow_credentials {
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use tower::ServiceExt;

    use super::*;

    fn app(cors: CorsConfig) -> Router {
        Router::new()
            .route("/api/create-order", post(|| async { "created" }))
            .layer(middleware::from_fn_with_state(cors, cors_middleware))
    }

    fn request(method: Method, uri: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_preflight_short_circuits() {
        let response = app(CorsConfig::default())
            .oneshot(request(Method::OPTIONS, "/api/create-order"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "86400");
        assert!(headers.get(ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_preflight_on_unknown_path() {
        let response = app(CorsConfig::default())
            .oneshot(request(Method::OPTIONS, "/anything"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_headers_on_handler_response() {
        let cors = CorsConfig {
            max_age_secs: None,
            allow_credentials: true,
        };
        let response = app(cors)
            .oneshot(request(Method::POST, "/api/create-order"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization, X-Requested-With, X-Request-Id"
        );
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert!(headers.get(ACCESS_CONTROL_MAX_AGE).is_none());
    }

    #[tokio::test]
    async fn test_headers_on_method_not_allowed() {
        let response = app(CorsConfig::default())
            .oneshot(request(Method::GET, "/api/create-order"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
