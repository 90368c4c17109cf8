//! API 키 검사 middleware.
//!
//! `X-API-Key` 헤더를 설정된 키와 비교합니다. 키 검사가 활성화된
//! 배포에서만 레이어로 장착됩니다.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::error::ApiResponse;

/// API 키 헤더 이름.
pub const API_KEY_HEADER: &str = "x-api-key";

/// API 키 미들웨어 상태.
#[derive(Clone)]
pub struct ApiKeyState {
    expected: String,
}

impl ApiKeyState {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

/// API 키 검사 미들웨어 함수.
///
/// 키가 없거나 일치하지 않으면 401을 반환합니다.
pub async fn api_key_middleware(
    axum::extract::State(state): axum::extract::State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(key) if key == state.expected => next.run(request).await,
        _ => {
            warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
            let body = ApiResponse::<serde_json::Value>::fail("Invalid or missing API key");
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "OK"
    }

    fn app() -> Router {
        let state = ApiKeyState::new("secret-key");
        Router::new()
            .route("/search", get(test_handler))
            .layer(middleware::from_fn_with_state(state, api_key_middleware))
    }

    #[tokio::test]
    async fn test_valid_key_passes() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/search")
                    .header("x-api-key", "secret-key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_key_rejected() {
        let response = app()
            .oneshot(Request::builder().uri("/search").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/search")
                    .header("x-api-key", "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
