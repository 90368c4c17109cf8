//! 과거 OHLCV 데이터 endpoint.
//!
//! 검증된 파라미터로 업스트림 historical API를 호출하고,
//! payload를 가공 없이 그대로 반환합니다.
//!
//! # 엔드포인트
//!
//! - `GET /historical?code=29049&start_date=2024-01-01&end_date=2024-01-31` - 단일 종목 조회

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use idx_core::domain::request::HistoricalQuery;

use crate::error::{ApiResponse, ApiResult};
use crate::metrics::record_upstream_request;
use crate::state::AppState;

fn default_time_frame() -> String {
    "Daily".to_string()
}

/// 과거 데이터 조회 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct HistoricalParams {
    /// 종목 코드 (업스트림 식별자)
    pub code: String,
    /// 시작일 (YYYY-MM-DD)
    pub start_date: String,
    /// 종료일 (YYYY-MM-DD)
    pub end_date: String,
    /// 조회 주기 (Daily, Weekly, Monthly)
    #[serde(default = "default_time_frame")]
    pub time_frame: String,
}

/// 단일 종목 과거 데이터 조회.
///
/// GET /historical?code=29049&start_date=2024-01-01&end_date=2024-01-31&time_frame=Daily
///
/// 날짜는 역순일 수 없고, 범위는 설정된 최대 일수를 넘을 수 없습니다.
/// 업스트림 payload는 구조 검사(`data` 필드 존재)만 거쳐 그대로 반환됩니다.
#[utoipa::path(
    get,
    path = "/historical",
    tag = "historical",
    params(
        ("code" = String, Query, description = "종목 코드"),
        ("start_date" = String, Query, description = "시작일 (YYYY-MM-DD)"),
        ("end_date" = String, Query, description = "종료일 (YYYY-MM-DD)"),
        ("time_frame" = Option<String>, Query, description = "조회 주기 (기본 Daily)")
    ),
    responses(
        (status = 200, description = "조회 성공", body = Object),
        (status = 400, description = "파라미터 검증 실패", body = Object),
        (status = 502, description = "업스트림 응답 형식 오류", body = Object),
        (status = 503, description = "업스트림 API 실패", body = Object)
    )
)]
pub async fn get_historical(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoricalParams>,
) -> ApiResult<Value> {
    let query = HistoricalQuery::parse(
        &params.code,
        &params.start_date,
        &params.end_date,
        &params.time_frame,
        state.config.limits.max_date_range_days,
    )?;

    let payload = state.provider.historical(&query).await.map_err(|e| {
        record_upstream_request("historical", "error");
        e
    })?;
    record_upstream_request("historical", "ok");

    info!(
        code = %query.code,
        start = %query.start_date,
        end = %query.end_date,
        time_frame = %query.time_frame,
        "Historical data retrieved"
    );

    Ok(Json(ApiResponse::ok(
        payload,
        format!("Historical data retrieved for code {}", query.code),
    )))
}

/// 과거 데이터 라우터 생성.
pub fn historical_router() -> Router<Arc<AppState>> {
    Router::new().route("/historical", get(get_historical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    use crate::state::test_support::{create_test_state, create_test_state_with, StubProvider};

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_returns_upstream_payload() {
        let state = Arc::new(create_test_state());
        let app = historical_router().with_state(state);

        let response = app
            .oneshot(request(
                "/historical?code=29049&start_date=2024-01-01&end_date=2024-01-31",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["data"][0]["rowDate"], "2024-01-02");
        assert_eq!(
            body["message"],
            "Historical data retrieved for code 29049"
        );
    }

    #[tokio::test]
    async fn test_reversed_dates_are_bad_request() {
        let provider = Arc::new(StubProvider::new());
        let state = Arc::new(create_test_state_with(provider.clone()));
        let app = historical_router().with_state(state);

        let response = app
            .oneshot(request(
                "/historical?code=29049&start_date=2024-02-01&end_date=2024-01-01",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // 검증 실패 시 업스트림 호출 없음
        assert_eq!(provider.historical_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_date_format_is_bad_request() {
        let state = Arc::new(create_test_state());
        let app = historical_router().with_state(state);

        let response = app
            .oneshot(request(
                "/historical?code=29049&start_date=01-01-2024&end_date=2024-01-31",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_time_frame_is_bad_request() {
        let state = Arc::new(create_test_state());
        let app = historical_router().with_state(state);

        let response = app
            .oneshot(request(
                "/historical?code=29049&start_date=2024-01-01&end_date=2024-01-31&time_frame=Hourly",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_service_unavailable() {
        let provider = Arc::new(StubProvider::new().with_fail_codes(&["29049"]));
        let state = Arc::new(create_test_state_with(provider));
        let app = historical_router().with_state(state);

        let response = app
            .oneshot(request(
                "/historical?code=29049&start_date=2024-01-01&end_date=2024-01-31",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("External API error: "));
    }
}
