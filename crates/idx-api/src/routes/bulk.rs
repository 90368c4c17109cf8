//! 대량 과거 데이터 endpoint.
//!
//! 쉼표로 구분된 종목 코드 목록을 제한된 동시성으로 조회하고,
//! 부분 실패를 집계한 결과를 반환합니다.
//!
//! # 엔드포인트
//!
//! - `GET /bulk-historical?codes=29049,29050&start_date=...&end_date=...` - 대량 조회

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use idx_core::domain::request::{parse_date_range, ValidationError};
use idx_core::domain::time_frame::TimeFrame;
use idx_upstream::bulk::BulkReport;

use crate::error::{ApiResponse, ApiResult};
use crate::metrics::record_upstream_request;
use crate::state::AppState;

fn default_time_frame() -> String {
    "Daily".to_string()
}

/// 대량 조회 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct BulkParams {
    /// 쉼표로 구분된 종목 코드 목록 (예: "29049,29050")
    pub codes: String,
    /// 시작일 (YYYY-MM-DD)
    pub start_date: String,
    /// 종료일 (YYYY-MM-DD)
    pub end_date: String,
    /// 조회 주기 (Daily, Weekly, Monthly)
    #[serde(default = "default_time_frame")]
    pub time_frame: String,
}

/// 대량 과거 데이터 조회.
///
/// GET /bulk-historical?codes=29049,29050&start_date=2024-01-01&end_date=2024-01-31
///
/// 종목 수 한도(설정값, 기본 20)를 넘으면 어떤 업스트림 호출도 하지
/// 않고 400을 반환합니다. 유효한 코드가 하나도 없으면 빈 집계 결과를
/// 200으로 반환하며, 개별 종목의 실패는 집계 결과의 `errors`로
/// 보고됩니다.
#[utoipa::path(
    get,
    path = "/bulk-historical",
    tag = "bulk",
    params(
        ("codes" = String, Query, description = "쉼표로 구분된 종목 코드 목록 (최대 20개)"),
        ("start_date" = String, Query, description = "시작일 (YYYY-MM-DD)"),
        ("end_date" = String, Query, description = "종료일 (YYYY-MM-DD)"),
        ("time_frame" = Option<String>, Query, description = "조회 주기 (기본 Daily)")
    ),
    responses(
        (status = 200, description = "집계 결과 (부분 실패 포함)", body = Object),
        (status = 400, description = "파라미터 또는 한도 위반", body = Object)
    )
)]
pub async fn get_bulk_historical(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BulkParams>,
) -> ApiResult<BulkReport> {
    let (start, end) = parse_date_range(
        &params.start_date,
        &params.end_date,
        state.config.limits.max_date_range_days,
    )?;

    let time_frame = params
        .time_frame
        .parse::<TimeFrame>()
        .map_err(|_| ValidationError::UnknownTimeFrame(params.time_frame.clone()))?;

    let codes: Vec<String> = params.codes.split(',').map(str::to_string).collect();

    let report = state.bulk.fetch(&codes, start, end, time_frame).await?;
    record_upstream_request("bulk", "ok");

    info!(
        total = report.summary.total_requested,
        successful = report.summary.successful,
        failed = report.summary.failed,
        "Bulk historical fetch completed"
    );

    let message = format!(
        "Bulk historical data request completed: {}/{} successful",
        report.summary.successful, report.summary.total_requested
    );

    Ok(Json(ApiResponse::ok(report, message)))
}

/// 대량 조회 라우터 생성.
pub fn bulk_router() -> Router<Arc<AppState>> {
    Router::new().route("/bulk-historical", get(get_bulk_historical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    use crate::state::test_support::{create_test_state_with, StubProvider};

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
    async fn test_partial_failure_report() {
        let provider = Arc::new(StubProvider::new().with_fail_codes(&["29050"]));
        let state = Arc::new(create_test_state_with(provider));
        let app = bulk_router().with_state(state);

        let response = app
            .oneshot(request(
                "/bulk-historical?codes=29049,29050&start_date=2024-01-01&end_date=2024-01-31",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["summary"]["total_requested"], 2);
        assert_eq!(body["data"]["summary"]["successful"], 1);
        assert_eq!(body["data"]["summary"]["failed"], 1);
        assert!(body["data"]["successful"]["29049"].is_object());
        assert!(body["data"]["errors"]["29050"].is_string());
        assert_eq!(
            body["message"],
            "Bulk historical data request completed: 1/2 successful"
        );
    }

    #[tokio::test]
    async fn test_too_many_codes_makes_no_calls() {
        let provider = Arc::new(StubProvider::new());
        let state = Arc::new(create_test_state_with(provider.clone()));
        let app = bulk_router().with_state(state);

        let codes: Vec<String> = (1..=21).map(|n| n.to_string()).collect();
        let uri = format!(
            "/bulk-historical?codes={}&start_date=2024-01-01&end_date=2024-01-31",
            codes.join(",")
        );

        let response = app.oneshot(request(&uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.historical_calls.load(Ordering::SeqCst), 0);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_empty_codes_yields_empty_report() {
        let provider = Arc::new(StubProvider::new());
        let state = Arc::new(create_test_state_with(provider.clone()));
        let app = bulk_router().with_state(state);

        let response = app
            .oneshot(request(
                "/bulk-historical?codes=,,&start_date=2024-01-01&end_date=2024-01-31",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(provider.historical_calls.load(Ordering::SeqCst), 0);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["summary"]["total_requested"], 0);
        assert_eq!(body["data"]["summary"]["successful"], 0);
        assert_eq!(body["data"]["summary"]["failed"], 0);
        assert_eq!(
            body["message"],
            "Bulk historical data request completed: 0/0 successful"
        );
    }

    #[tokio::test]
    async fn test_reversed_dates_rejected_before_fetch() {
        let provider = Arc::new(StubProvider::new());
        let state = Arc::new(create_test_state_with(provider.clone()));
        let app = bulk_router().with_state(state);

        let response = app
            .oneshot(request(
                "/bulk-historical?codes=29049&start_date=2024-02-01&end_date=2024-01-01",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.historical_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_codes_collapsed() {
        let provider = Arc::new(StubProvider::new());
        let state = Arc::new(create_test_state_with(provider.clone()));
        let app = bulk_router().with_state(state);

        let response = app
            .oneshot(request(
                "/bulk-historical?codes=29049,29049,29050&start_date=2024-01-01&end_date=2024-01-31",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["summary"]["total_requested"], 2);
        assert_eq!(provider.historical_calls.load(Ordering::SeqCst), 2);
    }
}
