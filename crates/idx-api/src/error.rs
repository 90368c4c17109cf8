//! 통합 API 응답/에러 타입.
//!
//! 모든 엔드포인트가 동일한 응답 봉투를 사용합니다:
//!
//! ```json
//! {
//!   "success": true,
//!   "data": { ... },
//!   "message": "Historical data retrieved for code 29049",
//!   "timestamp": "2025-06-01T09:00:00Z"
//! }
//! ```
//!
//! 에러도 같은 봉투(`success: false`, `data: null`)로 반환되며,
//! HTTP 상태 코드는 [`ApiError`]의 분류를 따릅니다.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use idx_core::domain::request::ValidationError;
use idx_upstream::bulk::BulkError;
use idx_upstream::error::UpstreamError;

/// 표준 API 응답 봉투.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// 요청 성공 여부
    pub success: bool,
    /// 응답 데이터 (실패 시 null)
    pub data: Option<T>,
    /// 사람이 읽을 수 있는 메시지
    pub message: String,
    /// 응답 생성 시각 (UTC)
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// 성공 응답 생성.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// 데이터 없는 실패 응답 생성.
    ///
    /// 비즈니스적 실패(예: 일치 종목 없음)는 HTTP 200과 함께
    /// 이 형태로 반환됩니다.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// API 에러.
///
/// 도메인 에러를 HTTP 상태 코드로 분류합니다:
/// - 검증 실패 → 400 (빈/과대 검색 쿼리는 422)
/// - 벌크 요청 자체 오류 → 400
/// - 업스트림 응답 형식 오류 → 502
/// - 기타 업스트림 실패 → 503
#[derive(Debug, Error)]
pub enum ApiError {
    /// 요청 검증 실패
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// 벌크 요청 오류
    #[error("{0}")]
    Bulk(#[from] BulkError),

    /// 업스트림 API 에러
    #[error("External API error: {0}")]
    Upstream(#[from] UpstreamError),

    /// 내부 에러
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// HTTP 상태 코드 분류.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(ValidationError::EmptyQuery)
            | ApiError::Validation(ValidationError::QueryTooLong) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Bulk(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(UpstreamError::Format(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("Internal error: {}", detail);
        }

        let body = ApiResponse::<serde_json::Value>::fail(self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
