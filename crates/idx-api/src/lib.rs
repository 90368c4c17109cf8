//! IDX 시장 데이터 게이트웨이 REST API.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 종목 검색 / 심볼 해석 / 과거 데이터 / 대량 조회 엔드포인트
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//! - OpenAPI 문서 및 Swagger UI
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어 (rate limit, API 키, 메트릭)
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI
//! - [`error`]: 응답 envelope 및 에러 → HTTP 상태 매핑

pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use openapi::{swagger_ui_router, ApiDoc};
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::test_support;
