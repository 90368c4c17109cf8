//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use idx_core::domain::stock::StockInfo;

use crate::routes::health::{CacheStats, HealthResponse, ReadyResponse};
use crate::routes::search::SearchData;
use crate::routes::stock_info::StockInfoData;

/// IDX Gate API 문서.
///
/// 모든 엔드포인트와 스키마를 포함하는 OpenAPI 3.0 스펙입니다.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "IDX Gate API",
        version = "0.1.0",
        description = r#"
# IDX 시장 데이터 게이트웨이

Investing.com의 비공식 API를 재노출하는 프록시입니다.

## 주요 기능

- **검색**: 심볼/키워드로 대상 시장 종목 검색
- **심볼 해석**: 심볼 → 업스트림 종목 코드 변환
- **과거 데이터**: 단일 종목 OHLCV 조회
- **대량 조회**: 여러 종목 동시 조회 (부분 실패 허용)

## 응답 형식

모든 응답은 `{success, data, message, timestamp}` envelope로 감싸집니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "search", description = "검색 - 대상 시장 종목 검색"),
        (name = "stocks", description = "종목 - 심볼 해석 및 상세 정보"),
        (name = "historical", description = "과거 데이터 - 단일 종목 OHLCV"),
        (name = "bulk", description = "대량 조회 - 여러 종목 동시 조회")
    ),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ReadyResponse,
            CacheStats,

            // ===== Stocks =====
            StockInfo,
            SearchData,
            StockInfoData,
        )
    ),
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Stocks =====
        crate::routes::search::search_stocks,
        crate::routes::stock_info::get_stock_info,

        // ===== Historical =====
        crate::routes::historical::get_historical,
        crate::routes::bulk::get_bulk_historical,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
