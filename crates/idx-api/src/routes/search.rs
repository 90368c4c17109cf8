//! 종목 검색 endpoint.
//!
//! 업스트림 검색 결과에서 대상 시장 종목만 추려 반환합니다.
//!
//! # 엔드포인트
//!
//! - `GET /search?q=BBRI` - 심볼/키워드 검색

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use idx_core::domain::request::validate_search_query;
use idx_core::domain::stock::StockInfo;

use crate::error::{ApiResponse, ApiResult};
use crate::metrics::record_upstream_request;
use crate::state::AppState;

/// 검색 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// 검색어 (심볼, 종목명, 키워드)
    pub q: String,
}

/// 검색 응답 데이터.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchData {
    /// 검증된 검색어
    pub query: String,
    /// 대상 시장 일치 수
    pub total_results: usize,
    /// 일치 종목 목록
    pub stocks: Vec<StockInfo>,
}

/// 종목 검색.
///
/// GET /search?q=BBRI
///
/// 검색어는 1~50자로 제한되며, 응답에는 대상 시장(flag)에 속한
/// 종목만 포함됩니다.
#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    params(
        ("q" = String, Query, description = "검색어 (1~50자)")
    ),
    responses(
        (status = 200, description = "검색 성공", body = Object),
        (status = 422, description = "검색어 길이 위반", body = Object),
        (status = 503, description = "업스트림 API 실패", body = Object)
    )
)]
pub async fn search_stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchData> {
    let validated = validate_search_query(&query.q)?;

    let stocks = state.resolver.search_stocks(validated).await.map_err(|e| {
        record_upstream_request("search", "error");
        e
    })?;
    record_upstream_request("search", "ok");

    info!(
        query = %validated,
        matches = stocks.len(),
        "Search completed"
    );

    let message = format!(
        "Found {} {} stocks matching '{}'",
        stocks.len(),
        state.resolver.market(),
        validated
    );

    Ok(Json(ApiResponse::ok(
        SearchData {
            query: validated.to_string(),
            total_results: stocks.len(),
            stocks,
        },
        message,
    )))
}

/// 검색 라우터 생성.
pub fn search_router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search_stocks))
}
