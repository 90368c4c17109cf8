//! 심볼 해석 endpoint.
//!
//! 심볼을 업스트림 종목 코드로 해석하고, 일치 종목의 상세 정보를
//! 함께 반환합니다.
//!
//! # 엔드포인트
//!
//! - `GET /stock-info?symbol=BBRI` - 심볼 → 종목 코드 해석

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
use idx_upstream::resolve::SymbolResolution;

use crate::error::{ApiResponse, ApiResult};
use crate::metrics::record_upstream_request;
use crate::state::AppState;

/// 심볼 조회 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct StockInfoQuery {
    /// 조회할 심볼 (예: BBRI)
    pub symbol: String,
}

/// 심볼 해석 응답 데이터.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StockInfoData {
    /// 첫 번째 일치 항목의 종목 코드
    pub primary_code: String,
    /// 정규화된 심볼 (대문자)
    pub symbol: String,
    /// primary_code에 해당하는 종목 상세 (일치 목록에 없으면 null)
    pub stock_info: Option<StockInfo>,
    /// 대상 시장의 모든 일치 항목
    pub all_matches: Vec<StockInfo>,
}

/// 심볼을 종목 코드로 해석.
///
/// GET /stock-info?symbol=BBRI
///
/// 대상 시장에서 일치 항목을 찾지 못하면 HTTP 200이지만
/// `success: false`인 응답을 반환합니다.
#[utoipa::path(
    get,
    path = "/stock-info",
    tag = "stocks",
    params(
        ("symbol" = String, Query, description = "조회할 심볼 (1~50자)")
    ),
    responses(
        (status = 200, description = "해석 결과 (미일치 시 success=false)", body = Object),
        (status = 422, description = "심볼 길이 위반", body = Object),
        (status = 503, description = "업스트림 API 실패", body = Object)
    )
)]
pub async fn get_stock_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StockInfoQuery>,
) -> ApiResult<StockInfoData> {
    let validated = validate_search_query(&query.symbol)?;
    let symbol = validated.to_uppercase();

    let resolution = state.resolver.resolve(&symbol).await.map_err(|e| {
        record_upstream_request("search", "error");
        e
    })?;
    record_upstream_request("search", "ok");

    match resolution {
        SymbolResolution::Found {
            primary_code,
            matches,
        } => {
            info!(
                symbol = %symbol,
                primary_code = %primary_code,
                matches = matches.len(),
                "Symbol resolved"
            );

            let stock_info = matches
                .iter()
                .find(|stock| stock.code == primary_code)
                .cloned();

            Ok(Json(ApiResponse::ok(
                StockInfoData {
                    primary_code,
                    symbol: symbol.clone(),
                    stock_info,
                    all_matches: matches,
                },
                format!("Stock information retrieved for symbol '{}'", symbol),
            )))
        }
        SymbolResolution::NotFound => {
            info!(symbol = %symbol, "Symbol not found in target market");

            Ok(Json(ApiResponse::fail(format!(
                "No {} stock found for symbol '{}'",
                state.resolver.market(),
                symbol
            ))))
        }
    }
}

/// 심볼 해석 라우터 생성.
pub fn stock_info_router() -> Router<Arc<AppState>> {
    Router::new().route("/stock-info", get(get_stock_info))
}
