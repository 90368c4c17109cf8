//! HTTP 라우트 정의.
//!
//! endpoint별로 모듈을 나누고, [`create_api_router`]에서 하나의
//! 라우터로 합칩니다.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiResponse;
use crate::state::AppState;

pub mod bulk;
pub mod health;
pub mod historical;
pub mod search;
pub mod stock_info;

pub use bulk::bulk_router;
pub use health::health_router;
pub use historical::historical_router;
pub use search::search_router;
pub use stock_info::stock_info_router;

/// 서비스 정보.
///
/// GET /
async fn root_info(State(state): State<Arc<AppState>>) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::ok(
        json!({
            "service": "idxgate",
            "version": state.version,
            "market": state.resolver.market(),
            "endpoints": {
                "search": "/search?q={query}",
                "stock_info": "/stock-info?symbol={symbol}",
                "historical": "/historical?code={code}&start_date={date}&end_date={date}&time_frame={frame}",
                "bulk_historical": "/bulk-historical?codes={code,code}&start_date={date}&end_date={date}",
                "health": "/health",
                "docs": "/swagger-ui"
            }
        }),
        "IDX market data gateway".to_string(),
    ))
}

/// 모든 API 라우트를 하나의 라우터로 합칩니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root_info))
        .nest("/health", health_router())
        .merge(search_router())
        .merge(stock_info_router())
        .merge(historical_router())
        .merge(bulk_router())
}
