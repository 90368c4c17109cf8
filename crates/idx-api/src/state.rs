//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 설정, 업스트림 제공자, 심볼 해석기, 대량 조회기를
//! 담습니다. Arc로 래핑되어 Axum의 State extractor를 통해
//! 핸들러에 주입됩니다.

use std::sync::Arc;

use idx_core::config::AppConfig;
use idx_upstream::bulk::BulkFetcher;
use idx_upstream::client::MarketDataProvider;
use idx_upstream::resolve::StockResolver;

/// 애플리케이션 공유 상태.
pub struct AppState {
    /// 로드된 애플리케이션 설정
    pub config: AppConfig,

    /// 업스트림 시장 데이터 제공자
    pub provider: Arc<dyn MarketDataProvider>,

    /// 심볼 해석기 (검색 캐시 포함)
    pub resolver: StockResolver,

    /// 대량 과거 데이터 조회기
    pub bulk: BulkFetcher,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// 캐시가 비활성화된 경우 용량 0으로 해석기를 구성합니다.
    pub fn new(config: AppConfig, provider: Arc<dyn MarketDataProvider>) -> Self {
        let cache_capacity = if config.cache.enabled {
            config.cache.capacity
        } else {
            0
        };

        let resolver = StockResolver::new(
            Arc::clone(&provider),
            config.upstream.market.clone(),
            cache_capacity,
        );
        let bulk = BulkFetcher::new(
            Arc::clone(&provider),
            config.limits.max_bulk_codes,
            config.limits.max_concurrent_requests,
        );

        Self {
            config,
            provider,
            resolver,
            bulk,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

// ==================== 테스트 지원 ====================

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    //! 라우트 테스트용 고정 응답 제공자.

    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use idx_core::domain::request::HistoricalQuery;
    use idx_upstream::error::UpstreamError;

    /// 고정된 응답을 반환하고 호출 횟수를 기록하는 제공자.
    pub struct StubProvider {
        pub search_response: Value,
        pub historical_response: Value,
        /// 과거 데이터 조회가 실패해야 하는 종목 코드
        pub fail_codes: Vec<String>,
        pub search_calls: AtomicUsize,
        pub historical_calls: AtomicUsize,
    }

    impl StubProvider {
        pub fn new() -> Self {
            Self {
                search_response: default_search_response(),
                historical_response: json!({"data": [
                    {"rowDate": "2024-01-02", "last_close": 5725.0, "volume": 1000000}
                ]}),
                fail_codes: Vec::new(),
                search_calls: AtomicUsize::new(0),
                historical_calls: AtomicUsize::new(0),
            }
        }

        pub fn with_search_response(mut self, response: Value) -> Self {
            self.search_response = response;
            self
        }

        pub fn with_fail_codes(mut self, codes: &[&str]) -> Self {
            self.fail_codes = codes.iter().map(|s| s.to_string()).collect();
            self
        }
    }

    impl Default for StubProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn search(&self, _query: &str) -> Result<Value, UpstreamError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.search_response.clone())
        }

        async fn historical(&self, query: &HistoricalQuery) -> Result<Value, UpstreamError> {
            self.historical_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_codes.contains(&query.code) {
                Err(UpstreamError::Status {
                    code: 503,
                    message: "unavailable".to_string(),
                })
            } else {
                Ok(self.historical_response.clone())
            }
        }
    }

    /// 인도네시아 종목 2건이 포함된 표준 검색 응답.
    pub fn default_search_response() -> Value {
        json!({
            "quotes": [
                {"id": 29049, "symbol": "BBRI", "name": "Bank Rakyat Indonesia",
                 "flag": "Indonesia", "exchange": "Jakarta"},
                {"id": 100, "symbol": "BBRI.US", "name": "BRI ADR",
                 "flag": "USA", "exchange": "OTC"},
                {"id": 29050, "symbol": "BBRI-R", "name": "BBRI Rights",
                 "flag": "Indonesia", "exchange": "Jakarta"},
            ]
        })
    }

    /// 기본 설정과 StubProvider 기반의 테스트 상태 생성.
    pub fn create_test_state() -> AppState {
        create_test_state_with(Arc::new(StubProvider::new()))
    }

    /// 주어진 제공자로 테스트 상태 생성.
    ///
    /// Arc를 유지하면 테스트에서 호출 횟수를 검사할 수 있습니다.
    pub fn create_test_state_with(provider: Arc<StubProvider>) -> AppState {
        AppState::new(AppConfig::default(), provider)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::create_test_state;

    #[test]
    fn test_state_defaults() {
        let state = create_test_state();
        assert_eq!(state.config.upstream.market, "Indonesia");
        assert_eq!(state.resolver.market(), "Indonesia");
        assert!(!state.version.is_empty());
        assert!(state.uptime_secs() >= 0);
    }

    #[test]
    fn test_cache_disabled_uses_zero_capacity() {
        use super::test_support::StubProvider;
        use super::*;

        let mut config = AppConfig::default();
        config.cache.enabled = false;

        let state = AppState::new(config, Arc::new(StubProvider::new()));
        state
            .resolver
            .cache()
            .insert("BBRI".to_string(), serde_json::json!({}));
        assert!(state.resolver.cache().is_empty());
    }
}
