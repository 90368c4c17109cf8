//! 심볼 해석기.
//!
//! 업스트림 검색 응답에서 대상 시장(flag) 종목만 추려내고,
//! 심볼 문자열을 업스트림 종목 코드로 해석합니다. 검색 응답은
//! [`SearchCache`]를 통해 캐시됩니다.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use idx_core::domain::stock::StockInfo;

use crate::cache::SearchCache;
use crate::client::MarketDataProvider;
use crate::error::UpstreamError;

/// 심볼 해석 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolResolution {
    /// 대상 시장에서 일치 항목을 찾음.
    Found {
        /// 첫 번째 일치 항목의 종목 코드
        primary_code: String,
        /// 대상 시장의 모든 일치 항목
        matches: Vec<StockInfo>,
    },
    /// 대상 시장에 일치 항목 없음.
    NotFound,
}

/// 검색 응답에서 대상 시장 종목만 추출.
///
/// `quotes` 배열에서 `flag`가 일치하는 항목을 순서대로 수집합니다.
/// 필수 필드가 없는 항목은 경고 후 건너뜁니다.
pub fn extract_market_stocks(response: &Value, market: &str) -> Vec<StockInfo> {
    let Some(quotes) = response.get("quotes").and_then(Value::as_array) else {
        return Vec::new();
    };

    quotes
        .iter()
        .filter(|quote| quote.get("flag").and_then(Value::as_str) == Some(market))
        .filter_map(|quote| match parse_quote(quote, market) {
            Some(stock) => Some(stock),
            None => {
                warn!("Skipping malformed quote entry: {}", quote);
                None
            }
        })
        .collect()
}

/// 첫 번째 대상 시장 일치 항목의 종목 코드.
pub fn primary_code(response: &Value, market: &str) -> Option<String> {
    response
        .get("quotes")
        .and_then(Value::as_array)?
        .iter()
        .find(|quote| quote.get("flag").and_then(Value::as_str) == Some(market))
        .and_then(|quote| quote.get("id"))
        .and_then(code_string)
}

/// quote 항목을 StockInfo로 변환.
fn parse_quote(quote: &Value, market: &str) -> Option<StockInfo> {
    Some(StockInfo {
        code: quote.get("id").and_then(code_string)?,
        symbol: field_or_empty(quote, "symbol"),
        name: field_or_empty(quote, "name"),
        flag: market.to_string(),
        exchange: field_or_empty(quote, "exchange"),
    })
}

/// 종목 코드는 숫자 또는 문자열로 도착함.
fn code_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_or_empty(quote: &Value, key: &str) -> String {
    quote
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// 캐시를 거친 검색과 심볼 해석을 제공합니다.
pub struct StockResolver {
    provider: Arc<dyn MarketDataProvider>,
    cache: SearchCache,
    market: String,
}

impl StockResolver {
    /// 새로운 해석기 생성.
    ///
    /// `cache_capacity`가 0이면 캐시가 비활성화됩니다.
    pub fn new(provider: Arc<dyn MarketDataProvider>, market: String, cache_capacity: usize) -> Self {
        Self {
            provider,
            cache: SearchCache::new(cache_capacity),
            market,
        }
    }

    /// 검색 결과 캐시 참조.
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// 대상 시장 이름.
    pub fn market(&self) -> &str {
        &self.market
    }

    /// 캐시 우선 검색.
    ///
    /// 쿼리는 대문자로 정규화되어 캐시 키로 사용됩니다. 미스 시
    /// 업스트림을 조회하며, Lock은 조회 동안 유지되지 않습니다.
    /// 업스트림 에러는 캐시되지 않습니다.
    pub async fn cached_search(&self, query: &str) -> Result<Value, UpstreamError> {
        let key = query.to_uppercase();

        if let Some(cached) = self.cache.get(&key) {
            debug!("Search cache hit for '{}'", key);
            return Ok(cached);
        }

        let response = self.provider.search(&key).await?;
        self.cache.insert(key, response.clone());
        Ok(response)
    }

    /// 검색 후 대상 시장 종목 목록 반환.
    pub async fn search_stocks(&self, query: &str) -> Result<Vec<StockInfo>, UpstreamError> {
        let response = self.cached_search(query).await?;
        Ok(extract_market_stocks(&response, &self.market))
    }

    /// 심볼을 종목 코드로 해석.
    pub async fn resolve(&self, symbol: &str) -> Result<SymbolResolution, UpstreamError> {
        let response = self.cached_search(symbol).await?;

        match primary_code(&response, &self.market) {
            Some(code) => Ok(SymbolResolution::Found {
                primary_code: code,
                matches: extract_market_stocks(&response, &self.market),
            }),
            None => Ok(SymbolResolution::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use idx_core::domain::request::HistoricalQuery;

    /// 호출 횟수를 기록하는 고정 응답 제공자.
    struct FixedProvider {
        response: Value,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(response: Value) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for FixedProvider {
        async fn search(&self, _query: &str) -> Result<Value, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn historical(&self, _query: &HistoricalQuery) -> Result<Value, UpstreamError> {
            unreachable!("resolver tests never fetch historical data")
        }
    }

    fn sample_response() -> Value {
        json!({
            "quotes": [
                {"id": 12345, "symbol": "BBRI", "name": "Bank Rakyat Indonesia",
                 "flag": "Indonesia", "exchange": "Jakarta"},
                {"id": "99", "symbol": "BBRI.US", "name": "BRI ADR",
                 "flag": "USA", "exchange": "OTC"},
                {"id": 67890, "symbol": "BBRI-W", "name": "BBRI Warrant",
                 "flag": "Indonesia", "exchange": "Jakarta"},
            ]
        })
    }

    #[test]
    fn test_extract_market_stocks_filters_by_flag() {
        let stocks = extract_market_stocks(&sample_response(), "Indonesia");

        assert_eq!(stocks.len(), 2);
        assert_eq!(stocks[0].code, "12345");
        assert_eq!(stocks[0].symbol, "BBRI");
        assert_eq!(stocks[1].code, "67890");
    }

    #[test]
    fn test_extract_handles_missing_quotes() {
        assert!(extract_market_stocks(&json!({}), "Indonesia").is_empty());
        assert!(extract_market_stocks(&json!({"quotes": "oops"}), "Indonesia").is_empty());
    }

    #[test]
    fn test_extract_skips_quote_without_id() {
        let response = json!({
            "quotes": [
                {"symbol": "NOID", "flag": "Indonesia"},
                {"id": 7, "symbol": "OK", "flag": "Indonesia"},
            ]
        });

        let stocks = extract_market_stocks(&response, "Indonesia");
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[0].code, "7");
    }

    #[test]
    fn test_primary_code_is_first_match() {
        assert_eq!(
            primary_code(&sample_response(), "Indonesia"),
            Some("12345".to_string())
        );
        assert_eq!(primary_code(&sample_response(), "Japan"), None);
    }

    #[tokio::test]
    async fn test_cached_search_normalizes_and_caches() {
        let provider = Arc::new(FixedProvider::new(sample_response()));
        let resolver = StockResolver::new(provider.clone(), "Indonesia".to_string(), 8);

        resolver.cached_search("bbri").await.unwrap();
        resolver.cached_search("BBRI").await.unwrap();
        resolver.cached_search("Bbri").await.unwrap();

        // 대소문자가 달라도 업스트림 호출은 한 번
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cache().hits(), 2);
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let provider = Arc::new(FixedProvider::new(sample_response()));
        let resolver = StockResolver::new(provider, "Indonesia".to_string(), 8);

        let resolution = resolver.resolve("BBRI").await.unwrap();
        match resolution {
            SymbolResolution::Found {
                primary_code,
                matches,
            } => {
                assert_eq!(primary_code, "12345");
                assert_eq!(matches.len(), 2);
            }
            SymbolResolution::NotFound => panic!("expected a match"),
        }
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let provider = Arc::new(FixedProvider::new(json!({"quotes": []})));
        let resolver = StockResolver::new(provider, "Indonesia".to_string(), 8);

        let resolution = resolver.resolve("ZZZZ").await.unwrap();
        assert_eq!(resolution, SymbolResolution::NotFound);
    }
}
