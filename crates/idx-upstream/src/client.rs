//! Investing.com HTTP 클라이언트.
//!
//! 업스트림 API는 브라우저 트래픽만 허용하므로 브라우저와 동일한
//! 식별 헤더(domain-id, referer, origin, user-agent)를 전송합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use idx_upstream::client::{InvestingClient, MarketDataProvider};
//!
//! let client = InvestingClient::new(&config.upstream)?;
//! let response = client.search("BBRI").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use serde_json::Value;
use tracing::{debug, error};

use idx_core::config::UpstreamConfig;
use idx_core::domain::request::HistoricalQuery;

use crate::error::UpstreamError;

/// 업스트림으로 전송하는 user-agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// 에러 응답 본문을 메시지에 포함할 때의 최대 길이.
const MAX_ERROR_BODY_LEN: usize = 256;

/// 시장 데이터 제공자 trait.
///
/// 검색과 과거 데이터 조회의 단위 인터페이스입니다. 상위 계층(해석기,
/// 대량 조회, 라우트)은 이 trait에만 의존하므로 테스트에서 업스트림을
/// 대체할 수 있습니다.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 심볼/키워드 검색. 업스트림 검색 응답을 그대로 반환합니다.
    async fn search(&self, query: &str) -> Result<Value, UpstreamError>;

    /// 과거 캔들(OHLCV) 데이터 조회. 업스트림 페이로드를 그대로 반환합니다.
    async fn historical(&self, query: &HistoricalQuery) -> Result<Value, UpstreamError>;
}

/// Investing.com API 클라이언트.
pub struct InvestingClient {
    client: reqwest::Client,
    base_url: String,
    search_timeout: Duration,
    historical_timeout: Duration,
}

impl InvestingClient {
    /// 새로운 클라이언트 생성.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert("domain-id", HeaderValue::from_static("id"));
        headers.insert(REFERER, HeaderValue::from_static("https://investing.com"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://investing.com"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| UpstreamError::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_timeout: Duration::from_secs(config.search_timeout_secs),
            historical_timeout: Duration::from_secs(config.historical_timeout_secs),
        })
    }

    /// 응답 상태를 확인하고 JSON 본문을 파싱합니다.
    async fn read_json(response: reqwest::Response) -> Result<Value, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(MAX_ERROR_BODY_LEN);
            return Err(UpstreamError::Status {
                code: status.as_u16(),
                message: body,
            });
        }

        let payload: Value = response.json().await?;
        Ok(payload)
    }
}

#[async_trait]
impl MarketDataProvider for InvestingClient {
    async fn search(&self, query: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}/search/v2/search", self.base_url);
        debug!("Searching upstream for '{}'", query);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .timeout(self.search_timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Search request failed for '{}': {}", query, e);
                UpstreamError::from(e)
            })?;

        Self::read_json(response).await
    }

    async fn historical(&self, query: &HistoricalQuery) -> Result<Value, UpstreamError> {
        let url = format!("{}/financialdata/historical/{}", self.base_url, query.code);
        debug!(
            "Fetching historical data for {} ({} ~ {}, {})",
            query.code, query.start_date, query.end_date, query.time_frame
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("start-date", query.start_date.to_string()),
                ("end-date", query.end_date.to_string()),
                ("time-frame", query.time_frame.as_str().to_string()),
                ("add-missing-rows", "false".to_string()),
            ])
            .timeout(self.historical_timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Historical request failed for {}: {}", query.code, e);
                UpstreamError::from(e)
            })?;

        let payload = Self::read_json(response).await?;

        // 페이로드는 `data` 필드를 가진 객체여야 함
        if !payload
            .as_object()
            .is_some_and(|obj| obj.contains_key("data"))
        {
            return Err(UpstreamError::Format(
                "historical payload is missing the 'data' field".to_string(),
            ));
        }

        Ok(payload)
    }
}
