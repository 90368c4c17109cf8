//! 대량 과거 데이터 조회.
//!
//! 여러 종목 코드의 과거 데이터를 제한된 동시성으로 조회하고,
//! 부분 실패를 허용하는 집계 결과를 만듭니다. 한 종목의 실패가
//! 전체 요청을 실패시키지 않습니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use idx_core::domain::request::HistoricalQuery;
use idx_core::domain::time_frame::TimeFrame;

use crate::client::MarketDataProvider;

/// 대량 조회 요청 자체의 에러.
///
/// 개별 종목의 업스트림 실패는 [`BulkReport::errors`]로 집계되며
/// 이 에러가 되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    /// 요청 종목 수 초과
    #[error("Requested {count} codes, maximum is {max}")]
    TooManyCodes { count: usize, max: usize },
}

/// 종목별 집계 요약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    /// 정규화 후 요청된 종목 수
    pub total_requested: usize,
    /// 성공한 종목 수
    pub successful: usize,
    /// 실패한 종목 수
    pub failed: usize,
}

/// 대량 조회 결과.
///
/// 불변식: `summary.successful + summary.failed == summary.total_requested`.
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    /// 성공한 종목의 코드 → 업스트림 페이로드
    pub successful: BTreeMap<String, Value>,
    /// 실패한 종목의 코드 → 에러 메시지
    pub errors: BTreeMap<String, String>,
    /// 집계 요약
    pub summary: BulkSummary,
}

/// 대량 과거 데이터 조회기.
pub struct BulkFetcher {
    provider: Arc<dyn MarketDataProvider>,
    max_codes: usize,
    max_concurrent: usize,
}

impl BulkFetcher {
    /// 새로운 조회기 생성.
    pub fn new(provider: Arc<dyn MarketDataProvider>, max_codes: usize, max_concurrent: usize) -> Self {
        Self {
            provider,
            max_codes,
            // buffer_unordered(0)은 진행되지 않으므로 최소 1 보장
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 종목 코드 목록 정규화: 공백 제거, 빈 항목 제외, 순서 유지 중복 제거.
    ///
    /// 중복 코드는 결과 맵에서 하나로 합쳐지므로 집계 불변식을 지키기
    /// 위해 요청 단계에서 제거합니다.
    fn normalize_codes(codes: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        codes
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .filter(|c| seen.insert(c.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// 여러 종목의 과거 데이터를 동시 조회합니다.
    ///
    /// 한도 검사는 업스트림 호출 전에 수행되며, 초과 시 어떤 조회도
    /// 발생하지 않습니다.
    pub async fn fetch(
        &self,
        codes: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
        time_frame: TimeFrame,
    ) -> Result<BulkReport, BulkError> {
        let codes = Self::normalize_codes(codes);

        // 정규화 후 코드가 없으면 빈 집계 결과를 반환합니다.
        if codes.is_empty() {
            info!("Bulk fetch with no valid codes, returning empty report");
            return Ok(BulkReport {
                successful: BTreeMap::new(),
                errors: BTreeMap::new(),
                summary: BulkSummary {
                    total_requested: 0,
                    successful: 0,
                    failed: 0,
                },
            });
        }
        if codes.len() > self.max_codes {
            return Err(BulkError::TooManyCodes {
                count: codes.len(),
                max: self.max_codes,
            });
        }

        let total_requested = codes.len();
        info!(
            "Bulk fetch for {} codes ({} ~ {}, {})",
            total_requested, start_date, end_date, time_frame
        );

        let results: Vec<(String, Result<Value, String>)> = stream::iter(codes)
            .map(|code| {
                let provider = Arc::clone(&self.provider);
                async move {
                    let query = HistoricalQuery {
                        code: code.clone(),
                        start_date,
                        end_date,
                        time_frame,
                    };
                    let result = provider
                        .historical(&query)
                        .await
                        .map_err(|e| e.to_string());
                    (code, result)
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut successful = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for (code, result) in results {
            match result {
                Ok(payload) => {
                    successful.insert(code, payload);
                }
                Err(message) => {
                    warn!("Bulk fetch failed for {}: {}", code, message);
                    errors.insert(code, message);
                }
            }
        }

        let summary = BulkSummary {
            total_requested,
            successful: successful.len(),
            failed: errors.len(),
        };

        Ok(BulkReport {
            successful,
            errors,
            summary,
        })
    }
}
