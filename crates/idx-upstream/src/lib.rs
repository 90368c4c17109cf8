//! 업스트림 시장 데이터 커넥터.
//!
//! Investing.com API와 통신하는 HTTP 클라이언트, 검색 결과 캐시,
//! 심볼 해석기, 대량 조회 파이프라인을 제공합니다.
//!
//! # 구조
//!
//! - [`client`]: 업스트림 HTTP 클라이언트와 [`MarketDataProvider`] trait
//! - [`cache`]: 검색 결과 LRU 캐시
//! - [`resolve`]: 검색 응답에서 시장별 종목 추출 및 심볼 해석
//! - [`bulk`]: 여러 종목의 과거 데이터 동시 조회

pub mod bulk;
pub mod cache;
pub mod client;
pub mod error;
pub mod resolve;

pub use bulk::{BulkError, BulkFetcher, BulkReport, BulkSummary};
pub use cache::SearchCache;
pub use client::{InvestingClient, MarketDataProvider};
pub use error::UpstreamError;
pub use resolve::{extract_market_stocks, primary_code, StockResolver, SymbolResolution};
