//! IDX 데이터 게이트웨이의 핵심 도메인 타입.
//!
//! 이 크레이트는 게이트웨이 전체에서 공유되는 기반을 제공합니다:
//! - 도메인 타입 (StockInfo, TimeFrame)
//! - 요청 검증 (HistoricalQuery)
//! - 설정 관리 (AppConfig)
//! - 로깅 인프라 (tracing 기반)

pub mod config;
pub mod domain;
pub mod logging;

pub use config::{
    AppConfig, CacheConfig, LimitsConfig, LoggingConfig, RateLimitConfig, SecurityConfig,
    ServerConfig, UpstreamConfig,
};
pub use domain::request::{
    parse_date_range, validate_search_query, HistoricalQuery, ValidationError,
};
pub use domain::stock::StockInfo;
pub use domain::time_frame::TimeFrame;
pub use logging::{init_logging, init_logging_from_env, LogConfig, LogFormat};
