//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 기본값 → 설정 파일(TOML) → 환경 변수(`IDX__` 접두사) 순으로 적용됩니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 업스트림 데이터 제공자 설정
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// 검색 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 요청 한도 설정
    #[serde(default)]
    pub limits: LimitsConfig,
    /// 보안 설정
    #[serde(default)]
    pub security: SecurityConfig,
    /// Rate limit 설정
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// 업스트림 데이터 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// API 베이스 URL
    pub base_url: String,
    /// 과거 데이터 요청 타임아웃 (초)
    pub historical_timeout_secs: u64,
    /// 검색 요청 타임아웃 (초)
    pub search_timeout_secs: u64,
    /// 필터링 대상 시장 태그 (검색 응답의 `flag` 필드와 비교)
    pub market: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.investing.com/api".to_string(),
            historical_timeout_secs: 15,
            search_timeout_secs: 10,
            market: "Indonesia".to_string(),
        }
    }
}

/// 검색 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// 캐시 활성화 여부
    pub enabled: bool,
    /// 최대 엔트리 수 (LRU 축출 기준)
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 128,
        }
    }
}

/// 요청 한도 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// 벌크 요청당 최대 종목 코드 수
    pub max_bulk_codes: usize,
    /// 조회 가능한 최대 날짜 범위 (일)
    pub max_date_range_days: i64,
    /// 업스트림 동시 요청 한도
    pub max_concurrent_requests: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_bulk_codes: 20,
            max_date_range_days: 365,
            max_concurrent_requests: 10,
        }
    }
}

/// 보안 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    /// API 키 검사 활성화 여부
    pub require_api_key: bool,
    /// 기대하는 API 키 값 (`X-API-Key` 헤더와 비교)
    #[serde(default)]
    pub api_key: String,
    /// 허용할 CORS origin 목록 (비어 있으면 모든 origin 허용)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_api_key: false,
            api_key: String::new(),
            cors_origins: Vec::new(),
        }
    }
}

/// Rate limit 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Rate limit 활성화 여부
    pub enabled: bool,
    /// 분당 최대 요청 수
    pub requests_per_minute: u32,
    /// 버스트 허용량 (순간적으로 허용되는 추가 요청)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 100,
            burst_size: 20,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨 필터 (예: "info", "idx_api=debug")
    pub level: String,
    /// 출력 형식 ("pretty" | "json" | "compact")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값 위에 환경 변수만 적용됩니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("IDX")
                    .separator("__")
                    .try_parsing(true),
            );

        let loaded: AppConfig = builder.build()?.try_deserialize()?;
        Ok(loaded)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// 소켓 주소 문자열 반환.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
