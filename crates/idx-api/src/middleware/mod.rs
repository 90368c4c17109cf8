//! API 서버용 HTTP middleware.
//!
//! 요청 처리 파이프라인에 적용되는 middleware 모듈.

mod api_key;
mod metrics;
mod rate_limit;

pub use api_key::{api_key_middleware, ApiKeyState};
pub use metrics::metrics_layer;
pub use rate_limit::{rate_limit_middleware, RateLimitResult, RateLimiter, RateLimitState};
