//! 업스트림 에러 타입.

use thiserror::Error;

/// 업스트림 API 관련 에러.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 업스트림 HTTP 에러 상태
    #[error("Upstream returned status {code}: {message}")]
    Status { code: u16, message: String },

    /// 예상과 다른 응답 구조 (예: `data` 필드 없음)
    #[error("Invalid response format: {0}")]
    Format(String),

    /// JSON 파싱 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl UpstreamError {
    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Network(_) | UpstreamError::Timeout(_) => true,
            UpstreamError::Status { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err.to_string())
        } else if err.is_connect() {
            UpstreamError::Network(err.to_string())
        } else if err.is_decode() {
            UpstreamError::Parse(err.to_string())
        } else {
            UpstreamError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        UpstreamError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(UpstreamError::Timeout("t".into()).is_retryable());
        assert!(UpstreamError::Network("n".into()).is_retryable());
        assert!(UpstreamError::Status {
            code: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(UpstreamError::Status {
            code: 429,
            message: "slow down".into()
        }
        .is_retryable());
        assert!(!UpstreamError::Status {
            code: 404,
            message: "missing".into()
        }
        .is_retryable());
        assert!(!UpstreamError::Format("no data field".into()).is_retryable());
    }
}
