//! 조회 주기 (time frame).

use serde::{Deserialize, Serialize};

/// 과거 데이터 조회 주기.
///
/// 업스트림의 `time-frame` 쿼리 파라미터 값과 1:1로 대응합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum TimeFrame {
    /// 일봉
    #[default]
    Daily,
    /// 주봉
    Weekly,
    /// 월봉
    Monthly,
}

impl TimeFrame {
    /// 업스트림 파라미터 문자열로 변환.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Daily => "Daily",
            TimeFrame::Weekly => "Weekly",
            TimeFrame::Monthly => "Monthly",
        }
    }

    /// 인식 가능한 전체 값 목록.
    pub fn all() -> &'static [TimeFrame] {
        &[TimeFrame::Daily, TimeFrame::Weekly, TimeFrame::Monthly]
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(TimeFrame::Daily),
            "Weekly" => Ok(TimeFrame::Weekly),
            "Monthly" => Ok(TimeFrame::Monthly),
            _ => Err(format!("Unknown time frame: {}", s)),
        }
    }
}
