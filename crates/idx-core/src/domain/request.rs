//! 요청 검증.
//!
//! 업스트림 호출이 발생하기 전에 수행되는 순수 검증 로직입니다.
//! 날짜 형식, 날짜 순서, 범위 길이, time frame 값을 검사합니다.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::time_frame::TimeFrame;

/// 날짜 문자열 형식.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 검색 쿼리 최대 길이 (문자).
pub const MAX_QUERY_LEN: usize = 50;

/// 요청 검증 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 날짜 형식 오류
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    BadDateFormat(String),

    /// 종료일이 시작일보다 앞섬
    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    /// 날짜 범위 초과
    #[error("Date range of {days} days exceeds the maximum of {max} days")]
    RangeTooLarge { days: i64, max: i64 },

    /// 인식할 수 없는 time frame
    #[error("Unknown time frame '{0}': expected Daily, Weekly or Monthly")]
    UnknownTimeFrame(String),

    /// 빈 종목 코드
    #[error("Stock code must not be empty")]
    EmptyCode,

    /// 빈 검색 쿼리
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// 검색 쿼리 길이 초과
    #[error("Search query exceeds {MAX_QUERY_LEN} characters")]
    QueryTooLong,
}

/// 검증이 끝난 과거 데이터 요청.
///
/// `parse`를 통해서만 생성되며, 생성 이후 변경되지 않습니다.
/// 불변식: `start_date <= end_date <= start_date + max_range_days`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalQuery {
    /// 종목 코드 (업스트림 식별자)
    pub code: String,
    /// 시작일
    pub start_date: NaiveDate,
    /// 종료일
    pub end_date: NaiveDate,
    /// 조회 주기
    pub time_frame: TimeFrame,
}

impl HistoricalQuery {
    /// 원시 문자열 파라미터를 검증하여 요청을 생성합니다.
    ///
    /// 인식할 수 없는 time frame 값은 업스트림으로 전달하지 않고
    /// 거부합니다 (업스트림의 동작이 정의되어 있지 않으므로).
    pub fn parse(
        code: &str,
        start_date: &str,
        end_date: &str,
        time_frame: &str,
        max_range_days: i64,
    ) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::EmptyCode);
        }

        let (start, end) = parse_date_range(start_date, end_date, max_range_days)?;

        let time_frame = time_frame
            .parse::<TimeFrame>()
            .map_err(|_| ValidationError::UnknownTimeFrame(time_frame.to_string()))?;

        Ok(Self {
            code: code.to_string(),
            start_date: start,
            end_date: end,
            time_frame,
        })
    }

    /// 범위 길이 (일).
    pub fn range_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// 날짜 범위 검증: 형식, 순서, 최대 길이.
///
/// 벌크 요청처럼 종목 코드와 독립적으로 날짜만 검증할 때 사용합니다.
pub fn parse_date_range(
    start_date: &str,
    end_date: &str,
    max_range_days: i64,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;

    if end < start {
        return Err(ValidationError::EndBeforeStart { start, end });
    }

    let days = (end - start).num_days();
    if days > max_range_days {
        return Err(ValidationError::RangeTooLarge {
            days,
            max: max_range_days,
        });
    }

    Ok((start, end))
}

/// 날짜 문자열 파싱.
fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| ValidationError::BadDateFormat(s.to_string()))
}

/// 검색 쿼리 검증 (1~50자).
///
/// 앞뒤 공백을 제거한 쿼리를 반환합니다.
pub fn validate_search_query(query: &str) -> Result<&str, ValidationError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::QueryTooLong);
    }
    Ok(query)
}
