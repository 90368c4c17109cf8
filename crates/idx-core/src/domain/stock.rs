//! 종목 정보.

use serde::{Deserialize, Serialize};

/// 검색 응답에서 추출된 종목 정보.
///
/// 업스트림 검색 응답의 quote 레코드 중
/// {id, symbol, name, flag, exchange} 필드만 읽어 생성되는 불변 값입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct StockInfo {
    /// 업스트림이 부여한 종목 식별자 (예: "29049")
    pub code: String,
    /// 티커 (예: "BBRI")
    pub symbol: String,
    /// 종목명 (예: "Bank Rakyat Indonesia")
    pub name: String,
    /// 시장/국가 태그 (예: "Indonesia")
    pub flag: String,
    /// 거래소명 (예: "Jakarta")
    pub exchange: String,
}
