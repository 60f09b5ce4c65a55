//! 포트폴리오 빌드 에러 타입.
//!
//! 빌드 호출 하나를 중단시키는 치명적 실패만 정의합니다.
//! 종목 단위의 제외 사유는 [`crate::types::ExclusionReason`]으로 기록됩니다.

use thiserror::Error;

use crate::types::FactorKind;

/// 포트폴리오 빌드 에러.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// 유니버스 전체에 사용 가능한 가격 이력이 없음
    #[error("데이터 없음: 유니버스의 어떤 종목에도 사용 가능한 가격 이력이 없습니다")]
    DataUnavailable,

    /// 팩터 계산 후 남은 종목이 없음
    #[error("팩터 계산 결과 없음: {factor} 단계를 통과한 종목이 없습니다")]
    FactorComputationEmpty { factor: FactorKind },

    /// 수익/위험 팩터와 모멘텀 팩터의 종목 집합이 겹치지 않음
    #[error("팩터 집합 불일치: 수익/위험과 모멘텀 모두를 통과한 종목이 없습니다")]
    FactorSetDisjoint,

    /// 선택된 종목 중 유효한 최종 가격을 가진 종목이 없음
    #[error("가격 없음: 선택된 종목 중 유효한 최종 가격을 가진 종목이 없습니다")]
    NoPricedSelection,

    /// 배분 행이 하나도 생성되지 않음
    #[error("배분 실패: 배분 행을 하나도 만들지 못했습니다")]
    ZeroAllocation,

    /// 배분 금액/수량이 Decimal 범위를 벗어남
    #[error("배분 계산 범위 초과: {symbol}")]
    AllocationOverflow { symbol: String },

    /// 호출 파라미터 오류
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 포트폴리오 작업을 위한 Result 타입.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

impl PortfolioError {
    /// 호출자의 입력이 원인인 에러인지 확인합니다.
    ///
    /// 데이터 상태가 원인인 에러는 같은 입력으로 재시도해도 결과가 바뀌지 않을 수 있습니다.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PortfolioError::InvalidParameter(_) | PortfolioError::Config(_)
        )
    }
}

impl From<config::ConfigError> for PortfolioError {
    fn from(err: config::ConfigError) -> Self {
        PortfolioError::Config(err.to_string())
    }
}
