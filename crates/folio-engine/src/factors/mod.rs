//! 종목별 원시 팩터 계산.
//!
//! 세 팩터는 서로 독립적으로 계산됩니다.
//!
//! - **수익/위험**: 연환산 수익률 / 연환산 변동성
//! - **모멘텀**: 1/3/6개월 가격 변화의 가중 합
//! - **펀더멘털**: P/E, P/B, ROE, D/E, EPS 성장률 기준 품질 점수
//!
//! 수익/위험과 모멘텀은 계산할 수 없는 종목을 [`ExclusionReason`]과 함께 제외합니다.
//! 펀더멘털은 종목을 제외하지 않습니다.
//!
//! [`ExclusionReason`]: folio_core::ExclusionReason

pub mod fundamentals;
pub mod momentum;
pub mod return_risk;

pub use fundamentals::{score_fundamentals, FUNDAMENTAL_NEUTRAL_SCORE};
pub use momentum::{compute_momentum, Momentum, MIN_MOMENTUM_POINTS, MOMENTUM_PERIODS};
pub use return_risk::{
    compute_return_risk, prepare_history, ReturnRisk, MIN_RETURN_POINTS, TRADING_DAYS_PER_YEAR,
};
