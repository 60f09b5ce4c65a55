//! 배분 결과 타입.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Exclusion, Price, ScoredRecord, Weight};

/// 종목 하나의 배분 결과.
///
/// 불변 조건:
/// - `shares = floor(capital_alloc / last_price)`
/// - `market_value = shares * last_price <= capital_alloc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub symbol: String,
    /// 목표 비중 (가격 있는 종목 기준 합계 1)
    pub weight_target: Weight,
    /// 목표 비중에 따른 배정 자본
    pub capital_alloc: Decimal,
    /// 최종 종가
    pub last_price: Price,
    /// 매수 수량 (1주 단위)
    pub shares: u128,
    /// 평가 금액
    pub market_value: Decimal,
    /// 실제 비중 (평가 금액 / 전체 평가 금액)
    pub weight_real: Weight,
}

/// 포트폴리오 빌드 결과.
///
/// 배분 테이블과 함께 팩터 테이블도 반환합니다.
/// 호출 간에 상태를 남기지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioBuild {
    /// 배분 테이블 (`weight_real` 내림차순)
    pub allocations: Vec<AllocationRow>,
    /// 남은 현금
    pub cash_left: Decimal,
    /// 팩터 테이블 (`total_score` 내림차순)
    pub factor_table: Vec<ScoredRecord>,
    /// 파이프라인에서 제외된 종목
    pub exclusions: Vec<Exclusion>,
}

impl PortfolioBuild {
    /// 주식 평가 금액 합계.
    pub fn total_market_value(&self) -> Decimal {
        self.allocations.iter().map(|r| r.market_value).sum()
    }

    /// 주식 + 현금 합계.
    pub fn total_value(&self) -> Decimal {
        self.total_market_value() + self.cash_left
    }

    /// 실제로 1주 이상 매수한 종목 수.
    pub fn held_positions(&self) -> usize {
        self.allocations.iter().filter(|r| r.shares > 0).count()
    }

    /// 심볼로 배분 행 조회.
    pub fn allocation(&self, symbol: &str) -> Option<&AllocationRow> {
        self.allocations.iter().find(|r| r.symbol == symbol)
    }
}
