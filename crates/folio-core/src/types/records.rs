//! 팩터 레코드와 종목 제외 사유.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 팩터 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// 위험 조정 수익률
    ReturnRisk,
    /// 가격 모멘텀
    Momentum,
    /// 펀더멘털 품질
    Fundamentals,
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorKind::ReturnRisk => write!(f, "return_risk"),
            FactorKind::Momentum => write!(f, "momentum"),
            FactorKind::Fundamentals => write!(f, "fundamentals"),
        }
    }
}

/// 종목별 원시 팩터 값.
///
/// 수익/위험과 모멘텀을 모두 통과한 종목만 포함됩니다.
/// 펀더멘털이 없으면 중립값 0.5가 들어갑니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRecord {
    pub symbol: String,
    /// 연환산 수익률 (0.2 = 20%)
    pub annual_return: f64,
    /// 연환산 변동성
    pub annual_vol: f64,
    /// annual_return / (annual_vol + 1e-6)
    pub risk_score_raw: f64,
    /// 21거래일 모멘텀
    pub mom_1m: Option<f64>,
    /// 63거래일 모멘텀
    pub mom_3m: Option<f64>,
    /// 126거래일 모멘텀
    pub mom_6m: Option<f64>,
    /// 0.5·1M + 0.3·3M + 0.2·6M (없는 항목은 0)
    pub mom_score_raw: f64,
    /// 펀더멘털 품질 점수 (0~1)
    pub fund_score_raw: f64,
}

impl FactorRecord {
    /// 연환산 수익률 (%).
    pub fn annual_return_pct(&self) -> f64 {
        self.annual_return * 100.0
    }

    /// 연환산 변동성 (%).
    pub fn annual_vol_pct(&self) -> f64 {
        self.annual_vol * 100.0
    }
}

/// 정규화 점수와 종합 점수가 추가된 팩터 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub factors: FactorRecord,
    /// 정규화된 위험 조정 수익률 점수 (0~1)
    pub risk_score: f64,
    /// 정규화된 모멘텀 점수 (0~1)
    pub mom_score: f64,
    /// 정규화된 펀더멘털 점수 (0~1)
    pub fund_score: f64,
    /// 가중 합산 점수 (0~1)
    pub total_score: f64,
}

impl ScoredRecord {
    /// 종목 심볼.
    pub fn symbol(&self) -> &str {
        &self.factors.symbol
    }
}

/// 종목이 파이프라인에서 빠진 사유.
///
/// 빌드 전체를 중단시키지 않는 종목 단위 사유입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// 가격 조회 실패 (네트워크/제공자 오류)
    FetchFailed { message: String },
    /// 제공자에 가격 데이터 없음
    NoData,
    /// 수익/위험 계산에 필요한 포인트 부족
    InsufficientHistory { required: usize, provided: usize },
    /// 수익률/변동성이 유한하지 않거나 변동성이 0
    DegenerateReturns,
    /// 모멘텀 계산에 필요한 포인트 부족
    InsufficientMomentumHistory { required: usize, provided: usize },
    /// 세 구간 모멘텀 모두 계산 불가
    MomentumUndefined,
    /// 모멘텀은 있으나 수익/위험 팩터에 없음
    NotInReturnRisk,
    /// 수익/위험은 있으나 모멘텀 팩터에 없음
    NotInMomentum,
    /// 상위 선정되었으나 유효한 최종 가격 없음
    NoUsablePrice,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::FetchFailed { message } => write!(f, "가격 조회 실패: {}", message),
            ExclusionReason::NoData => write!(f, "가격 데이터 없음"),
            ExclusionReason::InsufficientHistory { required, provided } => {
                write!(f, "가격 이력 부족: 필요 {}개, 제공 {}개", required, provided)
            }
            ExclusionReason::DegenerateReturns => write!(f, "수익률/변동성 계산 불가"),
            ExclusionReason::InsufficientMomentumHistory { required, provided } => {
                write!(f, "모멘텀 이력 부족: 필요 {}개, 제공 {}개", required, provided)
            }
            ExclusionReason::MomentumUndefined => write!(f, "모멘텀 계산 불가"),
            ExclusionReason::NotInReturnRisk => write!(f, "수익/위험 팩터 없음"),
            ExclusionReason::NotInMomentum => write!(f, "모멘텀 팩터 없음"),
            ExclusionReason::NoUsablePrice => write!(f, "유효한 최종 가격 없음"),
        }
    }
}

/// 파이프라인 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// 가격 이력 로드
    PriceHistory,
    /// 위험 조정 수익률 계산
    ReturnRisk,
    /// 모멘텀 계산
    Momentum,
    /// 팩터 병합 (inner join)
    Merge,
    /// 배분
    Allocation,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::PriceHistory => write!(f, "price_history"),
            PipelineStage::ReturnRisk => write!(f, "return_risk"),
            PipelineStage::Momentum => write!(f, "momentum"),
            PipelineStage::Merge => write!(f, "merge"),
            PipelineStage::Allocation => write!(f, "allocation"),
        }
    }
}

/// 제외된 종목과 사유.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub symbol: String,
    /// 제외된 단계
    pub stage: PipelineStage,
    pub reason: ExclusionReason,
}

impl Exclusion {
    /// 새 제외 기록 생성.
    pub fn new(symbol: impl Into<String>, stage: PipelineStage, reason: ExclusionReason) -> Self {
        Self {
            symbol: symbol.into(),
            stage,
            reason,
        }
    }
}
