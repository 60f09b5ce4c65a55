//! 위험 조정 수익률 팩터.
//!
//! 일별 단순 수익률의 평균과 표본 표준편차를 250 거래일 기준으로 연환산합니다.
//!
//! ```text
//! annual_return = (1 + mean)^250 - 1
//! annual_vol    = std * sqrt(250)
//! score         = annual_return / (annual_vol + 1e-6)
//! ```

use folio_core::{ExclusionReason, PriceSeries};
use serde::{Deserialize, Serialize};

/// 연환산 기준 거래일 수.
pub const TRADING_DAYS_PER_YEAR: usize = 250;

/// 수익/위험 계산에 필요한 최소 유효 포인트 수.
pub const MIN_RETURN_POINTS: usize = 2;

/// 변동성 분모 보정값.
const VOL_EPSILON: f64 = 1e-6;

/// 위험 조정 수익률 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnRisk {
    /// 연환산 수익률
    pub annual_return: f64,
    /// 연환산 변동성
    pub annual_vol: f64,
    /// 원시 점수
    pub score: f64,
}

/// 가격 이력을 계산용으로 정리합니다.
///
/// 최근 `lookback_days`개 포인트만 남긴 뒤 결측값을 제거합니다.
/// 유효 포인트가 2개 미만이면 종목을 제외합니다.
pub fn prepare_history(
    series: &PriceSeries,
    lookback_days: usize,
) -> Result<PriceSeries, ExclusionReason> {
    let cleaned = series.tail(lookback_days).without_missing();
    if cleaned.len() < MIN_RETURN_POINTS {
        return Err(ExclusionReason::InsufficientHistory {
            required: MIN_RETURN_POINTS,
            provided: cleaned.len(),
        });
    }
    Ok(cleaned)
}

/// 일별 단순 수익률.
fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// 평균과 표본 표준편차 (ddof = 1).
///
/// 수익률이 하나뿐이면 표준편차는 NaN입니다.
fn mean_and_sample_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, f64::NAN);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// 정리된 종가로 위험 조정 수익률을 계산합니다.
///
/// 수익률/변동성이 유한하지 않거나 변동성이 정확히 0이면 제외합니다.
pub fn compute_return_risk(closes: &[f64]) -> Result<ReturnRisk, ExclusionReason> {
    if closes.len() < MIN_RETURN_POINTS {
        return Err(ExclusionReason::InsufficientHistory {
            required: MIN_RETURN_POINTS,
            provided: closes.len(),
        });
    }

    let returns = daily_returns(closes);
    let (mean, std) = mean_and_sample_std(&returns);

    let annual_return = (1.0 + mean).powi(TRADING_DAYS_PER_YEAR as i32) - 1.0;
    let annual_vol = std * (TRADING_DAYS_PER_YEAR as f64).sqrt();

    if !annual_return.is_finite() || !annual_vol.is_finite() || annual_vol == 0.0 {
        return Err(ExclusionReason::DegenerateReturns);
    }

    Ok(ReturnRisk {
        annual_return,
        annual_vol,
        score: annual_return / (annual_vol + VOL_EPSILON),
    })
}
