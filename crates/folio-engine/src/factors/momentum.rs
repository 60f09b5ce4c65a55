//! 가격 모멘텀 팩터.
//!
//! 최근 종가와 `k`봉 전 종가의 비율로 1/3/6개월 모멘텀을 구하고
//! 0.5 / 0.3 / 0.2로 가중 합산합니다.
//! 계산할 수 없는 구간은 0으로 대체하므로 이력이 짧으면 점수가 0 쪽으로 치우칩니다.

use folio_core::ExclusionReason;
use serde::{Deserialize, Serialize};

/// 모멘텀 계산에 필요한 최소 포인트 수.
pub const MIN_MOMENTUM_POINTS: usize = 22;

/// (봉 수, 가중치): 1개월, 3개월, 6개월.
pub const MOMENTUM_PERIODS: [(usize, f64); 3] = [(21, 0.5), (63, 0.3), (126, 0.2)];

/// 모멘텀 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    pub mom_1m: Option<f64>,
    pub mom_3m: Option<f64>,
    pub mom_6m: Option<f64>,
    /// 가중 합산 원시 점수
    pub score: f64,
}

/// 마지막 종가 대비 정확히 `bars`봉 전 종가의 변화율.
///
/// 이력이 `bars + 1`개보다 짧거나 과거 가격이 0이면 `None`입니다.
fn period_return(closes: &[f64], bars: usize) -> Option<f64> {
    let last_index = closes.len().checked_sub(1)?;
    let past_index = last_index.checked_sub(bars)?;
    let past = closes[past_index];
    if past == 0.0 {
        return None;
    }
    let value = closes[last_index] / past - 1.0;
    value.is_finite().then_some(value)
}

/// 정리된 종가로 모멘텀을 계산합니다.
pub fn compute_momentum(closes: &[f64]) -> Result<Momentum, ExclusionReason> {
    if closes.len() < MIN_MOMENTUM_POINTS {
        return Err(ExclusionReason::InsufficientMomentumHistory {
            required: MIN_MOMENTUM_POINTS,
            provided: closes.len(),
        });
    }

    let [one, three, six] = MOMENTUM_PERIODS.map(|(bars, _)| period_return(closes, bars));
    if one.is_none() && three.is_none() && six.is_none() {
        return Err(ExclusionReason::MomentumUndefined);
    }

    let score: f64 = [one, three, six]
        .iter()
        .zip(MOMENTUM_PERIODS.iter())
        .map(|(value, (_, weight))| weight * value.unwrap_or(0.0))
        .sum();

    Ok(Momentum {
        mom_1m: one,
        mom_3m: three,
        mom_6m: six,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_22_points() {
        let closes = vec![10.0; 21];
        assert_eq!(
            compute_momentum(&closes),
            Err(ExclusionReason::InsufficientMomentumHistory {
                required: 22,
                provided: 21
            })
        );
    }

    #[test]
    fn test_uses_price_exactly_k_bars_back() {
        // 22개: index 0이 21봉 전
        let mut closes = vec![20.0; 22];
        closes[0] = 10.0;
        closes[21] = 15.0;

        let mom = compute_momentum(&closes).unwrap();
        assert_eq!(mom.mom_1m, Some(0.5));
        assert_eq!(mom.mom_3m, None);
        assert_eq!(mom.mom_6m, None);
        assert!((mom.score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_full_history_blend() {
        let mut closes = vec![100.0; 127];
        closes[0] = 50.0; // 126봉 전
        closes[126 - 63] = 80.0; // 63봉 전
        closes[126 - 21] = 90.0; // 21봉 전
        closes[126] = 100.0;

        let mom = compute_momentum(&closes).unwrap();
        let expected = 0.5 * (100.0 / 90.0 - 1.0) + 0.3 * (100.0 / 80.0 - 1.0) + 0.2 * 1.0;
        assert!((mom.score - expected).abs() < 1e-12);
        assert_eq!(mom.mom_6m, Some(1.0));
    }

    #[test]
    fn test_zero_past_price_is_undefined() {
        let mut closes = vec![10.0; 22];
        closes[0] = 0.0;
        assert_eq!(compute_momentum(&closes), Err(ExclusionReason::MomentumUndefined));
    }
}
