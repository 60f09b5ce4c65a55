//! 펀더멘털 품질 점수.
//!
//! | 지표 | 만점 (1.0) | 부분 점수 (0.5) |
//! |---|---|---|
//! | P/E | 5 ≤ PE ≤ 20 | 0 < PE < 5 또는 20 < PE ≤ 30 |
//! | P/B | 0.5 ≤ PB ≤ 3 | 0.2 < PB < 0.5 또는 3 < PB ≤ 5 |
//! | ROE | ROE ≥ 0.15 | 0.08 ≤ ROE < 0.15 |
//! | D/E | DE ≤ 1 | 1 < DE ≤ 2 |
//! | EPS 성장률 | > 0 | - |
//!
//! 점수 = 획득 점수 합 / 적용된 지표 수.
//! P/E, P/B, D/E는 양수일 때만 적용됩니다.

use folio_core::{FundamentalMetric, FundamentalMetrics};

/// 펀더멘털 정보가 없을 때 사용하는 중립 점수.
pub const FUNDAMENTAL_NEUTRAL_SCORE: f64 = 0.5;

/// 지표 하나의 점수. 적용 대상이 아니면 `None`.
fn metric_credit(metric: FundamentalMetric, value: f64) -> Option<f64> {
    let credit = match metric {
        FundamentalMetric::PriceEarnings => {
            if value <= 0.0 {
                return None;
            }
            if (5.0..=20.0).contains(&value) {
                1.0
            } else if value < 5.0 || (20.0 < value && value <= 30.0) {
                0.5
            } else {
                0.0
            }
        }
        FundamentalMetric::PriceBook => {
            if value <= 0.0 {
                return None;
            }
            if (0.5..=3.0).contains(&value) {
                1.0
            } else if (0.2 < value && value < 0.5) || (3.0 < value && value <= 5.0) {
                0.5
            } else {
                0.0
            }
        }
        FundamentalMetric::ReturnOnEquity => {
            if value >= 0.15 {
                1.0
            } else if value >= 0.08 {
                0.5
            } else {
                0.0
            }
        }
        FundamentalMetric::DebtEquity => {
            if value <= 0.0 {
                return None;
            }
            if value <= 1.0 {
                1.0
            } else if value <= 2.0 {
                0.5
            } else {
                0.0
            }
        }
        FundamentalMetric::EpsGrowth => {
            if value > 0.0 {
                1.0
            } else {
                0.0
            }
        }
    };
    Some(credit)
}

/// 지표 맵으로 0~1 품질 점수를 계산합니다.
///
/// 적용 가능한 지표가 하나도 없으면 `None`을 반환하며,
/// 이 경우 병합 단계에서 중립 점수가 사용됩니다.
pub fn score_fundamentals(metrics: &FundamentalMetrics) -> Option<f64> {
    let credits: Vec<f64> = FundamentalMetric::ALL
        .iter()
        .filter_map(|metric| {
            metrics
                .get(*metric)
                .and_then(|value| metric_credit(*metric, value))
        })
        .collect();

    if credits.is_empty() {
        return None;
    }
    Some(credits.iter().sum::<f64>() / credits.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pe_and_roe_only() {
        let metrics = FundamentalMetrics::new().with("pe", 12.0).with("roe", 0.18);
        assert_eq!(score_fundamentals(&metrics), Some(1.0));
    }

    #[test]
    fn test_threshold_boundaries() {
        let cases = [
            ("pe", 5.0, 1.0),
            ("pe", 20.0, 1.0),
            ("pe", 4.9, 0.5),
            ("pe", 30.0, 0.5),
            ("pe", 31.0, 0.0),
            ("pb", 0.5, 1.0),
            ("pb", 3.0, 1.0),
            ("pb", 0.2, 0.0),
            ("pb", 0.3, 0.5),
            ("pb", 5.0, 0.5),
            ("pb", 5.1, 0.0),
            ("roe", 0.15, 1.0),
            ("roe", 0.08, 0.5),
            ("roe", -0.2, 0.0),
            ("de_ratio", 1.0, 1.0),
            ("de", 2.0, 0.5),
            ("de", 2.5, 0.0),
            ("eps_growth", 0.05, 1.0),
            ("eps_g", -0.05, 0.0),
        ];

        for (key, value, expected) in cases {
            let metrics = FundamentalMetrics::new().with(key, value);
            assert_eq!(
                score_fundamentals(&metrics),
                Some(expected),
                "{} = {}",
                key,
                value
            );
        }
    }

    #[test]
    fn test_negative_ratios_are_not_applicable() {
        let metrics = FundamentalMetrics::new().with("pe", -8.0).with("de", -1.0);
        assert_eq!(score_fundamentals(&metrics), None);

        let metrics = FundamentalMetrics::new().with("pe", -8.0).with("roe", 0.1);
        assert_eq!(score_fundamentals(&metrics), Some(0.5));
    }

    #[test]
    fn test_mixed_average() {
        let metrics = FundamentalMetrics::new()
            .with("PE", 25.0) // 0.5
            .with("PB", 6.0) // 0.0
            .with("ROE", 0.2) // 1.0
            .with("DE_RATIO", 1.5) // 0.5
            .with("EPS_GROWTH", 0.1); // 1.0
        assert_eq!(score_fundamentals(&metrics), Some(0.6));
    }

    #[test]
    fn test_no_recognised_metrics() {
        let metrics = FundamentalMetrics::new().with("market_cap", 1e9);
        assert_eq!(score_fundamentals(&metrics), None);
        assert_eq!(score_fundamentals(&FundamentalMetrics::new()), None);
    }
}
