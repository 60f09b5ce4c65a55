//! 종합 점수 계산과 순위.

use std::cmp::Ordering;

use folio_core::{FactorRecord, FactorWeights, ScoredRecord};

use crate::normalize::min_max_normalize;

/// 팩터별 정규화 후 가중 합으로 종합 점수를 매기고 내림차순 정렬합니다.
///
/// 동점은 입력 순서를 유지합니다.
pub fn rank(records: Vec<FactorRecord>, weights: &FactorWeights) -> Vec<ScoredRecord> {
    let column = |f: fn(&FactorRecord) -> f64| -> Vec<f64> {
        min_max_normalize(&records.iter().map(f).collect::<Vec<_>>())
    };
    let risk = column(|r| r.risk_score_raw);
    let momentum = column(|r| r.mom_score_raw);
    let fundamentals = column(|r| r.fund_score_raw);

    let mut scored: Vec<ScoredRecord> = records
        .into_iter()
        .enumerate()
        .map(|(i, factors)| {
            let total_score = weights.risk * risk[i]
                + weights.fundamentals * fundamentals[i]
                + weights.momentum * momentum[i];
            ScoredRecord {
                factors,
                risk_score: risk[i],
                mom_score: momentum[i],
                fund_score: fundamentals[i],
                total_score,
            }
        })
        .collect();

    sort_by_total_score(&mut scored);
    scored
}

/// 종합 점수 내림차순 안정 정렬.
pub fn sort_by_total_score(scored: &mut [ScoredRecord]) {
    scored.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(symbol: &str, risk: f64, mom: f64, fund: f64) -> FactorRecord {
        FactorRecord {
            symbol: symbol.to_string(),
            annual_return: 0.1,
            annual_vol: 0.2,
            risk_score_raw: risk,
            mom_1m: Some(mom),
            mom_3m: None,
            mom_6m: None,
            mom_score_raw: mom,
            fund_score_raw: fund,
        }
    }

    #[test]
    fn test_weighted_total_and_order() {
        let records = vec![
            record("A", 0.0, 0.0, 0.0),
            record("B", 2.0, 0.1, 1.0),
            record("C", 1.0, 0.2, 0.5),
        ];
        let ranked = rank(records, &FactorWeights::default());

        let symbols: Vec<&str> = ranked.iter().map(|r| r.symbol()).collect();
        assert_eq!(symbols, vec!["B", "C", "A"]);

        // B: 0.2*1 + 0.5*1 + 0.3*0.5
        assert!((ranked[0].total_score - 0.85).abs() < 1e-12);
        assert_eq!(ranked[2].total_score, 0.0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            record("X", 1.0, 1.0, 0.5),
            record("Y", 1.0, 1.0, 0.5),
            record("Z", 1.0, 1.0, 0.5),
        ];
        let ranked = rank(records, &FactorWeights::default());
        let symbols: Vec<&str> = ranked.iter().map(|r| r.symbol()).collect();
        assert_eq!(symbols, vec!["X", "Y", "Z"]);
        assert!(ranked.iter().all(|r| (r.total_score - 0.5).abs() < 1e-12));
    }

    proptest! {
        #[test]
        fn prop_total_score_is_convex(
            raws in proptest::collection::vec((-50.0f64..50.0, -1.0f64..3.0, 0.0f64..1.0), 1..20)
        ) {
            let records: Vec<FactorRecord> = raws
                .iter()
                .enumerate()
                .map(|(i, (risk, mom, fund))| record(&format!("S{}", i), *risk, *mom, *fund))
                .collect();

            let ranked = rank(records, &FactorWeights::default());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].total_score >= pair[1].total_score);
            }
            for r in &ranked {
                prop_assert!(r.total_score >= 0.0 && r.total_score <= 1.0 + 1e-12);
            }
        }
    }
}
