//! 배분 엔진 속성 기반 테스트.
//!
//! 임의의 점수, 가격, 자본, 최대 비중에 대해 배분 불변 조건을 검증합니다.

use folio_core::{CapMode, FactorRecord, ScoredRecord};
use folio_engine::allocation::{apply_cap, score_weights};
use folio_engine::AllocationEngine;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// Generators
// =============================================================================

fn scored(symbol: String, total_score: f64) -> ScoredRecord {
    ScoredRecord {
        factors: FactorRecord {
            symbol,
            annual_return: 0.1,
            annual_vol: 0.2,
            risk_score_raw: 0.5,
            mom_1m: Some(0.01),
            mom_3m: None,
            mom_6m: None,
            mom_score_raw: 0.005,
            fund_score_raw: 0.5,
        },
        risk_score: 0.5,
        mom_score: 0.5,
        fund_score: 0.5,
        total_score,
    }
}

fn arb_cap_mode() -> impl Strategy<Value = CapMode> {
    prop_oneof![Just(CapMode::ClipRenormalize), Just(CapMode::WaterFill)]
}

/// (점수, 가격) 목록. 가격이 None이면 가격 없음.
fn arb_candidates() -> impl Strategy<Value = Vec<(f64, Option<f64>)>> {
    proptest::collection::vec(
        (
            -0.2f64..1.0,
            proptest::option::weighted(0.85, 0.5f64..5000.0),
        ),
        1..15,
    )
}

fn tolerance() -> Decimal {
    dec!(0.000000000001)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// 점수 비중과 최대 비중 적용 후 합계는 항상 1.
    #[test]
    fn prop_weights_sum_to_one(
        scores in proptest::collection::vec(-1.0f64..1.0, 1..20),
        max_weight_pct in 1u32..=100,
        mode in arb_cap_mode(),
    ) {
        let max_weight = Decimal::from(max_weight_pct) / dec!(100);
        let raw = score_weights(&scores);
        let raw_sum: Decimal = raw.iter().sum();
        prop_assert!((raw_sum - Decimal::ONE).abs() < tolerance());

        let capped = apply_cap(&raw, max_weight, mode);
        let capped_sum: Decimal = capped.iter().sum();
        prop_assert!((capped_sum - Decimal::ONE).abs() < tolerance());
        prop_assert!(capped.iter().all(|w| *w >= Decimal::ZERO));

        // 상한을 지킬 수 있으면 water-fill은 상한을 넘지 않음
        if mode == CapMode::WaterFill && max_weight * Decimal::from(scores.len() as u64) >= Decimal::ONE {
            prop_assert!(capped.iter().all(|w| *w <= max_weight + tolerance()));
        }
    }

    /// 배분 결과는 수량/금액/현금 불변 조건을 만족.
    #[test]
    fn prop_allocation_invariants(
        candidates in arb_candidates(),
        capital_units in 1u64..10_000_000,
        max_stocks in 1usize..12,
        max_weight_pct in 5u32..=100,
        mode in arb_cap_mode(),
    ) {
        let capital = Decimal::from(capital_units);
        let max_weight = Decimal::from(max_weight_pct) / dec!(100);

        let ranked: Vec<ScoredRecord> = candidates
            .iter()
            .enumerate()
            .map(|(i, (score, _))| scored(format!("S{}", i), *score))
            .collect();
        let price_of = |symbol: &str| -> Option<f64> {
            let index: usize = symbol[1..].parse().ok()?;
            candidates.get(index).and_then(|(_, price)| *price)
        };

        let engine = AllocationEngine::new(max_stocks, max_weight, mode);
        let top_priced = candidates
            .iter()
            .take(max_stocks)
            .filter(|(_, price)| price.is_some())
            .count();

        match engine.allocate(capital, &ranked, price_of) {
            Ok(allocation) => {
                prop_assert_eq!(allocation.rows.len(), top_priced);

                let weight_sum: Decimal = allocation.rows.iter().map(|r| r.weight_target).sum();
                prop_assert!((weight_sum - Decimal::ONE).abs() < tolerance());

                for row in &allocation.rows {
                    prop_assert!(row.market_value <= row.capital_alloc);
                    prop_assert_eq!(row.market_value, Decimal::from(row.shares) * row.last_price);
                }
                prop_assert!(allocation.cash_left >= Decimal::ZERO);

                for pair in allocation.rows.windows(2) {
                    prop_assert!(pair[0].weight_real >= pair[1].weight_real);
                }
            }
            Err(_) => prop_assert_eq!(top_priced, 0),
        }
    }
}
