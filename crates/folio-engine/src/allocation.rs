//! 배분 엔진.
//!
//! 상위 종목의 종합 점수를 목표 비중으로 바꾸고, 종목당 최대 비중을 적용한 뒤
//! 최종 가격과 자본으로 1주 단위 수량을 계산합니다.
//!
//! # 절차
//!
//! 1. 종합 점수 상위 `max_stocks` 종목 선택
//! 2. 음수 점수를 0으로 자르고 합계 1로 정규화 (합계가 0이면 동일 비중)
//! 3. 최대 비중 적용 ([`CapMode`])
//! 4. 유효한 최종 가격이 있는 종목만 남기고 다시 합계 1로 정규화
//! 5. `shares = floor(capital * weight / price)`
//!
//! 비중과 금액은 모두 `Decimal`로 계산합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use folio_core::{
    decimal_from_f64, AllocationRow, CapMode, Exclusion, ExclusionReason, PipelineStage,
    PortfolioError, PortfolioResult, Price, ScoredRecord, Weight,
};

// =============================================================================
// 비중 계산
// =============================================================================

/// `n`개 종목 동일 비중.
pub fn equal_weights(n: usize) -> Vec<Weight> {
    if n == 0 {
        return Vec::new();
    }
    let weight = Decimal::ONE / Decimal::from(n as u64);
    vec![weight; n]
}

/// 합계 1로 정규화합니다. 합계가 0 이하이면 `None`.
pub fn normalize_weights(weights: &[Weight]) -> Option<Vec<Weight>> {
    let total: Decimal = weights.iter().sum();
    if total <= Decimal::ZERO {
        return None;
    }
    Some(weights.iter().map(|w| w / total).collect())
}

/// 점수를 초기 비중으로 변환합니다.
///
/// 음수와 유한하지 않은 점수는 0으로 처리하며, 모두 0이면 동일 비중입니다.
pub fn score_weights(scores: &[f64]) -> Vec<Weight> {
    let clipped: Vec<Weight> = scores
        .iter()
        .map(|s| {
            decimal_from_f64(*s)
                .unwrap_or(Decimal::ZERO)
                .max(Decimal::ZERO)
        })
        .collect();
    normalize_weights(&clipped).unwrap_or_else(|| equal_weights(scores.len()))
}

/// 상한으로 자른 뒤 재정규화합니다.
///
/// 여러 종목이 동시에 잘리면 결과 비중이 상한을 넘을 수 있습니다.
pub fn clip_and_renormalize(weights: &[Weight], max_weight: Weight) -> Vec<Weight> {
    let clipped: Vec<Weight> = weights
        .iter()
        .map(|w| (*w).max(Decimal::ZERO).min(max_weight))
        .collect();
    normalize_weights(&clipped).unwrap_or_else(|| equal_weights(weights.len()))
}

/// 상한 초과분을 상한 미만 종목에 비례 재분배합니다.
///
/// 상한에 걸린 종목을 고정하고 나머지를 다시 나누는 과정을 반복합니다.
/// `n * max_weight < 1`이면 상한을 지킬 수 없으므로 동일 비중을 반환합니다.
pub fn water_fill(weights: &[Weight], max_weight: Weight) -> Vec<Weight> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    if max_weight * Decimal::from(n as u64) < Decimal::ONE {
        return equal_weights(n);
    }

    let base: Vec<Weight> = weights.iter().map(|w| (*w).max(Decimal::ZERO)).collect();
    let mut result = vec![Decimal::ZERO; n];
    let mut capped = vec![false; n];

    loop {
        let free: Vec<usize> = (0..n).filter(|i| !capped[*i]).collect();
        if free.is_empty() {
            break;
        }

        let fixed_total: Decimal = (0..n).filter(|i| capped[*i]).map(|i| result[i]).sum();
        let remaining = Decimal::ONE - fixed_total;
        let free_total: Decimal = free.iter().map(|i| base[*i]).sum();

        // 남은 종목의 점수가 모두 0이면 남은 비중을 균등 분배
        let share = |i: usize| -> Decimal {
            if free_total > Decimal::ZERO {
                remaining * base[i] / free_total
            } else {
                remaining / Decimal::from(free.len() as u64)
            }
        };

        let mut newly_capped = false;
        for &i in &free {
            if share(i) > max_weight {
                result[i] = max_weight;
                capped[i] = true;
                newly_capped = true;
            }
        }

        if !newly_capped {
            for &i in &free {
                result[i] = share(i);
            }
            break;
        }
    }

    result
}

/// 종목당 최대 비중을 적용합니다.
pub fn apply_cap(weights: &[Weight], max_weight: Weight, mode: CapMode) -> Vec<Weight> {
    match mode {
        CapMode::ClipRenormalize => clip_and_renormalize(weights, max_weight),
        CapMode::WaterFill => water_fill(weights, max_weight),
    }
}

// =============================================================================
// 수량 계산
// =============================================================================

/// 배분 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// 배분 행 (`weight_real` 내림차순)
    pub rows: Vec<AllocationRow>,
    /// 남은 현금
    pub cash_left: Decimal,
    /// 가격이 없어 빠진 종목
    pub exclusions: Vec<Exclusion>,
}

/// 배분 엔진.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    max_stocks: usize,
    max_weight: Weight,
    cap_mode: CapMode,
}

impl AllocationEngine {
    /// 새 배분 엔진 생성.
    pub fn new(max_stocks: usize, max_weight: Weight, cap_mode: CapMode) -> Self {
        Self {
            max_stocks,
            max_weight,
            cap_mode,
        }
    }

    /// 상위 종목의 목표 비중 (가격 확인 전).
    pub fn target_weights(&self, top: &[ScoredRecord]) -> Vec<Weight> {
        let scores: Vec<f64> = top.iter().map(|r| r.total_score).collect();
        let raw = score_weights(&scores);
        apply_cap(&raw, self.max_weight, self.cap_mode)
    }

    /// 순위가 매겨진 팩터 테이블로 배분합니다.
    ///
    /// `last_price`는 종목의 최종 종가를 돌려줍니다.
    /// 유한한 양수가 아니면 해당 종목은 제외됩니다.
    pub fn allocate<F>(
        &self,
        capital: Decimal,
        ranked: &[ScoredRecord],
        last_price: F,
    ) -> PortfolioResult<Allocation>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let top = &ranked[..ranked.len().min(self.max_stocks)];
        let weights = self.target_weights(top);

        let mut exclusions = Vec::new();
        let mut priced: Vec<(&str, Weight, Price)> = Vec::with_capacity(top.len());
        for (record, weight) in top.iter().zip(weights) {
            let symbol = record.symbol();
            match last_price(symbol).and_then(usable_price) {
                Some(price) => priced.push((symbol, weight, price)),
                None => {
                    warn!(symbol = symbol, "유효한 최종 가격 없음, 배분에서 제외");
                    exclusions.push(Exclusion::new(
                        symbol,
                        PipelineStage::Allocation,
                        ExclusionReason::NoUsablePrice,
                    ));
                }
            }
        }

        if priced.is_empty() {
            return Err(PortfolioError::NoPricedSelection);
        }

        let subset: Vec<Weight> = priced.iter().map(|(_, w, _)| *w).collect();
        let final_weights =
            normalize_weights(&subset).unwrap_or_else(|| equal_weights(subset.len()));

        let mut rows: Vec<AllocationRow> = priced
            .iter()
            .zip(final_weights)
            .map(|((symbol, _, price), weight)| lot_row(symbol, weight, *price, capital))
            .collect::<PortfolioResult<_>>()?;

        if rows.is_empty() {
            return Err(PortfolioError::ZeroAllocation);
        }

        let total_market_value: Decimal = rows.iter().map(|r| r.market_value).sum();
        for row in &mut rows {
            row.weight_real = if total_market_value > Decimal::ZERO {
                row.market_value / total_market_value
            } else {
                Decimal::ZERO
            };
        }
        rows.sort_by(|a, b| b.weight_real.cmp(&a.weight_real));

        let cash_left = capital - total_market_value;
        debug!(
            rows = rows.len(),
            total_market_value = %total_market_value,
            cash_left = %cash_left,
            "배분 완료"
        );

        Ok(Allocation {
            rows,
            cash_left,
            exclusions,
        })
    }
}

/// 유한한 양수 가격만 사용합니다.
fn usable_price(price: f64) -> Option<Price> {
    decimal_from_f64(price).filter(|p| *p > Decimal::ZERO)
}

/// 목표 비중과 가격으로 1주 단위 배분 행을 만듭니다.
///
/// 금액이나 수량이 `Decimal` 범위를 벗어나면 0주로 처리하지 않고 에러를 반환합니다.
fn lot_row(
    symbol: &str,
    weight: Weight,
    price: Price,
    capital: Decimal,
) -> PortfolioResult<AllocationRow> {
    let overflow = || PortfolioError::AllocationOverflow {
        symbol: symbol.to_string(),
    };

    let capital_alloc = capital.checked_mul(weight).ok_or_else(overflow)?;
    let lots = capital_alloc.checked_div(price).ok_or_else(overflow)?.floor();
    let shares = lots.to_u128().ok_or_else(overflow)?;
    let market_value = lots.checked_mul(price).ok_or_else(overflow)?;

    Ok(AllocationRow {
        symbol: symbol.to_string(),
        weight_target: weight,
        capital_alloc,
        last_price: price,
        shares,
        market_value,
        weight_real: Decimal::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::FactorRecord;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn scored(symbol: &str, total: f64) -> ScoredRecord {
        ScoredRecord {
            factors: FactorRecord {
                symbol: symbol.to_string(),
                annual_return: 0.0,
                annual_vol: 0.1,
                risk_score_raw: 0.0,
                mom_1m: None,
                mom_3m: None,
                mom_6m: None,
                mom_score_raw: 0.0,
                fund_score_raw: 0.5,
            },
            risk_score: 0.5,
            mom_score: 0.5,
            fund_score: 0.5,
            total_score: total,
        }
    }

    fn sum(weights: &[Weight]) -> Decimal {
        weights.iter().sum()
    }

    #[test]
    fn test_score_weights_clip_negative() {
        let weights = score_weights(&[3.0, -1.0, 1.0]);
        assert_eq!(weights, vec![dec!(0.75), dec!(0), dec!(0.25)]);

        let weights = score_weights(&[0.0, -2.0]);
        assert_eq!(weights, vec![dec!(0.5), dec!(0.5)]);
    }

    #[test]
    fn test_clip_renormalize_can_exceed_cap() {
        // 0.6, 0.3, 0.1 → 0.2, 0.2, 0.1 → 0.4, 0.4, 0.2
        let weights = clip_and_renormalize(&[dec!(0.6), dec!(0.3), dec!(0.1)], dec!(0.2));
        assert_eq!(weights, vec![dec!(0.4), dec!(0.4), dec!(0.2)]);
    }

    #[test]
    fn test_water_fill_respects_cap() {
        let weights = water_fill(
            &[dec!(0.5), dec!(0.2), dec!(0.1), dec!(0.1), dec!(0.1)],
            dec!(0.3),
        );
        assert_eq!(weights[0], dec!(0.3));
        assert!(weights.iter().all(|w| *w <= dec!(0.3)));
        assert!((sum(&weights) - Decimal::ONE).abs() < dec!(0.000000001));
        // 나머지 0.7은 0.2:0.1:0.1:0.1로 분배
        assert!((weights[1] - dec!(0.28)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_water_fill_infeasible_cap_uses_equal_weights() {
        let weights = water_fill(&[dec!(0.9), dec!(0.1)], dec!(0.2));
        assert_eq!(weights, vec![dec!(0.5), dec!(0.5)]);
    }

    #[test]
    fn test_single_symbol_full_capital() {
        let engine = AllocationEngine::new(8, dec!(1), CapMode::ClipRenormalize);
        let ranked = vec![scored("COMI", 0.9)];

        let allocation = engine
            .allocate(dec!(100000), &ranked, |_| Some(500.0))
            .unwrap();

        let row = &allocation.rows[0];
        assert_eq!(row.weight_target, dec!(1));
        assert_eq!(row.shares, 200);
        assert_eq!(row.market_value, dec!(100000));
        assert_eq!(row.weight_real, dec!(1));
        assert_eq!(allocation.cash_left, dec!(0));
    }

    #[test]
    fn test_unpriced_symbols_are_dropped_and_renormalized() {
        let engine = AllocationEngine::new(3, dec!(1), CapMode::ClipRenormalize);
        let ranked = vec![scored("A", 0.6), scored("B", 0.3), scored("C", 0.1)];
        let prices: HashMap<&str, f64> = [("A", 10.0), ("B", f64::NAN), ("C", 0.0)]
            .into_iter()
            .collect();

        let allocation = engine
            .allocate(dec!(1000), &ranked, |s| prices.get(s).copied())
            .unwrap();

        assert_eq!(allocation.rows.len(), 1);
        assert_eq!(allocation.rows[0].weight_target, dec!(1));
        assert_eq!(allocation.rows[0].shares, 100);
        let excluded: Vec<&str> = allocation
            .exclusions
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        assert_eq!(excluded, vec!["B", "C"]);
    }

    #[test]
    fn test_no_priced_selection() {
        let engine = AllocationEngine::new(2, dec!(0.5), CapMode::ClipRenormalize);
        let ranked = vec![scored("A", 0.6), scored("B", 0.4), scored("C", 0.1)];

        // C는 가격이 있지만 상위 2개에 들지 못함
        let result = engine.allocate(dec!(1000), &ranked, |s| (s == "C").then_some(5.0));
        assert!(matches!(result, Err(PortfolioError::NoPricedSelection)));
    }

    #[test]
    fn test_zero_share_rows_are_kept() {
        let engine = AllocationEngine::new(2, dec!(1), CapMode::ClipRenormalize);
        let ranked = vec![scored("A", 0.5), scored("B", 0.5)];

        let allocation = engine
            .allocate(dec!(100), &ranked, |_| Some(1000.0))
            .unwrap();

        assert_eq!(allocation.rows.len(), 2);
        assert!(allocation.rows.iter().all(|r| r.shares == 0));
        assert!(allocation.rows.iter().all(|r| r.weight_real == Decimal::ZERO));
        assert_eq!(allocation.cash_left, dec!(100));
    }

    #[test]
    fn test_rows_sorted_by_real_weight() {
        let engine = AllocationEngine::new(3, dec!(1), CapMode::ClipRenormalize);
        let ranked = vec![scored("A", 0.5), scored("B", 0.3), scored("C", 0.2)];
        let prices: HashMap<&str, f64> = [("A", 400.0), ("B", 1.0), ("C", 1.0)]
            .into_iter()
            .collect();

        // A: 500 / 400 → 1주 (400), B: 300주, C: 200주
        let allocation = engine
            .allocate(dec!(1000), &ranked, |s| prices.get(s).copied())
            .unwrap();

        let symbols: Vec<&str> = allocation.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
        assert_eq!(allocation.cash_left, dec!(100));

        let allocation = AllocationEngine::new(3, dec!(1), CapMode::ClipRenormalize)
            .allocate(dec!(1000), &ranked, |s| {
                if s == "A" {
                    Some(499.0)
                } else {
                    Some(1.0)
                }
            })
            .unwrap();
        // A: 1주 (499), B: 300주
        assert_eq!(allocation.rows[0].symbol, "A");
        assert_eq!(allocation.rows[1].symbol, "B");
    }

    #[test]
    fn test_lot_row_large_capital_is_floored() {
        let row = lot_row("COMI", dec!(1), dec!(1), dec!(100000000000000000000)).unwrap();
        assert_eq!(row.shares, 100_000_000_000_000_000_000u128);
        assert_eq!(row.market_value, dec!(100000000000000000000));

        let row = lot_row("COMI", dec!(0.5), dec!(3), dec!(100000000000000000000)).unwrap();
        assert_eq!(row.shares, 16_666_666_666_666_666_666u128);
        assert!(row.market_value <= row.capital_alloc);
    }

    #[test]
    fn test_lot_row_overflow_is_reported() {
        let result = lot_row(
            "COMI",
            dec!(1),
            dec!(0.000000001),
            dec!(1000000000000000000000),
        );
        assert!(matches!(
            result,
            Err(PortfolioError::AllocationOverflow { ref symbol }) if symbol == "COMI"
        ));
    }

    #[test]
    fn test_allocate_large_capital() {
        let engine = AllocationEngine::new(1, dec!(1), CapMode::ClipRenormalize);
        let ranked = vec![scored("COMI", 0.9)];

        let allocation = engine
            .allocate(dec!(100000000000000000000), &ranked, |_| Some(1.0))
            .unwrap();

        assert_eq!(allocation.rows[0].shares, 100_000_000_000_000_000_000u128);
        assert_eq!(allocation.cash_left, dec!(0));
    }
}
