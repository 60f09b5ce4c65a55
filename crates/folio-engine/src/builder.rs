//! 포트폴리오 빌더.
//!
//! 가격 이력 로드부터 배분까지 전체 파이프라인을 실행합니다.
//!
//! ```text
//! 가격 이력 ─┬─ 수익/위험 ─┐
//!            └─ 모멘텀 ────┴─ inner join ─ 펀더멘털 ─ 정규화/순위 ─ 배분
//! ```
//!
//! 종목 조회는 순차적으로 수행하며 호출 간 상태를 남기지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use folio_core::{
    CapMode, Exclusion, ExclusionReason, FactorKind, FactorRecord, FactorWeights, PipelineStage,
    PortfolioBuild, PortfolioConfig, PortfolioError, PortfolioResult, PriceSeries,
};
use folio_data::{FundamentalsSource, PriceHistoryProvider};

use crate::allocation::AllocationEngine;
use crate::factors::{
    compute_momentum, compute_return_risk, prepare_history, score_fundamentals, Momentum,
    ReturnRisk, FUNDAMENTAL_NEUTRAL_SCORE,
};
use crate::ranking::rank;

/// 기본 룩백 거래일 수.
pub const DEFAULT_LOOKBACK_DAYS: usize = 180;

/// 멀티팩터 포트폴리오 빌더.
pub struct PortfolioBuilder {
    universe: Vec<String>,
    lookback_days: usize,
    weights: FactorWeights,
    cap_mode: CapMode,
    prices: Arc<dyn PriceHistoryProvider>,
    fundamentals: FundamentalsSource,
}

impl PortfolioBuilder {
    /// 기본 설정으로 빌더 생성.
    ///
    /// 유니버스의 중복 심볼은 첫 번째만 남깁니다.
    pub fn new<S: AsRef<str>>(universe: &[S], prices: Arc<dyn PriceHistoryProvider>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(universe.len());
        for symbol in universe {
            let symbol = symbol.as_ref().trim().to_string();
            if !symbol.is_empty() && !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }

        Self {
            universe: unique,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            weights: FactorWeights::default(),
            cap_mode: CapMode::default(),
            prices,
            fundamentals: FundamentalsSource::Unavailable,
        }
    }

    /// 포트폴리오 설정으로 빌더 생성.
    pub fn from_config(
        config: &PortfolioConfig,
        prices: Arc<dyn PriceHistoryProvider>,
        fundamentals: FundamentalsSource,
    ) -> PortfolioResult<Self> {
        config.validate()?;
        Ok(Self::new(&config.universe, prices)
            .with_lookback_days(config.lookback_days)
            .with_weights(config.weights)
            .with_cap_mode(config.cap_mode)
            .with_fundamentals(fundamentals))
    }

    /// 룩백 거래일 수 설정.
    pub fn with_lookback_days(mut self, lookback_days: usize) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    /// 팩터 가중치 설정.
    pub fn with_weights(mut self, weights: FactorWeights) -> Self {
        self.weights = weights;
        self
    }

    /// 최대 비중 적용 방식 설정.
    pub fn with_cap_mode(mut self, cap_mode: CapMode) -> Self {
        self.cap_mode = cap_mode;
        self
    }

    /// 펀더멘털 소스 설정.
    pub fn with_fundamentals(mut self, fundamentals: FundamentalsSource) -> Self {
        self.fundamentals = fundamentals;
        self
    }

    /// 유니버스.
    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// 포트폴리오를 구성합니다.
    ///
    /// # 인수
    /// * `capital` - 투자 자본 (양수)
    /// * `max_stocks` - 최대 편입 종목 수 (1 이상)
    /// * `max_weight_per_stock` - 종목당 최대 비중 (0, 1]
    ///
    /// # 에러
    /// 데이터 상태로 포트폴리오를 만들 수 없으면 [`PortfolioError`]의 해당 변형을 반환합니다.
    /// 종목 단위 실패는 `exclusions`에 기록되고 빌드를 중단시키지 않습니다.
    #[instrument(
        skip(self),
        fields(universe = self.universe.len(), lookback = self.lookback_days)
    )]
    pub async fn build_portfolio(
        &self,
        capital: Decimal,
        max_stocks: usize,
        max_weight_per_stock: Decimal,
    ) -> PortfolioResult<PortfolioBuild> {
        self.validate(capital, max_stocks, max_weight_per_stock)?;

        let mut exclusions = Vec::new();

        // 1) 가격 이력
        let history = self.load_history(&mut exclusions).await;
        if history.is_empty() {
            return Err(PortfolioError::DataUnavailable);
        }
        info!(symbols = history.len(), "가격 이력 로드 완료");

        // 2) 수익/위험
        let return_risk = collect_factor(
            &history,
            PipelineStage::ReturnRisk,
            &mut exclusions,
            |series| compute_return_risk(&series.closes()),
        );
        if return_risk.is_empty() {
            return Err(PortfolioError::FactorComputationEmpty {
                factor: FactorKind::ReturnRisk,
            });
        }

        // 3) 모멘텀
        let momentum = collect_factor(
            &history,
            PipelineStage::Momentum,
            &mut exclusions,
            |series| compute_momentum(&series.closes()),
        );
        if momentum.is_empty() {
            return Err(PortfolioError::FactorComputationEmpty {
                factor: FactorKind::Momentum,
            });
        }

        // 4) inner join
        let merged = merge_factors(&history, &return_risk, &momentum, &mut exclusions);
        if merged.is_empty() {
            return Err(PortfolioError::FactorSetDisjoint);
        }
        info!(
            return_risk = return_risk.len(),
            momentum = momentum.len(),
            merged = merged.len(),
            "팩터 병합 완료"
        );

        // 5) 펀더멘털 (제외 없음)
        let mut records = Vec::with_capacity(merged.len());
        for (symbol, rr, mom) in merged {
            let fund_score_raw = self.fundamental_score(&symbol).await;
            records.push(FactorRecord {
                symbol,
                annual_return: rr.annual_return,
                annual_vol: rr.annual_vol,
                risk_score_raw: rr.score,
                mom_1m: mom.mom_1m,
                mom_3m: mom.mom_3m,
                mom_6m: mom.mom_6m,
                mom_score_raw: mom.score,
                fund_score_raw,
            });
        }

        // 6) 정규화/순위
        let factor_table = rank(records, &self.weights);

        // 7) 배분
        let engine = AllocationEngine::new(max_stocks, max_weight_per_stock, self.cap_mode);
        let last_closes: HashMap<&str, f64> = history
            .iter()
            .filter_map(|(symbol, series)| Some((symbol.as_str(), series.last_valid_close()?)))
            .collect();
        let allocation = engine.allocate(capital, &factor_table, |symbol| {
            last_closes.get(symbol).copied()
        })?;
        exclusions.extend(allocation.exclusions);

        info!(
            positions = allocation.rows.len(),
            cash_left = %allocation.cash_left,
            excluded = exclusions.len(),
            "포트폴리오 구성 완료"
        );

        Ok(PortfolioBuild {
            allocations: allocation.rows,
            cash_left: allocation.cash_left,
            factor_table,
            exclusions,
        })
    }

    fn validate(
        &self,
        capital: Decimal,
        max_stocks: usize,
        max_weight_per_stock: Decimal,
    ) -> PortfolioResult<()> {
        if capital <= Decimal::ZERO {
            return Err(PortfolioError::InvalidParameter(format!(
                "capital은 양수여야 합니다: {}",
                capital
            )));
        }
        if max_stocks == 0 {
            return Err(PortfolioError::InvalidParameter(
                "max_stocks는 1 이상이어야 합니다".to_string(),
            ));
        }
        if max_weight_per_stock <= Decimal::ZERO || max_weight_per_stock > Decimal::ONE {
            return Err(PortfolioError::InvalidParameter(format!(
                "max_weight_per_stock은 (0, 1] 범위여야 합니다: {}",
                max_weight_per_stock
            )));
        }
        if self.universe.is_empty() {
            return Err(PortfolioError::InvalidParameter(
                "유니버스가 비어 있습니다".to_string(),
            ));
        }
        if self.lookback_days < 2 {
            return Err(PortfolioError::InvalidParameter(format!(
                "lookback_days는 2 이상이어야 합니다: {}",
                self.lookback_days
            )));
        }
        self.weights.validate()
    }

    /// 유니버스 전체의 가격 이력을 유니버스 순서대로 조회합니다.
    ///
    /// 조회 오류와 데이터 없음은 해당 종목의 제외로만 기록합니다.
    async fn load_history(&self, exclusions: &mut Vec<Exclusion>) -> Vec<(String, PriceSeries)> {
        let mut history = Vec::with_capacity(self.universe.len());

        for symbol in &self.universe {
            let reason = match self.prices.get_price(symbol).await {
                Ok(Some(series)) => match prepare_history(&series, self.lookback_days) {
                    Ok(prepared) => {
                        debug!(symbol = %symbol, points = prepared.len(), "가격 이력 준비");
                        history.push((symbol.clone(), prepared));
                        continue;
                    }
                    Err(reason) => reason,
                },
                Ok(None) => ExclusionReason::NoData,
                Err(e) => ExclusionReason::FetchFailed {
                    message: e.to_string(),
                },
            };

            warn!(symbol = %symbol, reason = %reason, "가격 이력 제외");
            exclusions.push(Exclusion::new(
                symbol.clone(),
                PipelineStage::PriceHistory,
                reason,
            ));
        }

        history
    }

    /// 종목의 원시 펀더멘털 점수. 정보가 없으면 중립 점수.
    async fn fundamental_score(&self, symbol: &str) -> f64 {
        let Some(provider) = self.fundamentals.provider() else {
            return FUNDAMENTAL_NEUTRAL_SCORE;
        };

        match provider.get_fundamentals(symbol).await {
            Ok(Some(metrics)) => score_fundamentals(&metrics).unwrap_or_else(|| {
                debug!(symbol = symbol, "적용 가능한 펀더멘털 지표 없음");
                FUNDAMENTAL_NEUTRAL_SCORE
            }),
            Ok(None) => FUNDAMENTAL_NEUTRAL_SCORE,
            Err(e) => {
                warn!(symbol = symbol, error = %e, "펀더멘털 조회 실패, 중립 점수 사용");
                FUNDAMENTAL_NEUTRAL_SCORE
            }
        }
    }
}

/// 가격 이력 순서대로 팩터를 계산하고 실패한 종목은 제외로 기록합니다.
fn collect_factor<'a, T, F>(
    history: &'a [(String, PriceSeries)],
    stage: PipelineStage,
    exclusions: &mut Vec<Exclusion>,
    compute: F,
) -> HashMap<&'a str, T>
where
    F: Fn(&PriceSeries) -> Result<T, ExclusionReason>,
{
    let mut values = HashMap::with_capacity(history.len());
    for (symbol, series) in history {
        match compute(series) {
            Ok(value) => {
                values.insert(symbol.as_str(), value);
            }
            Err(reason) => {
                warn!(symbol = %symbol, stage = %stage, reason = %reason, "팩터 계산 제외");
                exclusions.push(Exclusion::new(symbol.clone(), stage, reason));
            }
        }
    }
    values
}

/// 수익/위험과 모멘텀을 모두 가진 종목만 남깁니다 (inner join).
///
/// 한쪽에만 있는 종목은 병합 단계 제외로 기록합니다.
fn merge_factors(
    history: &[(String, PriceSeries)],
    return_risk: &HashMap<&str, ReturnRisk>,
    momentum: &HashMap<&str, Momentum>,
    exclusions: &mut Vec<Exclusion>,
) -> Vec<(String, ReturnRisk, Momentum)> {
    let mut merged = Vec::with_capacity(history.len());

    for (symbol, _) in history {
        let reason = match (return_risk.get(symbol.as_str()), momentum.get(symbol.as_str())) {
            (Some(rr), Some(mom)) => {
                merged.push((symbol.clone(), *rr, *mom));
                continue;
            }
            (Some(_), None) => ExclusionReason::NotInMomentum,
            (None, Some(_)) => ExclusionReason::NotInReturnRisk,
            (None, None) => continue,
        };
        debug!(symbol = %symbol, reason = %reason, "팩터 병합 제외");
        exclusions.push(Exclusion::new(symbol.clone(), PipelineStage::Merge, reason));
    }

    merged
}
