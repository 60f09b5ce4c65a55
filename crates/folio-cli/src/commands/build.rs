//! 포트폴리오 구성 명령.
//!
//! 설정 파일 값에 명령줄 오버라이드를 적용하고, 데이터 소스를 고른 뒤
//! [`PortfolioBuilder`]로 포트폴리오를 구성해 출력합니다.
//!
//! 데이터 소스:
//! - `--snapshot FILE`: JSON 스냅샷 (오프라인, 결정적)
//! - 그 외: Yahoo Finance

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use folio_core::{
    CapMode, Exclusion, MarketConfig, PortfolioBuild, PortfolioConfig, ScoredRecord,
};
use folio_data::{
    FundamentalsSource, InMemoryMarketData, PriceHistoryProvider, YahooFundamentalsProvider,
    YahooPriceProvider,
};
use folio_engine::PortfolioBuilder;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid format: {}. Use: table, json", s)),
        }
    }
}

/// build 명령 설정 (명령줄 오버라이드).
///
/// `None`인 항목은 설정 파일 값을 그대로 사용합니다.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    /// 투자 자본
    pub capital: Option<Decimal>,
    /// 최대 편입 종목 수
    pub max_stocks: Option<usize>,
    /// 종목당 최대 비중
    pub max_weight: Option<Decimal>,
    /// 룩백 거래일 수
    pub lookback: Option<usize>,
    /// 유니버스 (쉼표 구분 입력을 분리한 값)
    pub symbols: Option<Vec<String>>,
    /// JSON 스냅샷 파일
    pub snapshot: Option<PathBuf>,
    /// 펀더멘털 비활성화
    pub no_fundamentals: bool,
    /// 최대 비중 적용 방식
    pub cap_mode: Option<CapMode>,
    /// 출력 형식
    pub format: OutputFormat,
}

/// 쉼표로 구분된 심볼 목록을 분리합니다.
pub fn parse_symbols(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 명령줄 오버라이드를 포트폴리오 설정에 적용합니다.
pub fn apply_overrides(portfolio: &mut PortfolioConfig, config: &BuildConfig) {
    if let Some(capital) = config.capital {
        portfolio.capital = capital;
    }
    if let Some(max_stocks) = config.max_stocks {
        portfolio.max_stocks = max_stocks;
    }
    if let Some(max_weight) = config.max_weight {
        portfolio.max_weight_per_stock = max_weight;
    }
    if let Some(lookback) = config.lookback {
        portfolio.lookback_days = lookback;
    }
    if let Some(symbols) = &config.symbols {
        portfolio.universe = symbols.clone();
    }
    if let Some(cap_mode) = config.cap_mode {
        portfolio.cap_mode = cap_mode;
    }
}

/// 가격/펀더멘털 제공자를 선택합니다.
fn select_providers(
    config: &BuildConfig,
    portfolio: &PortfolioConfig,
    market: &MarketConfig,
) -> Result<(Arc<dyn PriceHistoryProvider>, FundamentalsSource)> {
    let use_fundamentals = market.fundamentals_enabled && !config.no_fundamentals;

    if let Some(path) = &config.snapshot {
        let data = Arc::new(
            InMemoryMarketData::from_snapshot_file(path)
                .with_context(|| format!("Failed to load snapshot: {}", path.display()))?,
        );
        info!(path = %path.display(), symbols = data.symbols().len(), "스냅샷 데이터 사용");

        let fundamentals = if use_fundamentals {
            FundamentalsSource::from_provider(data.clone())
        } else {
            FundamentalsSource::Unavailable
        };
        let prices: Arc<dyn PriceHistoryProvider> = data;
        return Ok((prices, fundamentals));
    }

    let yahoo = YahooPriceProvider::from_config(market, portfolio.lookback_days)
        .context("Failed to create Yahoo price provider")?;
    info!(
        suffix = %market.suffix,
        history_days = yahoo.history_days(),
        "Yahoo Finance 데이터 사용"
    );
    let prices: Arc<dyn PriceHistoryProvider> = Arc::new(yahoo);

    let fundamentals = if use_fundamentals {
        let provider = YahooFundamentalsProvider::from_config(market)
            .context("Failed to create Yahoo fundamentals provider")?;
        FundamentalsSource::from_provider(Arc::new(provider))
    } else {
        FundamentalsSource::Unavailable
    };

    Ok((prices, fundamentals))
}

/// 포트폴리오를 구성하고 출력합니다.
///
/// 실제로 1주 이상 매수한 종목 수를 반환합니다.
pub async fn run_build(
    mut portfolio: PortfolioConfig,
    market: MarketConfig,
    config: BuildConfig,
) -> Result<usize> {
    apply_overrides(&mut portfolio, &config);

    let (prices, fundamentals) = select_providers(&config, &portfolio, &market)?;
    let builder = PortfolioBuilder::from_config(&portfolio, prices, fundamentals)?;

    info!(
        universe = builder.universe().len(),
        capital = %portfolio.capital,
        max_stocks = portfolio.max_stocks,
        max_weight = %portfolio.max_weight_per_stock,
        "포트폴리오 구성 시작"
    );

    let build = builder
        .build_portfolio(
            portfolio.capital,
            portfolio.max_stocks,
            portfolio.max_weight_per_stock,
        )
        .await?;

    let content = match config.format {
        OutputFormat::Table => format_table(&build, portfolio.capital),
        OutputFormat::Json => format_json(&build, portfolio.capital)?,
    };
    println!("{}", content);

    Ok(build.held_positions())
}

// =============================================================================
// 출력
// =============================================================================

/// JSON 출력용 요약.
#[derive(Debug, Serialize)]
struct Summary {
    capital: Decimal,
    total_market_value: Decimal,
    cash_left: Decimal,
    total_value: Decimal,
    held_positions: usize,
}

/// JSON 출력용 보고서.
#[derive(Debug, Serialize)]
struct BuildReport<'a> {
    summary: Summary,
    #[serde(flatten)]
    build: &'a PortfolioBuild,
}

/// JSON 형식 출력.
pub fn format_json(build: &PortfolioBuild, capital: Decimal) -> Result<String> {
    let report = BuildReport {
        summary: Summary {
            capital,
            total_market_value: build.total_market_value(),
            cash_left: build.cash_left,
            total_value: build.total_value(),
            held_positions: build.held_positions(),
        },
        build,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn percent(value: Decimal) -> String {
    format!("{:.2}", (value * Decimal::ONE_HUNDRED).round_dp(2))
}

fn ratio_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v * 100.0),
        _ => "-".to_string(),
    }
}

/// 테이블 형식 출력.
pub fn format_table(build: &PortfolioBuild, capital: Decimal) -> String {
    let mut output = String::new();

    output.push_str("\n📊 포트폴리오 배분\n");
    output.push_str(&"═".repeat(86));
    output.push('\n');
    output.push_str(&format!(
        "{:<10} {:>10} {:>14} {:>12} {:>10} {:>14} {:>10}\n",
        "SYMBOL", "TARGET%", "ALLOCATED", "LAST", "SHARES", "VALUE", "REAL%"
    ));
    output.push_str(&"─".repeat(86));
    output.push('\n');
    for row in &build.allocations {
        output.push_str(&format!(
            "{:<10} {:>10} {:>14} {:>12} {:>10} {:>14} {:>10}\n",
            row.symbol,
            percent(row.weight_target),
            money(row.capital_alloc),
            money(row.last_price),
            row.shares,
            money(row.market_value),
            percent(row.weight_real),
        ));
    }

    output.push('\n');
    output.push_str(&format!("투자 자본:     {:>16}\n", money(capital)));
    output.push_str(&format!(
        "주식 평가금액: {:>16}\n",
        money(build.total_market_value())
    ));
    output.push_str(&format!("남은 현금:     {:>16}\n", money(build.cash_left)));
    output.push_str(&format!("합계:          {:>16}\n", money(build.total_value())));

    output.push_str("\n📈 팩터 테이블\n");
    output.push_str(&"═".repeat(104));
    output.push('\n');
    output.push_str(&format!(
        "{:<10} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}\n",
        "SYMBOL", "RET%", "VOL%", "MOM1M%", "MOM3M%", "MOM6M%", "FUND", "RISK_S", "MOM_S",
        "FUND_S", "TOTAL"
    ));
    output.push_str(&"─".repeat(104));
    output.push('\n');
    for record in &build.factor_table {
        output.push_str(&format_factor_row(record));
    }

    if !build.exclusions.is_empty() {
        output.push_str("\n⚠️  제외된 종목\n");
        output.push_str(&"─".repeat(60));
        output.push('\n');
        for exclusion in &build.exclusions {
            output.push_str(&format_exclusion(exclusion));
        }
    }

    output
}

fn format_factor_row(record: &ScoredRecord) -> String {
    let f = &record.factors;
    format!(
        "{:<10} {:>9.2} {:>9.2} {:>9} {:>9} {:>9} {:>9.2} {:>9.3} {:>9.3} {:>9.3} {:>9.3}\n",
        f.symbol,
        f.annual_return_pct(),
        f.annual_vol_pct(),
        ratio_percent(f.mom_1m),
        ratio_percent(f.mom_3m),
        ratio_percent(f.mom_6m),
        f.fund_score_raw,
        record.risk_score,
        record.mom_score,
        record.fund_score,
        record.total_score,
    )
}

fn format_exclusion(exclusion: &Exclusion) -> String {
    format!(
        "{:<10} {:<14} {}\n",
        exclusion.symbol,
        exclusion.stage.to_string(),
        exclusion.reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{AllocationRow, ExclusionReason, FactorRecord, PipelineStage};
    use rust_decimal_macros::dec;

    fn sample_build() -> PortfolioBuild {
        PortfolioBuild {
            allocations: vec![AllocationRow {
                symbol: "COMI".to_string(),
                weight_target: dec!(1),
                capital_alloc: dec!(1000),
                last_price: dec!(300),
                shares: 3,
                market_value: dec!(900),
                weight_real: dec!(1),
            }],
            cash_left: dec!(100),
            factor_table: vec![ScoredRecord {
                factors: FactorRecord {
                    symbol: "COMI".to_string(),
                    annual_return: 0.25,
                    annual_vol: 0.3,
                    risk_score_raw: 0.83,
                    mom_1m: Some(0.02),
                    mom_3m: None,
                    mom_6m: None,
                    mom_score_raw: 0.01,
                    fund_score_raw: 0.5,
                },
                risk_score: 0.5,
                mom_score: 0.5,
                fund_score: 0.5,
                total_score: 0.5,
            }],
            exclusions: vec![Exclusion::new(
                "ETEL",
                PipelineStage::PriceHistory,
                ExclusionReason::NoData,
            )],
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("TABLE").unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::parse("csv").is_err());
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!(parse_symbols(" comi, ETEL ,,swdy"), vec!["COMI", "ETEL", "SWDY"]);
        assert!(parse_symbols(" , ").is_empty());
    }

    #[test]
    fn test_apply_overrides() {
        let mut portfolio = PortfolioConfig::default();
        let config = BuildConfig {
            capital: Some(dec!(5000)),
            max_stocks: Some(3),
            symbols: Some(vec!["COMI".to_string()]),
            cap_mode: Some(CapMode::WaterFill),
            ..Default::default()
        };
        apply_overrides(&mut portfolio, &config);

        assert_eq!(portfolio.capital, dec!(5000));
        assert_eq!(portfolio.max_stocks, 3);
        assert_eq!(portfolio.max_weight_per_stock, dec!(0.2));
        assert_eq!(portfolio.universe, vec!["COMI"]);
        assert_eq!(portfolio.cap_mode, CapMode::WaterFill);
        assert_eq!(portfolio.lookback_days, 180);
    }

    #[test]
    fn test_format_table() {
        let table = format_table(&sample_build(), dec!(1000));
        assert!(table.contains("COMI"));
        assert!(table.contains("900.00"));
        assert!(table.contains("100.00"));
        assert!(table.contains("25.00"));
        assert!(table.contains("ETEL"));
        assert!(table.contains("price_history"));
    }

    #[test]
    fn test_format_json_summary() {
        let json = format_json(&sample_build(), dec!(1000)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["total_market_value"], "900");
        assert_eq!(value["summary"]["cash_left"], "100");
        assert_eq!(value["summary"]["total_value"], "1000");
        assert_eq!(value["allocations"][0]["shares"], 3);
        assert_eq!(value["exclusions"][0]["reason"]["kind"], "no_data");
    }
}
