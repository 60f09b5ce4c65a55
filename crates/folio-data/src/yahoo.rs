//! Yahoo Finance Provider.
//!
//! `yahoo_finance_api` 크레이트로 일봉 종가와 quote summary 지표를 조회합니다.
//! 접미사 없는 티커를 받아 시장 접미사(기본 `.CA`)를 내부에서 붙입니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use folio_core::{FundamentalMetric, FundamentalMetrics, MarketConfig, PricePoint, PriceSeries};

use crate::error::{DataError, Result};
use crate::provider::{FundamentalsProvider, PriceHistoryProvider};

/// 6개월 모멘텀(126봉 전 가격)에 필요한 최소 조회 일수.
pub const MIN_HISTORY_DAYS: usize = 127;

/// Yahoo 심볼 변환 규칙.
#[derive(Debug, Clone)]
pub struct SymbolFormat {
    suffix: String,
    auto_suffix: bool,
}

impl SymbolFormat {
    /// 새 변환 규칙 생성.
    pub fn new(suffix: impl Into<String>, auto_suffix: bool) -> Self {
        Self {
            suffix: suffix.into().trim().to_uppercase(),
            auto_suffix,
        }
    }

    /// 티커를 Yahoo 심볼로 변환합니다.
    ///
    /// 공백을 제거하고 대문자로 바꾼 뒤, 접미사가 없으면 붙입니다.
    pub fn format(&self, symbol: &str) -> String {
        let sym = symbol.trim().to_uppercase();
        if self.auto_suffix && !self.suffix.is_empty() && !sym.ends_with(&self.suffix) {
            format!("{}{}", sym, self.suffix)
        } else {
            sym
        }
    }
}

impl Default for SymbolFormat {
    fn default() -> Self {
        Self::new(".CA", true)
    }
}

impl From<&MarketConfig> for SymbolFormat {
    fn from(config: &MarketConfig) -> Self {
        Self::new(config.suffix.clone(), config.auto_suffix)
    }
}

/// 조회할 거래일 수에 맞는 Yahoo range 문자열.
pub fn range_for_lookback(days: usize) -> &'static str {
    if days <= 5 {
        "5d"
    } else if days <= 20 {
        "1mo"
    } else if days <= 60 {
        "3mo"
    } else if days <= 120 {
        "6mo"
    } else if days <= 250 {
        "1y"
    } else if days <= 500 {
        "2y"
    } else if days <= 1250 {
        "5y"
    } else {
        "10y"
    }
}

fn yahoo_connector() -> Result<yahoo_finance_api::YahooConnector> {
    yahoo_finance_api::YahooConnector::new()
        .map_err(|e| DataError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))
}

fn timestamp_to_date(timestamp: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

// =============================================================================
// 가격 이력
// =============================================================================

/// Yahoo Finance 일봉 종가 Provider.
pub struct YahooPriceProvider {
    connector: yahoo_finance_api::YahooConnector,
    format: SymbolFormat,
    history_days: usize,
}

impl YahooPriceProvider {
    /// 새 Provider 생성.
    ///
    /// `lookback_days`와 모멘텀 계산에 필요한 일수 중 큰 값만큼 조회합니다.
    pub fn new(format: SymbolFormat, lookback_days: usize) -> Result<Self> {
        Ok(Self {
            connector: yahoo_connector()?,
            format,
            history_days: lookback_days.max(MIN_HISTORY_DAYS),
        })
    }

    /// 시장 설정으로부터 생성.
    pub fn from_config(config: &MarketConfig, lookback_days: usize) -> Result<Self> {
        Self::new(SymbolFormat::from(config), lookback_days)
    }

    /// 조회 일수.
    pub fn history_days(&self) -> usize {
        self.history_days
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooPriceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn get_price(&self, symbol: &str) -> Result<Option<PriceSeries>> {
        let yahoo_symbol = self.format.format(symbol);
        let range = range_for_lookback(self.history_days);

        debug!(symbol = %yahoo_symbol, range = range, "Yahoo Finance 가격 조회");

        let response = self
            .connector
            .get_quote_range(&yahoo_symbol, "1d", range)
            .await
            .map_err(|e| {
                DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", yahoo_symbol, e))
            })?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        let points: Vec<PricePoint> = quotes
            .iter()
            .filter_map(|q| {
                let date = timestamp_to_date(q.timestamp as i64)?;
                Some(PricePoint::new(date, q.close))
            })
            .collect();

        if points.is_empty() {
            warn!(symbol = %yahoo_symbol, "가격 데이터 없음");
            return Ok(None);
        }

        let series = PriceSeries::new(symbol, points);
        debug!(symbol = %yahoo_symbol, count = series.len(), "가격 조회 완료");
        Ok(Some(series))
    }
}

// =============================================================================
// 펀더멘털
// =============================================================================

/// Yahoo Finance quote summary 기반 펀더멘털 Provider.
///
/// `get_ticker_info`가 `&mut self`를 요구하므로 커넥터를 Mutex로 감쌉니다.
pub struct YahooFundamentalsProvider {
    connector: Mutex<yahoo_finance_api::YahooConnector>,
    format: SymbolFormat,
}

impl YahooFundamentalsProvider {
    /// 새 Provider 생성.
    pub fn new(format: SymbolFormat) -> Result<Self> {
        Ok(Self {
            connector: Mutex::new(yahoo_connector()?),
            format,
        })
    }

    /// 시장 설정으로부터 생성.
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        Self::new(SymbolFormat::from(config))
    }
}

#[async_trait]
impl FundamentalsProvider for YahooFundamentalsProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn get_fundamentals(&self, symbol: &str) -> Result<Option<FundamentalMetrics>> {
        let yahoo_symbol = self.format.format(symbol);
        debug!(symbol = %yahoo_symbol, "Yahoo ticker info 조회");

        let summary = {
            let mut connector = self.connector.lock().await;
            connector.get_ticker_info(&yahoo_symbol).await.map_err(|e| {
                DataError::FetchError(format!(
                    "Yahoo ticker info 조회 실패 ({}): {}",
                    yahoo_symbol, e
                ))
            })?
        };

        let Some(result) = summary
            .quote_summary
            .and_then(|qs| qs.result)
            .and_then(|r| r.into_iter().next())
        else {
            return Ok(None);
        };

        let summary_detail = result.summary_detail.as_ref();
        let key_stats = result.default_key_statistics.as_ref();
        let financial_data = result.financial_data.as_ref();

        let values = [
            (
                FundamentalMetric::PriceEarnings,
                summary_detail.and_then(|sd| sd.trailing_pe),
            ),
            (
                FundamentalMetric::PriceBook,
                key_stats.and_then(|ks| ks.price_to_book),
            ),
            (
                FundamentalMetric::ReturnOnEquity,
                financial_data.and_then(|fd| fd.return_on_equity),
            ),
            // Yahoo는 부채비율을 퍼센트로 제공 (150 = 1.5배)
            (
                FundamentalMetric::DebtEquity,
                financial_data
                    .and_then(|fd| fd.debt_to_equity)
                    .map(|v| v / 100.0),
            ),
            (
                FundamentalMetric::EpsGrowth,
                financial_data.and_then(|fd| fd.earnings_growth),
            ),
        ];

        let metrics: FundamentalMetrics = values
            .into_iter()
            .filter_map(|(metric, value)| value.map(|v| (metric.canonical_key(), v)))
            .collect();

        if !metrics.has_any() {
            debug!(symbol = %yahoo_symbol, "인식 가능한 펀더멘털 지표 없음");
            return Ok(None);
        }

        Ok(Some(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_format_appends_suffix() {
        let format = SymbolFormat::default();
        assert_eq!(format.format("comi"), "COMI.CA");
        assert_eq!(format.format("  SWDY "), "SWDY.CA");
        assert_eq!(format.format("ETEL.CA"), "ETEL.CA");
        assert_eq!(format.format("etel.ca"), "ETEL.CA");
    }

    #[test]
    fn test_symbol_format_without_auto_suffix() {
        let format = SymbolFormat::new(".CA", false);
        assert_eq!(format.format("comi"), "COMI");

        let format = SymbolFormat::new("", true);
        assert_eq!(format.format("AAPL"), "AAPL");
    }

    #[test]
    fn test_symbol_format_from_config() {
        let config = MarketConfig {
            suffix: ".ks".to_string(),
            auto_suffix: true,
            fundamentals_enabled: false,
        };
        assert_eq!(SymbolFormat::from(&config).format("005930"), "005930.KS");
    }

    #[test]
    fn test_range_for_lookback() {
        assert_eq!(range_for_lookback(5), "5d");
        assert_eq!(range_for_lookback(21), "3mo");
        assert_eq!(range_for_lookback(127), "1y");
        assert_eq!(range_for_lookback(180), "1y");
        assert_eq!(range_for_lookback(251), "2y");
        assert_eq!(range_for_lookback(2000), "10y");
    }

    #[test]
    fn test_timestamp_to_date() {
        // 2024-01-02 08:00:00 UTC
        assert_eq!(
            timestamp_to_date(1_704_182_400),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
    }
}
