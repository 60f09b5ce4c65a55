//! 메모리 기반 시장 데이터 Provider.
//!
//! 테스트와 오프라인 실행을 위한 결정적 Provider입니다.
//! JSON 스냅샷 파일에서 로드할 수 있습니다.
//!
//! ```json
//! {
//!   "prices": {
//!     "COMI": [{"date": "2024-01-02", "close": 71.5}, {"date": "2024-01-03", "close": null}]
//!   },
//!   "fundamentals": {
//!     "COMI": {"pe": 6.1, "pb": 1.4, "roe": 0.31}
//!   }
//! }
//! ```
//!
//! `close`가 `null`이면 결측값으로 취급합니다.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use folio_core::{FundamentalMetrics, PricePoint, PriceSeries};

use crate::error::{DataError, Result};
use crate::provider::{FundamentalsProvider, PriceHistoryProvider};

/// 스냅샷 가격 포인트.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPoint {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// 시장 데이터 스냅샷 파일 형식.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub prices: BTreeMap<String, Vec<SnapshotPoint>>,
    #[serde(default)]
    pub fundamentals: BTreeMap<String, FundamentalMetrics>,
}

fn normalize_key(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// 메모리 기반 가격/펀더멘털 Provider.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    prices: HashMap<String, PriceSeries>,
    fundamentals: HashMap<String, FundamentalMetrics>,
    failing_prices: HashSet<String>,
    failing_fundamentals: HashSet<String>,
    fundamentals_calls: AtomicUsize,
}

impl InMemoryMarketData {
    /// 빈 Provider 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 종가 목록을 연속된 날짜(2024-01-01부터)로 등록합니다.
    pub fn with_closes(self, symbol: &str, closes: &[f64]) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let points = closes
            .iter()
            .enumerate()
            .filter_map(|(i, close)| {
                let date = start.checked_add_days(Days::new(i as u64))?;
                Some(PricePoint::new(date, *close))
            })
            .collect();
        self.with_series(PriceSeries::new(symbol, points))
    }

    /// 시계열 등록.
    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.prices.insert(normalize_key(&series.symbol), series);
        self
    }

    /// 펀더멘털 지표 등록.
    pub fn with_fundamentals(mut self, symbol: &str, metrics: FundamentalMetrics) -> Self {
        self.fundamentals.insert(normalize_key(symbol), metrics);
        self
    }

    /// 가격 조회 시 오류를 반환할 종목.
    pub fn with_failing_prices(mut self, symbol: &str) -> Self {
        self.failing_prices.insert(normalize_key(symbol));
        self
    }

    /// 펀더멘털 조회 시 오류를 반환할 종목.
    pub fn with_failing_fundamentals(mut self, symbol: &str) -> Self {
        self.failing_fundamentals.insert(normalize_key(symbol));
        self
    }

    /// 스냅샷으로부터 생성.
    pub fn from_snapshot(snapshot: MarketSnapshot) -> Self {
        let mut data = Self::new();
        for (symbol, points) in snapshot.prices {
            let points = points
                .into_iter()
                .map(|p| PricePoint::new(p.date, p.close.unwrap_or(f64::NAN)))
                .collect();
            data = data.with_series(PriceSeries::new(symbol, points));
        }
        for (symbol, metrics) in snapshot.fundamentals {
            data = data.with_fundamentals(&symbol, metrics);
        }
        data
    }

    /// JSON 문자열에서 로드.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: MarketSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// JSON 스냅샷 파일에서 로드.
    pub fn from_snapshot_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let data = Self::from_json_str(&content)?;
        info!(
            path = %path.as_ref().display(),
            symbols = data.prices.len(),
            "스냅샷 로드 완료"
        );
        Ok(data)
    }

    /// 등록된 가격 종목 (정렬됨).
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.prices.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// 지금까지의 펀더멘털 조회 횟수.
    pub fn fundamentals_calls(&self) -> usize {
        self.fundamentals_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PriceHistoryProvider for InMemoryMarketData {
    fn name(&self) -> &str {
        "In-Memory"
    }

    async fn get_price(&self, symbol: &str) -> Result<Option<PriceSeries>> {
        let key = normalize_key(symbol);
        if self.failing_prices.contains(&key) {
            return Err(DataError::FetchError(format!("가격 조회 실패: {}", key)));
        }

        let series = self.prices.get(&key).filter(|s| !s.is_empty()).map(|s| {
            let mut series = s.clone();
            series.symbol = symbol.to_string();
            series
        });
        debug!(symbol = symbol, found = series.is_some(), "메모리 가격 조회");
        Ok(series)
    }
}

#[async_trait]
impl FundamentalsProvider for InMemoryMarketData {
    fn name(&self) -> &str {
        "In-Memory"
    }

    async fn get_fundamentals(&self, symbol: &str) -> Result<Option<FundamentalMetrics>> {
        self.fundamentals_calls.fetch_add(1, Ordering::Relaxed);

        let key = normalize_key(symbol);
        if self.failing_fundamentals.contains(&key) {
            return Err(DataError::FetchError(format!("펀더멘털 조회 실패: {}", key)));
        }
        Ok(self.fundamentals.get(&key).cloned())
    }
}
