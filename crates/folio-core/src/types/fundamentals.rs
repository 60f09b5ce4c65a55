//! 펀더멘털 지표 맵.
//!
//! 제공자가 돌려주는 "지표 이름 → 값" 매핑입니다.
//! 키는 대소문자를 구분하지 않으며 지표마다 두 가지 표기를 인식합니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 인식하는 펀더멘털 지표.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundamentalMetric {
    /// 주가수익비율 (P/E)
    PriceEarnings,
    /// 주가순자산비율 (P/B)
    PriceBook,
    /// 자기자본이익률 (ROE, 소수 표기: 0.15 = 15%)
    ReturnOnEquity,
    /// 부채비율 (D/E, 배수 표기: 1.0 = 100%)
    DebtEquity,
    /// EPS 성장률 (소수 표기)
    EpsGrowth,
}

impl FundamentalMetric {
    /// 모든 지표 (채점 순서).
    pub const ALL: [FundamentalMetric; 5] = [
        FundamentalMetric::PriceEarnings,
        FundamentalMetric::PriceBook,
        FundamentalMetric::ReturnOnEquity,
        FundamentalMetric::DebtEquity,
        FundamentalMetric::EpsGrowth,
    ];

    /// 인식하는 키 표기 (우선순위 순).
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            FundamentalMetric::PriceEarnings => &["pe"],
            FundamentalMetric::PriceBook => &["pb"],
            FundamentalMetric::ReturnOnEquity => &["roe"],
            FundamentalMetric::DebtEquity => &["de_ratio", "de"],
            FundamentalMetric::EpsGrowth => &["eps_growth", "eps_g"],
        }
    }

    /// 제공자가 값을 기록할 때 쓰는 표준 키.
    pub fn canonical_key(&self) -> &'static str {
        self.aliases()[0]
    }
}

/// 종목 하나의 펀더멘털 지표 맵.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundamentalMetrics(BTreeMap<String, f64>);

impl FundamentalMetrics {
    /// 빈 맵 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 값 추가 (빌더 스타일).
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    /// 값 추가.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// 지표 조회.
    ///
    /// 표기 우선순위대로 대소문자 무시 키를 찾습니다.
    /// 0 또는 NaN/무한대는 값이 없는 것으로 보고 다음 표기로 넘어갑니다.
    pub fn get(&self, metric: FundamentalMetric) -> Option<f64> {
        metric.aliases().iter().find_map(|alias| {
            self.0
                .iter()
                .filter(|(key, _)| key.eq_ignore_ascii_case(alias))
                .map(|(_, value)| *value)
                .find(|value| value.is_finite() && *value != 0.0)
        })
    }

    /// 인식 가능한 지표가 하나라도 있는지 확인.
    pub fn has_any(&self) -> bool {
        FundamentalMetric::ALL.iter().any(|m| self.get(*m).is_some())
    }

    /// 키 개수.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FundamentalMetrics {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
