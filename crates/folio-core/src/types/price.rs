//! 가격 시계열 정의.
//!
//! 종목 하나의 일별 종가를 날짜 오름차순으로 보관합니다.
//! 빌드 호출마다 새로 만들어지며 캐시하지 않습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 일별 종가 한 건.
///
/// 종가가 NaN/무한대이면 결측값으로 취급합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: f64,
}

impl PricePoint {
    /// 새 가격 포인트 생성.
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// 결측값이 아닌지 확인.
    pub fn is_valid(&self) -> bool {
        self.close.is_finite()
    }
}

/// 종목 하나의 종가 시계열.
///
/// 불변 조건: 날짜 오름차순, 중복 날짜 없음.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// 종목 심볼
    pub symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// 가격 포인트로부터 시계열 생성.
    ///
    /// 날짜순으로 정렬하고, 같은 날짜가 여러 번 나오면 마지막 값을 남깁니다.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            symbol: symbol.into(),
            points: deduped,
        }
    }

    /// 가격 포인트 슬라이스.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// 포인트 개수 (결측값 포함).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 종가 벡터.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// 최근 `n`개 포인트만 남긴 시계열.
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.points.len().saturating_sub(n);
        Self {
            symbol: self.symbol.clone(),
            points: self.points[skip..].to_vec(),
        }
    }

    /// 결측값을 제거한 시계열.
    pub fn without_missing(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            points: self.points.iter().copied().filter(PricePoint::is_valid).collect(),
        }
    }

    /// 가장 최근의 유효한 종가.
    pub fn last_valid_close(&self) -> Option<f64> {
        self.points.iter().rev().find(|p| p.is_valid()).map(|p| p.close)
    }
}
