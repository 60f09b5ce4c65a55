//! 데이터 Provider 트레이트.
//!
//! 포트폴리오 엔진이 외부 데이터를 얻는 두 경계를 정의합니다.
//!
//! - [`PriceHistoryProvider`]: 종목별 일별 종가 시계열
//! - [`FundamentalsProvider`]: 종목별 펀더멘털 지표 맵 (선택 기능)
//!
//! 펀더멘털 기능의 유무는 [`FundamentalsSource`]로 명시적으로 전달합니다.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use folio_core::{FundamentalMetrics, PriceSeries};

use crate::error::Result;

/// 가격 이력 Provider.
///
/// 접미사 없는 티커를 받아 시장 접미사는 내부에서 붙입니다.
/// 종목을 찾지 못하면 오류 대신 `Ok(None)`을 반환합니다.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 날짜 오름차순, 중복 없는 종가 시계열 조회.
    async fn get_price(&self, symbol: &str) -> Result<Option<PriceSeries>>;
}

/// 펀더멘털 Provider.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 지표 이름 → 값 맵 조회.
    async fn get_fundamentals(&self, symbol: &str) -> Result<Option<FundamentalMetrics>>;
}

/// 펀더멘털 기능 유무.
///
/// `Unavailable`이면 모든 종목에 중립 점수가 적용되고 Provider 호출은 일어나지 않습니다.
#[derive(Clone, Default)]
pub enum FundamentalsSource {
    /// 펀더멘털 기능 없음
    #[default]
    Unavailable,
    /// 펀더멘털 Provider 사용
    Provider(Arc<dyn FundamentalsProvider>),
}

impl FundamentalsSource {
    /// Provider로부터 생성.
    pub fn from_provider(provider: Arc<dyn FundamentalsProvider>) -> Self {
        Self::Provider(provider)
    }

    /// 기능 사용 가능 여부.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// 사용 가능한 Provider.
    pub fn provider(&self) -> Option<&Arc<dyn FundamentalsProvider>> {
        match self {
            Self::Unavailable => None,
            Self::Provider(provider) => Some(provider),
        }
    }
}

impl fmt::Debug for FundamentalsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "FundamentalsSource::Unavailable"),
            Self::Provider(provider) => {
                write!(f, "FundamentalsSource::Provider({})", provider.name())
            }
        }
    }
}
