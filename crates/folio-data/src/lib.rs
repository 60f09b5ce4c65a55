//! 포트폴리오 빌더용 시장 데이터 Provider.
//!
//! 이 crate는 다음을 제공합니다:
//! - 가격 이력/펀더멘털 Provider 트레이트
//! - 펀더멘털 기능 유무를 나타내는 `FundamentalsSource`
//! - Yahoo Finance 구현
//! - 테스트/오프라인 실행용 메모리 Provider와 JSON 스냅샷

pub mod error;
pub mod memory;
pub mod provider;
pub mod yahoo;

pub use error::{DataError, Result};
pub use memory::{InMemoryMarketData, MarketSnapshot, SnapshotPoint};
pub use provider::{FundamentalsProvider, FundamentalsSource, PriceHistoryProvider};
pub use yahoo::{range_for_lookback, SymbolFormat, YahooFundamentalsProvider, YahooPriceProvider};
