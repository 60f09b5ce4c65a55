//! # Folio Engine
//!
//! 멀티팩터 점수 계산과 배분 엔진.
//!
//! - [`factors`]: 수익/위험, 모멘텀, 펀더멘털 원시 팩터
//! - [`normalize`]: min-max 정규화
//! - [`ranking`]: 가중 합 종합 점수와 순위
//! - [`allocation`]: 목표 비중, 최대 비중 적용, 1주 단위 수량 계산
//! - [`builder`]: 전체 파이프라인을 실행하는 [`PortfolioBuilder`]
//!
//! # 예제
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use folio_data::InMemoryMarketData;
//! use folio_engine::PortfolioBuilder;
//! use rust_decimal_macros::dec;
//!
//! let data = Arc::new(InMemoryMarketData::from_snapshot_file("snapshot.json")?);
//! let builder = PortfolioBuilder::new(&["COMI", "ETEL"], data);
//! let build = builder.build_portfolio(dec!(100000), 8, dec!(0.2)).await?;
//! ```

pub mod allocation;
pub mod builder;
pub mod factors;
pub mod normalize;
pub mod ranking;

pub use allocation::{apply_cap, Allocation, AllocationEngine};
pub use builder::{PortfolioBuilder, DEFAULT_LOOKBACK_DAYS};
pub use factors::{score_fundamentals, Momentum, ReturnRisk};
pub use normalize::min_max_normalize;
pub use ranking::rank;
