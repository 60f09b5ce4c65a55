//! # Folio Core
//!
//! 멀티팩터 포트폴리오 빌더의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 가격 시계열 및 펀더멘털 지표 맵
//! - 팩터 레코드와 정규화 점수 레코드
//! - 배분 결과 행과 포트폴리오 빌드 결과
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
