//! 포트폴리오 빌더 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 설정 파일 로드와 명령줄 오버라이드
//! - 포트폴리오 구성 및 결과 출력 (table, json)
//! - 유니버스 조회

pub mod commands;
