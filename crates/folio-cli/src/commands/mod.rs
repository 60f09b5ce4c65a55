//! CLI 명령어 구현 모듈.

pub mod build;
pub mod settings;
pub mod universe;
