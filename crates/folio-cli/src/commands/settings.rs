//! 설정 파일 로드.

use anyhow::{Context, Result};
use std::path::Path;

use folio_core::AppConfig;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 로드된 설정과 출처.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// 파일에서 로드했으면 `true`, 기본값이면 `false`
    pub from_file: bool,
}

/// 설정 파일을 로드합니다.
///
/// 기본 경로의 파일이 없으면 내장 기본값을 사용하고,
/// 명시적으로 지정한 파일이 없으면 에러를 반환합니다.
pub fn load_config(path: &str) -> Result<LoadedConfig> {
    if !Path::new(path).exists() {
        if path == DEFAULT_CONFIG_PATH {
            return Ok(LoadedConfig {
                config: AppConfig::default(),
                from_file: false,
            });
        }
        anyhow::bail!("Config file not found: {}", path);
    }

    let config = AppConfig::load(path)
        .with_context(|| format!("Failed to load config file: {}", path))?;
    Ok(LoadedConfig {
        config,
        from_file: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_falls_back() {
        // 테스트 작업 디렉토리(crate 루트)에는 config/default.toml이 없음
        let loaded = load_config(DEFAULT_CONFIG_PATH).unwrap();
        assert!(!loaded.from_file);
        assert_eq!(loaded.config.portfolio.max_stocks, 8);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        assert!(load_config("does/not/exist.toml").is_err());
    }
}
