//! 설정 관리.
//!
//! 이 모듈은 포트폴리오 빌더 설정을 정의하고 관리합니다.
//! TOML 파일을 읽고 `FOLIO__` 접두사 환경 변수로 덮어씁니다.
//!
//! ```toml
//! [portfolio]
//! universe = ["COMI", "ETEL", "SWDY"]
//! lookback_days = 180
//! capital = 100000
//! max_stocks = 8
//! max_weight_per_stock = 0.2
//! cap_mode = "clip-renormalize"
//!
//! [portfolio.weights]
//! risk = 0.2
//! fundamentals = 0.5
//! momentum = 0.3
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PortfolioError, PortfolioResult};

/// 이집트 거래소(EGX) 기본 유니버스.
pub const DEFAULT_UNIVERSE: [&str; 15] = [
    "COMI", "ETEL", "EKHO", "AMOC", "CIEB", "SWDY", "ORHD", "ESRS", "FWRY", "HRHO", "EFIH",
    "ADIB", "DICE", "CCAP", "ABUK",
];

/// 가중치 합계 허용 오차.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 포트폴리오 설정
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    /// 시장/데이터 소스 설정
    #[serde(default)]
    pub market: MarketConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 팩터 가중치.
///
/// 세 가중치의 합은 1이어야 합니다.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FactorWeights {
    /// 위험 조정 수익률 가중치
    pub risk: f64,
    /// 펀더멘털 가중치
    pub fundamentals: f64,
    /// 모멘텀 가중치
    pub momentum: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            risk: 0.20,
            fundamentals: 0.50,
            momentum: 0.30,
        }
    }
}

impl FactorWeights {
    /// 새 가중치 생성.
    pub fn new(risk: f64, fundamentals: f64, momentum: f64) -> Self {
        Self {
            risk,
            fundamentals,
            momentum,
        }
    }

    /// 가중치 합계.
    pub fn sum(&self) -> f64 {
        self.risk + self.fundamentals + self.momentum
    }

    /// 가중치 검증: 각각 0 이상, 합계 1.
    pub fn validate(&self) -> PortfolioResult<()> {
        let all = [self.risk, self.fundamentals, self.momentum];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PortfolioError::InvalidParameter(format!(
                "팩터 가중치는 0 이상의 유한값이어야 합니다: {:?}",
                self
            )));
        }
        if (self.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PortfolioError::InvalidParameter(format!(
                "팩터 가중치 합계는 1이어야 합니다: {}",
                self.sum()
            )));
        }
        Ok(())
    }
}

/// 종목당 최대 비중 적용 방식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapMode {
    /// 상한으로 자른 뒤 합계 1로 재정규화.
    ///
    /// 여러 종목이 동시에 잘리면 재정규화 후 상한을 넘을 수 있습니다.
    #[default]
    ClipRenormalize,
    /// 상한 초과분을 상한 미만 종목에 비례 재분배 (반복).
    WaterFill,
}

impl std::str::FromStr for CapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clip" | "clip-renormalize" => Ok(Self::ClipRenormalize),
            "water-fill" | "waterfill" => Ok(Self::WaterFill),
            _ => Err(format!("Unknown cap mode: {}", s)),
        }
    }
}

/// 포트폴리오 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// 후보 종목 (접미사 없는 티커)
    pub universe: Vec<String>,
    /// 수익/위험 계산에 사용할 최근 거래일 수
    pub lookback_days: usize,
    /// 투자 자본
    pub capital: Decimal,
    /// 최대 편입 종목 수
    pub max_stocks: usize,
    /// 종목당 최대 비중 (0, 1]
    pub max_weight_per_stock: Decimal,
    /// 팩터 가중치
    pub weights: FactorWeights,
    /// 최대 비중 적용 방식
    pub cap_mode: CapMode,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            universe: DEFAULT_UNIVERSE.iter().map(|s| s.to_string()).collect(),
            lookback_days: 180,
            capital: dec!(100000),
            max_stocks: 8,
            max_weight_per_stock: dec!(0.2),
            weights: FactorWeights::default(),
            cap_mode: CapMode::default(),
        }
    }
}

impl PortfolioConfig {
    /// 빌더 수준 설정 검증 (유니버스, 룩백, 가중치).
    pub fn validate(&self) -> PortfolioResult<()> {
        if self.universe.is_empty() {
            return Err(PortfolioError::InvalidParameter(
                "유니버스가 비어 있습니다".to_string(),
            ));
        }
        if self.lookback_days < 2 {
            return Err(PortfolioError::InvalidParameter(format!(
                "lookback_days는 2 이상이어야 합니다: {}",
                self.lookback_days
            )));
        }
        self.weights.validate()
    }
}

/// 시장/데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketConfig {
    /// 거래소 심볼 접미사 (예: ".CA")
    pub suffix: String,
    /// 접미사 자동 추가 여부
    pub auto_suffix: bool,
    /// 펀더멘털 제공자 사용 여부
    pub fundamentals_enabled: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            suffix: ".CA".to_string(),
            auto_suffix: true,
            fundamentals_enabled: true,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("portfolio.universe")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// 전체 설정 검증.
    pub fn validate(&self) -> PortfolioResult<()> {
        self.portfolio.validate()
    }
}
