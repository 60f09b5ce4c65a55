//! 멀티팩터 포트폴리오 빌더 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본 설정 (config/default.toml)으로 포트폴리오 구성
//! folio build
//!
//! # 자본, 종목 수, 최대 비중 지정
//! folio build --capital 250000 --max-stocks 5 --max-weight 0.25
//!
//! # 오프라인 스냅샷으로 구성, JSON 출력
//! folio build --snapshot data/egx_snapshot.json --format json
//!
//! # water-fill 방식으로 최대 비중 적용
//! folio build --symbols COMI,ETEL,SWDY,FWRY --cap-mode water-fill
//!
//! # 유니버스 보기
//! folio universe
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{error, info, warn};

use folio_cli::commands::build::{parse_symbols, run_build, BuildConfig, OutputFormat};
use folio_cli::commands::settings::{load_config, DEFAULT_CONFIG_PATH};
use folio_cli::commands::universe::print_universe;
use folio_core::{init_logging, CapMode, LogConfig};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Multi-factor portfolio builder - 위험 조정 수익률/모멘텀/펀더멘털 기반 배분", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 포트폴리오 구성 (팩터 점수 → 목표 비중 → 1주 단위 수량)
    Build {
        /// 투자 자본 (기본: 설정 파일 값)
        #[arg(long)]
        capital: Option<Decimal>,

        /// 최대 편입 종목 수
        #[arg(long)]
        max_stocks: Option<usize>,

        /// 종목당 최대 비중 (0 < w <= 1)
        #[arg(long)]
        max_weight: Option<Decimal>,

        /// 수익/위험 계산 룩백 거래일 수
        #[arg(long)]
        lookback: Option<usize>,

        /// 유니버스 (쉼표로 구분, 예: COMI,ETEL,SWDY)
        #[arg(long)]
        symbols: Option<String>,

        /// JSON 스냅샷 파일 (지정하면 Yahoo 대신 사용)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// 펀더멘털 조회 비활성화 (모든 종목 중립 점수 0.5)
        #[arg(long, default_value = "false")]
        no_fundamentals: bool,

        /// 최대 비중 적용 방식 (clip, water-fill)
        #[arg(long)]
        cap_mode: Option<String>,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 유니버스 보기
    Universe {
        /// 설정 파일 대신 내장 기본 유니버스 출력
        #[arg(long, default_value = "false")]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let loaded = load_config(&cli.config)?;
    let app = loaded.config;

    init_logging(LogConfig::from_settings(&app.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if loaded.from_file {
        info!(path = %cli.config, "설정 파일 로드 완료");
    } else {
        warn!(path = %cli.config, "설정 파일 없음, 기본값 사용");
    }

    match cli.command {
        Commands::Build {
            capital,
            max_stocks,
            max_weight,
            lookback,
            symbols,
            snapshot,
            no_fundamentals,
            cap_mode,
            format,
        } => {
            let cap_mode = cap_mode
                .map(|s| s.parse::<CapMode>())
                .transpose()
                .map_err(|e| anyhow::anyhow!("{}. Use: clip, water-fill", e))?;

            let config = BuildConfig {
                capital,
                max_stocks,
                max_weight,
                lookback,
                symbols: symbols.as_deref().map(parse_symbols),
                snapshot,
                no_fundamentals,
                cap_mode,
                format: OutputFormat::parse(&format)?,
            };

            match run_build(app.portfolio, app.market, config).await {
                Ok(held) => {
                    info!("✅ Portfolio built with {} positions", held);
                }
                Err(e) => {
                    error!("Portfolio build failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Universe { default } => {
            print_universe(&app.portfolio.universe, &app.market, default);
        }
    }

    Ok(())
}
