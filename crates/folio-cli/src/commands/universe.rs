//! 유니버스 조회 명령.

use folio_core::{MarketConfig, DEFAULT_UNIVERSE};
use folio_data::SymbolFormat;

/// 유니버스와 Yahoo 심볼을 테이블로 만듭니다.
pub fn format_universe<S: AsRef<str>>(universe: &[S], market: &MarketConfig) -> String {
    let format = SymbolFormat::from(market);
    let mut output = String::new();

    output.push_str(&format!("{:<4} {:<10} {:<14}\n", "#", "TICKER", "YAHOO_SYMBOL"));
    output.push_str(&"─".repeat(30));
    output.push('\n');
    for (i, symbol) in universe.iter().enumerate() {
        let symbol = symbol.as_ref();
        output.push_str(&format!(
            "{:<4} {:<10} {:<14}\n",
            i + 1,
            symbol,
            format.format(symbol)
        ));
    }
    output.push_str(&format!("\n총 {}개 종목\n", universe.len()));
    output
}

/// 유니버스를 출력합니다.
///
/// `use_default`가 `true`면 설정 파일과 관계없이 내장 기본 유니버스를 출력합니다.
pub fn print_universe(configured: &[String], market: &MarketConfig, use_default: bool) {
    let content = if use_default {
        format_universe(&DEFAULT_UNIVERSE[..], market)
    } else {
        format_universe(configured, market)
    };
    println!("{}", content);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_universe_applies_suffix() {
        let table = format_universe(&["comi", "ETEL.CA"][..], &MarketConfig::default());
        assert!(table.contains("COMI.CA"));
        assert!(table.contains("ETEL.CA"));
        assert!(!table.contains("ETEL.CA.CA"));
        assert!(table.contains("총 2개 종목"));
    }

    #[test]
    fn test_default_universe_size() {
        let table = format_universe(&DEFAULT_UNIVERSE[..], &MarketConfig::default());
        assert!(table.contains("ABUK.CA"));
        assert!(table.contains("총 15개 종목"));
    }
}
