//! 금액 계산을 위한 Decimal 유틸리티.
//!
//! 팩터 계산은 `f64`로, 자본/가격/수량 계산은 `Decimal`로 수행합니다.
//! 두 영역의 경계에서 f64 입력을 Decimal로 옮기는 변환 함수를 제공합니다.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 포트폴리오 비중 타입 (0.2 = 20%).
pub type Weight = Decimal;

/// f64를 Decimal로 변환합니다.
///
/// NaN/무한대이거나 Decimal 범위를 벗어나면 `None`을 반환합니다.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_from_f64_rejects_non_finite() {
        assert_eq!(decimal_from_f64(f64::NAN), None);
        assert_eq!(decimal_from_f64(f64::INFINITY), None);
        assert_eq!(decimal_from_f64(500.0), Some(dec!(500)));
    }

    #[test]
    fn test_decimal_from_f64_out_of_range() {
        assert_eq!(decimal_from_f64(1e30), None);
    }
}
