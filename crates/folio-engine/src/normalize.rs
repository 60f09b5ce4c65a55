//! Min-max 정규화.

/// 값이 모두 같거나 범위를 정할 수 없을 때의 정규화 값.
pub const DEGENERATE_VALUE: f64 = 0.5;

/// 값 목록을 `[0, 1]`로 min-max 스케일링합니다.
///
/// 유한한 값만으로 최소/최대를 구합니다. 최소와 최대가 같거나 유한한 값이 없으면
/// 모든 항목이 0.5가 됩니다. 유한하지 않은 항목도 0.5로 채웁니다.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() || max == min {
        return vec![DEGENERATE_VALUE; values.len()];
    }

    let range = max - min;
    values
        .iter()
        .map(|v| {
            if v.is_finite() {
                ((v - min) / range).clamp(0.0, 1.0)
            } else {
                DEGENERATE_VALUE
            }
        })
        .collect()
}
