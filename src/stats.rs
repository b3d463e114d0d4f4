use num::ToPrimitive;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean<T: ToPrimitive + Copy>(values: &[T]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().filter_map(|v| v.to_f64()).sum();
    Some(sum / values.len() as f64)
}

/// Round to two decimals using the exact decimal expansion of `value`.
///
/// `2.675` is stored as `2.67499...` and therefore rounds down.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// `part / whole` as a percentage rounded to two decimals.
pub fn percentage(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(round2(part as f64 / whole as f64 * 100.0))
}
