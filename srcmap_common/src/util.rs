/// Rounds to one decimal place, the precision every reported percentage uses.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Returns `100 * part / whole`, or `0.0` when `whole` is zero.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
