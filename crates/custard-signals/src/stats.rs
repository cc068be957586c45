//! Small numeric helpers shared by the detectors and aggregators.
//!
//! Every function returns `None` (or `0.0` where documented) instead of
//! dividing by zero.

#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    Some(values.iter().sum::<f64>() / n)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
#[must_use]
pub fn population_stddev(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    #[allow(clippy::cast_precision_loss)]
    let pos = q * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    #[allow(clippy::cast_precision_loss)]
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Pearson chi-squared statistic of `counts` against a uniform expectation
/// over all buckets. Returns `0.0` for an empty histogram.
#[must_use]
pub fn chi_squared_uniform(counts: &[u32]) -> f64 {
    let total: u32 = counts.iter().sum();
    if total == 0 || counts.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let expected = f64::from(total) / counts.len() as f64;
    counts
        .iter()
        .map(|&observed| (f64::from(observed) - expected).powi(2) / expected)
        .sum()
}

/// Percentage `part / whole * 100`, or `None` when `whole` is zero.
#[must_use]
pub fn pct(part: u32, whole: u32) -> Option<f64> {
    (whole > 0).then(|| f64::from(part) / f64::from(whole) * 100.0)
}

/// Round to a fixed number of decimal places for presentation.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
