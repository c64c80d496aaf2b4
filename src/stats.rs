// ===============================
// src/stats.rs
// ===============================
//
// Rolling estimators shared by the strategies. Every series is a bounded
// FIFO window stored as a plain vector inside TraderState, so all
// functions here are free functions over slices.

/// Append `value`, then truncate to the last `window` elements.
pub fn push_bounded(series: &mut Vec<f64>, value: f64, window: usize) {
    series.push(value);
    if series.len() > window {
        let excess = series.len() - window;
        series.drain(..excess);
    }
}

/// Arithmetic mean. Callers guarantee a non-empty series (histories are
/// always seeded with at least the current value before averaging).
pub fn mean(series: &[f64]) -> f64 {
    series.iter().sum::<f64>() / series.len() as f64
}

/// Sample standard deviation (n - 1 denominator). 0 for fewer than two
/// observations.
pub fn sample_stdev(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let m = mean(series);
    let var = series.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (series.len() - 1) as f64;
    var.sqrt()
}

/// Z-score of `value` against the rolling window. Neutral (0) until the
/// window holds `window` observations, and whenever the window is flat.
pub fn z_score(series: &[f64], window: usize, value: f64) -> f64 {
    if series.len() < window {
        return 0.0;
    }
    let sd = sample_stdev(series);
    if sd == 0.0 {
        return 0.0;
    }
    (value - mean(series)) / sd
}

/// Median of a non-empty series.
pub fn median(series: &[f64]) -> f64 {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
