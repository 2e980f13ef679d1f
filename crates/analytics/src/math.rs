//! Numeric building blocks shared by the calculators.
//!
//! The helpers take plain slices and never allocate state between calls.
//! Callers are expected to pass non-empty, finite data; the functions that can
//! still be undefined (fewer points than the statistic needs, zero spread)
//! return `None` instead of `NaN`.

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by `n`).
pub fn population_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation; `None` with zero spread.
fn spread(values: &[f64], mean: f64) -> Option<f64> {
    Some(population_variance(values, mean).sqrt()).filter(|sigma| *sigma > 0.0)
}

/// Median of already-sorted data (averages the middle pair for even lengths).
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Percentile `p` (0..=100) of sorted data, linear interpolation at rank
/// `p/100 * (n - 1)`.
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Values sharing the highest frequency, ascending.
///
/// `None` when there are as many modes as values, i.e. nothing repeats.
pub fn modes_of_sorted(sorted: &[f64]) -> Option<Vec<f64>> {
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &value in sorted {
        match runs.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => runs.push((value, 1)),
        }
    }
    let max = runs.iter().map(|(_, count)| *count).max()?;
    let modes: Vec<f64> = runs
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(value, _)| value)
        .collect();
    (modes.len() < sorted.len()).then_some(modes)
}

/// Skewness `n/((n-1)(n-2)) * sum(((x - mean)/sigma)^3)` with the population
/// sigma, the same sigma the dispersion measures report. `None` below three
/// points or with zero spread.
pub fn skewness(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let sigma = spread(values, mean)?;
    let n = n as f64;
    let sum_cubed: f64 = values.iter().map(|x| ((x - mean) / sigma).powi(3)).sum();
    Some(n / ((n - 1.0) * (n - 2.0)) * sum_cubed)
}

/// Excess kurtosis with the adjusted `n(n+1)/((n-1)(n-2)(n-3))` lead and the
/// population sigma. `None` below four points or with zero spread.
pub fn excess_kurtosis(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let sigma = spread(values, mean)?;
    let n = n as f64;
    let sum_fourth: f64 = values.iter().map(|x| ((x - mean) / sigma).powi(4)).sum();
    let lead = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let correction = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    Some(lead * sum_fourth - correction)
}

/// Least-squares slope of `values` against their index `0..n`.
/// `None` below two points.
pub fn ols_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });
    Some(num / den)
}

/// Tukey fences `(Q1 - k*IQR, Q3 + k*IQR)` with the quartiles and IQR.
pub fn tukey_fences(sorted: &[f64], k: f64) -> (f64, f64, f64, f64, f64) {
    let q1 = percentile_of_sorted(sorted, 25.0);
    let q3 = percentile_of_sorted(sorted, 75.0);
    let iqr = q3 - q1;
    (q1 - k * iqr, q3 + k * iqr, q1, q3, iqr)
}
