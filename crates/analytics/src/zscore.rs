use crate::error::AnalyticsError;
use core_types::ConfidenceLevel;

// Abramowitz & Stegun 26.2.23 rational approximation coefficients.
const C0: f64 = 2.515517;
const C1: f64 = 0.802853;
const C2: f64 = 0.010328;
const D1: f64 = 1.432788;
const D2: f64 = 0.189269;
const D3: f64 = 0.001308;

/// Two-sided critical value `z` for a confidence level in `(0, 1)`.
///
/// The four enumerated levels use the fixed table; any other level falls back
/// to a closed-form inverse-normal approximation (|ε| < 4.5e-4). This is a
/// large-sample interval: no t-distribution correction is applied.
pub fn critical_value(level: f64) -> Result<f64, AnalyticsError> {
    if !(level > 0.0 && level < 1.0) {
        return Err(AnalyticsError::InvalidInput {
            field: "confidence_level",
            reason: format!("must lie strictly between 0 and 1 (got {level})"),
        });
    }
    if let Ok(known) = ConfidenceLevel::try_from(level) {
        return Ok(known.z_score());
    }
    let upper_tail = (1.0 - level) / 2.0;
    Ok(upper_tail_quantile(upper_tail))
}

/// `x` such that `P(Z > x) = q` for `0 < q <= 0.5`.
fn upper_tail_quantile(q: f64) -> f64 {
    let t = (-2.0 * q.ln()).sqrt();
    t - (C0 + C1 * t + C2 * t * t) / (1.0 + D1 * t + D2 * t * t + D3 * t * t * t)
}
