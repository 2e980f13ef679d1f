use std::f64::consts::{PI, SQRT_2};

/// A Normal model `N(μ, σ²)`.
///
/// `σ = 0` is treated as a point mass at `μ`: the CDF is a step and the
/// density is zero everywhere, so a constant sample never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    pub mean: f64,
    pub std_dev: f64,
}

impl Normal {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev: std_dev.abs() }
    }

    pub fn is_degenerate(&self) -> bool {
        self.std_dev == 0.0
    }

    pub fn pdf(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let z = (x - self.mean) / self.std_dev;
        (-0.5 * z * z).exp() / (self.std_dev * (2.0 * PI).sqrt())
    }

    pub fn cdf(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return if x < self.mean { 0.0 } else { 1.0 };
        }
        let z = (x - self.mean) / (self.std_dev * SQRT_2);
        (0.5 * (1.0 + erf(z))).clamp(0.0, 1.0)
    }

    /// `P(a < X < b)`; zero when `b <= a`.
    pub fn probability_between(&self, a: f64, b: f64) -> f64 {
        if b <= a {
            return 0.0;
        }
        (self.cdf(b) - self.cdf(a)).max(0.0)
    }
}

/// Error function, Abramowitz & Stegun 7.1.26 (|ε| ≤ 1.5e-7).
pub fn erf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }

    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn erf_matches_tabulated_values() {
        assert_eq!(erf(0.0), 0.0);
        assert_approx_eq!(erf(0.5), 0.520_499_877_8, 2e-7);
        assert_approx_eq!(erf(1.0), 0.842_700_792_9, 2e-7);
        assert_approx_eq!(erf(-1.0), -0.842_700_792_9, 2e-7);
        assert_approx_eq!(erf(3.0), 0.999_977_909_5, 2e-7);
    }

    #[test]
    fn standard_normal_cdf_and_pdf() {
        let n = Normal::new(0.0, 1.0);
        assert_approx_eq!(n.cdf(0.0), 0.5, 1e-9);
        assert_approx_eq!(n.cdf(1.96), 0.975, 1e-4);
        assert_approx_eq!(n.pdf(0.0), 0.398_942_280_4, 1e-9);
        assert_approx_eq!(n.probability_between(-1.0, 1.0), 0.6827, 1e-4);
        assert_eq!(n.probability_between(1.0, -1.0), 0.0);
    }

    #[test]
    fn zero_spread_is_a_point_mass() {
        let n = Normal::new(5.0, 0.0);
        assert_eq!(n.cdf(4.999), 0.0);
        assert_eq!(n.cdf(5.0), 1.0);
        assert_eq!(n.pdf(5.0), 0.0);
    }
}
