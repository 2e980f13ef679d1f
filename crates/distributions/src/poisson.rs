/// Largest `n` whose factorial is finite in `f64`.
pub const MAX_FINITE_FACTORIAL: u64 = 170;

/// A Poisson model with rate `λ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poisson {
    pub lambda: f64,
}

impl Poisson {
    pub fn new(lambda: f64) -> Self {
        Self { lambda: lambda.max(0.0) }
    }

    /// `P(X = k)`. Terms that overflow (very large `k` or `λ`) read as 0.
    pub fn pmf(&self, k: u64) -> f64 {
        let value = (-self.lambda).exp() * self.lambda.powi(k as i32) / factorial(k);
        if value.is_finite() { value } else { 0.0 }
    }

    /// `P(X ≤ x)`, summing the PMF up to `floor(x)`.
    pub fn cdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            return 0.0;
        }
        // Every term past the factorial limit is zero.
        let upper = (x.floor() as u64).min(MAX_FINITE_FACTORIAL);
        let total: f64 = (0..=upper).map(|k| self.pmf(k)).sum();
        total.clamp(0.0, 1.0)
    }
}

/// `n!` as a float, saturating to `+∞` above 170.
pub fn factorial(n: u64) -> f64 {
    if n > MAX_FINITE_FACTORIAL {
        return f64::INFINITY;
    }
    (2..=n).fold(1.0, |acc, i| acc * i as f64)
}

/// Poisson applies only to samples of non-negative whole numbers.
pub fn is_eligible(values: &[f64]) -> bool {
    values.iter().all(|v| *v >= 0.0 && v.fract() == 0.0)
}
