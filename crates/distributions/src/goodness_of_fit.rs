use serde::{Deserialize, Serialize};

/// Coefficient of the asymptotic 5% Kolmogorov-Smirnov critical value.
const KS_COEFFICIENT_5PCT: f64 = 1.36;

/// One-sample Kolmogorov-Smirnov result.
///
/// The critical value is fixed at the 5% level and the p-value is the
/// asymptotic first-term approximation, clamped into `[0, 1]`. Both are
/// heuristics for ranking models, not a rigorous test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodnessOfFit {
    pub test: KsTest,
    pub statistic: f64,
    pub critical_value: f64,
    pub p_value: f64,
    pub significance_level: f64,
    pub reject_null: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KsTest {
    #[serde(rename = "kolmogorov-smirnov")]
    KolmogorovSmirnov,
}

/// Runs the KS test of `sorted` against `cdf`.
///
/// The empirical CDF at the i-th sorted value (1-based) is `i/n`.
pub fn kolmogorov_smirnov<F>(sorted: &[f64], cdf: F) -> GoodnessOfFit
where
    F: Fn(f64) -> f64,
{
    let n = sorted.len() as f64;
    let statistic = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| ((i + 1) as f64 / n - cdf(x)).abs())
        .fold(0.0, f64::max);

    let critical_value = KS_COEFFICIENT_5PCT / n.sqrt();
    let scaled = statistic * n.sqrt();
    let p_value = (2.0 * (-2.0 * scaled * scaled).exp()).clamp(0.0, 1.0);

    GoodnessOfFit {
        test: KsTest::KolmogorovSmirnov,
        statistic,
        critical_value,
        p_value,
        significance_level: 0.05,
        reject_null: statistic > critical_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn uniform_grid_against_uniform_cdf() {
        let sorted = [0.2, 0.4, 0.6, 0.8, 1.0];
        let gof = kolmogorov_smirnov(&sorted, |x| x.clamp(0.0, 1.0));
        assert_approx_eq!(gof.statistic, 0.0, 1e-12);
        assert!(!gof.reject_null);
        assert_eq!(gof.p_value, 1.0);
    }

    #[test]
    fn wrong_model_is_rejected() {
        let sorted: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let gof = kolmogorov_smirnov(&sorted, |_| 1.0);
        assert!(gof.reject_null);
        assert!(gof.p_value < 0.05);
        assert_approx_eq!(gof.critical_value, 1.36 / 50f64.sqrt(), 1e-12);
    }
}
