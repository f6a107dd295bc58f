//! Serial-dependence measures.
//!
//! [`acf`] estimates the autocorrelation function of a single series and
//! [`pacf`] its partial counterpart, each with optional confidence bands.

pub mod acf;
pub mod pacf;

pub use acf::{AcfOptions, MissingPolicy, acf};
pub use pacf::{PacfMethod, PacfOptions, pacf};

/// Autocovariance of a series for lags `0..=nlags`, after demeaning.
///
/// The biased estimator divides every lag by `n`; the unbiased one divides
/// lag `k` by `n - k`. Callers keep `nlags < n`.
pub(crate) fn autocovariance(values: &[f64], nlags: usize, unbiased: bool) -> Vec<f64> {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let demeaned: Vec<f64> = values.iter().map(|v| v - mean).collect();
    (0..=nlags)
        .map(|lag| {
            let cross: f64 = demeaned[..n - lag]
                .iter()
                .zip(&demeaned[lag..])
                .map(|(a, b)| a * b)
                .sum();
            let divisor = if unbiased { n - lag } else { n };
            cross / divisor as f64
        })
        .collect()
}

/// Standard normal quantile by Acklam's rational approximation.
///
/// Absolute error stays below 1.2e-9 over the open unit interval, which is
/// plenty for confidence bands. Callers keep `p` strictly inside `(0, 1)`.
pub(crate) fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];
    const P_LOW: f64 = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_autocovariance_divisors() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let biased = autocovariance(&x, 2, false);
        assert_relative_eq!(biased[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(biased[1], 0.8, epsilon = 1e-12);
        assert_relative_eq!(biased[2], -0.2, epsilon = 1e-12);
        let unbiased = autocovariance(&x, 2, true);
        assert_relative_eq!(unbiased[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(unbiased[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(unbiased[2], -1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_quantile_known_values() {
        assert_relative_eq!(normal_quantile(0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normal_quantile(0.975), 1.959963984540054, epsilon = 1e-8);
        assert_relative_eq!(normal_quantile(0.025), -1.959963984540054, epsilon = 1e-8);
        // Exercises the tail branch below 0.02425.
        assert_relative_eq!(normal_quantile(0.001), -3.090232306167813, epsilon = 1e-8);
        assert_relative_eq!(normal_quantile(0.999), 3.090232306167813, epsilon = 1e-8);
    }
}
