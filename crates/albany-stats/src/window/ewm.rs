//! Exponentially weighted windows.

use std::str::FromStr;

use derive_more::Display;
use polars::prelude::*;

use crate::columns::{ensure_numeric, restrict};
use crate::error::{Result, StatsError};

/// Decay specification for an exponentially weighted window.
///
/// Exactly one of `com`, `span`, `halflife`, and `alpha` must be set; each
/// is a different parameterization of the same smoothing factor
/// `alpha = 1/(1+com) = 2/(span+1) = 1 - exp(-ln 2 / halflife)`.
#[derive(Debug, Clone, Default)]
pub struct EwmConfig {
    /// Center of mass, `com >= 0`.
    pub com: Option<f64>,
    /// Span, `span >= 1`.
    pub span: Option<f64>,
    /// Half-life, `halflife > 0`.
    pub halflife: Option<f64>,
    /// Smoothing factor, `0 < alpha <= 1`.
    pub alpha: Option<f64>,
    /// Ignore nulls when weighting; when false (the default) weights are
    /// based on absolute positions, so intervening nulls still decay older
    /// observations.
    pub ignore_na: bool,
}

impl EwmConfig {
    /// Resolve the four parameterizations down to the smoothing factor.
    fn decay(&self) -> Result<f64> {
        match (self.com, self.span, self.halflife, self.alpha) {
            (Some(com), None, None, None) => {
                if com < 0.0 {
                    return Err(StatsError::invalid("com must be >= 0"));
                }
                Ok(1.0 / (1.0 + com))
            }
            (None, Some(span), None, None) => {
                if span < 1.0 {
                    return Err(StatsError::invalid("span must be >= 1"));
                }
                Ok(2.0 / (span + 1.0))
            }
            (None, None, Some(halflife), None) => {
                if halflife <= 0.0 {
                    return Err(StatsError::invalid("halflife must be > 0"));
                }
                Ok(1.0 - (-std::f64::consts::LN_2 / halflife).exp())
            }
            (None, None, None, Some(alpha)) => {
                if !(alpha > 0.0 && alpha <= 1.0) {
                    return Err(StatsError::invalid("alpha must be in (0, 1]"));
                }
                Ok(alpha)
            }
            _ => Err(StatsError::invalid(
                "pass exactly one of com, span, halflife, alpha",
            )),
        }
    }
}

/// Statistic computed over the exponentially weighted window.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum EwmKind {
    /// Weighted mean. The default.
    #[default]
    #[display("mean")]
    Mean,
    /// Weighted variance, bias corrected.
    #[display("var")]
    Var,
    /// Weighted standard deviation, bias corrected.
    #[display("std")]
    Std,
}

impl FromStr for EwmKind {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "mean" => Ok(Self::Mean),
            "var" => Ok(Self::Var),
            "std" => Ok(Self::Std),
            other => Err(StatsError::unsupported("ewm_type", other)),
        }
    }
}

/// Exponentially weighted statistic over every selected column.
///
/// Weights are adjusted (each output divides by the current weight sum) and
/// variance estimates are bias corrected. Variance and standard deviation
/// need two observations, so their first output row is null.
pub fn ewm(
    frame: &DataFrame,
    config: &EwmConfig,
    kind: EwmKind,
    headers: Option<&[String]>,
) -> Result<DataFrame> {
    let alpha = config.decay()?;
    let restricted = restrict(frame, headers)?;
    ensure_numeric(&restricted)?;

    let min_periods = match kind {
        EwmKind::Mean => 1,
        EwmKind::Var | EwmKind::Std => 2,
    };
    let exprs: Vec<Expr> = restricted
        .get_column_names()
        .iter()
        .map(|name| {
            let options = EWMOptions {
                alpha,
                adjust: true,
                bias: false,
                min_periods,
                ignore_nulls: config.ignore_na,
            };
            let column = col(name.as_str());
            match kind {
                EwmKind::Mean => column.ewm_mean(options),
                EwmKind::Var => column.ewm_var(options),
                EwmKind::Std => column.ewm_std(options),
            }
        })
        .collect();

    Ok(restricted.lazy().select(exprs).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn values(frame: &DataFrame, column: &str) -> Vec<Option<f64>> {
        frame
            .column(column)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("x".into(), vec![1.0f64, 2.0, 3.0]).into(),
        ])
        .unwrap()
    }

    fn alpha_half() -> EwmConfig {
        EwmConfig {
            alpha: Some(0.5),
            ..Default::default()
        }
    }

    #[test]
    fn test_ewm_mean_adjusted() {
        let out = ewm(&sample_frame(), &alpha_half(), EwmKind::Mean, None).unwrap();
        let mean = values(&out, "x");
        assert_relative_eq!(mean[0].unwrap(), 1.0);
        assert_relative_eq!(mean[1].unwrap(), 5.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(mean[2].unwrap(), 17.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ewm_var_bias_corrected() {
        let out = ewm(&sample_frame(), &alpha_half(), EwmKind::Var, None).unwrap();
        let var = values(&out, "x");
        assert_eq!(var[0], None);
        assert_relative_eq!(var[1].unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(var[2].unwrap(), 13.0 / 14.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ewm_std_is_sqrt_of_var() {
        let out = ewm(&sample_frame(), &alpha_half(), EwmKind::Std, None).unwrap();
        let std = values(&out, "x");
        assert_relative_eq!(std[1].unwrap(), 0.5f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(std[2].unwrap(), (13.0f64 / 14.0).sqrt(), epsilon = 1e-12);
    }

    #[rstest]
    #[case::com(EwmConfig { com: Some(1.0), ..Default::default() })]
    #[case::span(EwmConfig { span: Some(3.0), ..Default::default() })]
    #[case::halflife(EwmConfig { halflife: Some(1.0), ..Default::default() })]
    fn test_decay_parameterizations_agree(#[case] config: EwmConfig) {
        // com = 1, span = 3, and halflife = 1 all resolve to alpha = 0.5.
        let out = ewm(&sample_frame(), &config, EwmKind::Mean, None).unwrap();
        let mean = values(&out, "x");
        assert_relative_eq!(mean[1].unwrap(), 5.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(mean[2].unwrap(), 17.0 / 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_alpha_one_returns_series_itself() {
        let config = EwmConfig {
            alpha: Some(1.0),
            ..Default::default()
        };
        let out = ewm(&sample_frame(), &config, EwmKind::Mean, None).unwrap();
        assert_eq!(values(&out, "x"), vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_null_weighting() {
        let frame = DataFrame::new(vec![
            Series::new("x".into(), vec![Some(1.0f64), None, Some(3.0)]).into(),
        ])
        .unwrap();
        // Null positions still decay older observations by default.
        let out = ewm(&frame, &alpha_half(), EwmKind::Mean, None).unwrap();
        assert_relative_eq!(values(&out, "x")[2].unwrap(), 2.6, epsilon = 1e-12);

        let ignoring = EwmConfig {
            ignore_na: true,
            ..alpha_half()
        };
        let out = ewm(&frame, &ignoring, EwmKind::Mean, None).unwrap();
        assert_relative_eq!(values(&out, "x")[2].unwrap(), 7.0 / 3.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case::none(EwmConfig::default())]
    #[case::two(EwmConfig { com: Some(1.0), alpha: Some(0.5), ..Default::default() })]
    fn test_exactly_one_decay_parameter_required(#[case] config: EwmConfig) {
        let result = ewm(&sample_frame(), &config, EwmKind::Mean, None);
        assert!(matches!(
            result,
            Err(StatsError::InvalidParameter { reason })
                if reason == "pass exactly one of com, span, halflife, alpha"
        ));
    }

    #[rstest]
    #[case::negative_com(EwmConfig { com: Some(-0.1), ..Default::default() }, "com must be >= 0")]
    #[case::small_span(EwmConfig { span: Some(0.5), ..Default::default() }, "span must be >= 1")]
    #[case::zero_halflife(
        EwmConfig { halflife: Some(0.0), ..Default::default() },
        "halflife must be > 0"
    )]
    #[case::large_alpha(
        EwmConfig { alpha: Some(1.5), ..Default::default() },
        "alpha must be in (0, 1]"
    )]
    fn test_decay_bounds(#[case] config: EwmConfig, #[case] message: &str) {
        let result = ewm(&sample_frame(), &config, EwmKind::Mean, None);
        assert!(matches!(
            result,
            Err(StatsError::InvalidParameter { reason }) if reason == message
        ));
    }
}
