//! Linear model families and their resolved cross-validation parameters.

use crate::error::ForecastError;
use derive_more::Display;
use std::str::FromStr;

/// Number of points in the default alpha grid.
const DEFAULT_GRID_POINTS: usize = 20;

/// Default penalty grid for the cross-validated families: 20 logarithmically
/// spaced points from 10⁻² to 10¹.
pub fn default_alpha_grid() -> Vec<f64> {
    let span = (DEFAULT_GRID_POINTS - 1) as f64;
    (0..DEFAULT_GRID_POINTS)
        .map(|i| 10f64.powf(-2.0 + 3.0 * i as f64 / span))
        .collect()
}

/// The supported linear model families.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelFamily {
    /// Ordinary least squares.
    #[default]
    #[display("ordinary")]
    Ordinary,
    /// Ridge regression with cross-validated penalty.
    #[display("ridge-cv")]
    RidgeCv,
    /// Lasso with cross-validated penalty (single target only).
    #[display("lasso-cv")]
    LassoCv,
    /// Elastic net with cross-validated penalty (single target only).
    #[display("elastic-net-cv")]
    ElasticNetCv,
    /// Multi-task elastic net with cross-validated penalty.
    #[display("multi-task-elastic-net-cv")]
    MultiTaskElasticNetCv,
}

impl ModelFamily {
    /// Whether this family selects its penalty by cross-validation.
    pub const fn is_cross_validated(self) -> bool {
        !matches!(self, Self::Ordinary)
    }
}

impl FromStr for ModelFamily {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordinary" => Ok(Self::Ordinary),
            "ridge-cv" => Ok(Self::RidgeCv),
            "lasso-cv" => Ok(Self::LassoCv),
            "elastic-net-cv" => Ok(Self::ElasticNetCv),
            "multi-task-elastic-net-cv" => Ok(Self::MultiTaskElasticNetCv),
            other => Err(ForecastError::InvalidConfiguration {
                reason: format!("unknown model_family {other}"),
            }),
        }
    }
}

/// A model family with its cross-validation parameters resolved.
///
/// Built during configuration validation; the cross-validation knobs cannot
/// reach the ordinary variant, and every cross-validated variant carries a
/// non-empty, strictly positive alpha grid.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedFamily {
    /// Ordinary least squares.
    Ordinary,
    /// Ridge regression over an alpha grid.
    RidgeCv {
        /// Candidate penalties
        alphas: Vec<f64>,
        /// Fold count
        folds: usize,
    },
    /// Lasso over an alpha grid.
    LassoCv {
        /// Candidate penalties
        alphas: Vec<f64>,
        /// Fold count
        folds: usize,
    },
    /// Elastic net over an alpha grid.
    ElasticNetCv {
        /// Candidate penalties
        alphas: Vec<f64>,
        /// Fold count
        folds: usize,
    },
    /// Multi-task elastic net over an alpha grid.
    MultiTaskElasticNetCv {
        /// Candidate penalties
        alphas: Vec<f64>,
        /// Fold count
        folds: usize,
    },
}

impl ResolvedFamily {
    /// The alpha grid in use, if this family cross-validates.
    pub fn alphas(&self) -> Option<&[f64]> {
        match self {
            Self::Ordinary => None,
            Self::RidgeCv { alphas, .. }
            | Self::LassoCv { alphas, .. }
            | Self::ElasticNetCv { alphas, .. }
            | Self::MultiTaskElasticNetCv { alphas, .. } => Some(alphas),
        }
    }
}
