//! A single fitted linear model.

use crate::error::Result;
use crate::family::ResolvedFamily;
use crate::solve::{self, ENET_L1_RATIO, FitOptions, FittedLinear, Penalty};
use ndarray::{Array1, Array2, ArrayView2};

/// One linear model fitted under a [`ResolvedFamily`].
///
/// Cross-validated families first select a penalty over their alpha grid,
/// then refit on the full data with the winner.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    fitted: FittedLinear,
    selected_alpha: Option<f64>,
}

impl LinearModel {
    /// Fits the family on a dense feature matrix and target matrix.
    ///
    /// `x` is `rows x features`, `y` is `rows x targets`. Single-task
    /// families reject more than one target column.
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView2<'_, f64>,
        family: &ResolvedFamily,
        options: FitOptions,
    ) -> Result<Self> {
        let template = match family {
            ResolvedFamily::Ordinary => Penalty::None,
            ResolvedFamily::RidgeCv { .. } => Penalty::Ridge { alpha: 0.0 },
            ResolvedFamily::LassoCv { .. } => Penalty::ElasticNet {
                alpha: 0.0,
                l1_ratio: 1.0,
            },
            ResolvedFamily::ElasticNetCv { .. } => Penalty::ElasticNet {
                alpha: 0.0,
                l1_ratio: ENET_L1_RATIO,
            },
            ResolvedFamily::MultiTaskElasticNetCv { .. } => Penalty::MultiTaskElasticNet {
                alpha: 0.0,
                l1_ratio: ENET_L1_RATIO,
            },
        };
        let (penalty, selected_alpha) = match family {
            ResolvedFamily::Ordinary => (template, None),
            ResolvedFamily::RidgeCv { alphas, folds }
            | ResolvedFamily::LassoCv { alphas, folds }
            | ResolvedFamily::ElasticNetCv { alphas, folds }
            | ResolvedFamily::MultiTaskElasticNetCv { alphas, folds } => {
                let alpha = solve::select_alpha(x, y, alphas, *folds, template, options)?;
                (template.with_alpha(alpha), Some(alpha))
            }
        };
        let fitted = solve::fit_penalized(x, y, penalty, options)?;
        Ok(Self {
            fitted,
            selected_alpha,
        })
    }

    /// Feature weights, one column per target.
    pub fn coefficients(&self) -> &Array2<f64> {
        self.fitted.coefficients()
    }

    /// Per-target intercepts.
    pub fn intercept(&self) -> &Array1<f64> {
        self.fitted.intercept()
    }

    /// The penalty chosen by cross-validation, `None` for the ordinary family.
    pub fn selected_alpha(&self) -> Option<f64> {
        self.selected_alpha
    }

    /// Predicts one column per target from a feature matrix with the same
    /// width the model was fitted on.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        Ok(self.fitted.predict(x)?)
    }
}
