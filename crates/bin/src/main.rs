//! Albany CLI binary.
//!
//! One subcommand per table operation, all sharing the same CSV-in,
//! JSON-or-CSV-out plumbing from [`io`].

mod io;

use albany::forecast::{
    ForecastConfig, ForecastEngine, ForecastOptions, LogisticOptions, ModelFamily, OffsetOptions,
    linear_offset, logistic_offset,
};
use albany::stats::{
    AcfOptions, CorrelateOptions, CorrelationMethod, DecompositionModel, EwmConfig, EwmKind,
    InterpolateMethod, Language, MissingPolicy, PacfMethod, PacfOptions, RollKind, SeasonalOptions,
    SsaGrouping, SsaOptions, SsaWindow, acf, correlate, describe, ewm, interpolate, pacf, roll,
    seasonal, ssa,
};
use clap::{ArgAction, Parser, Subcommand};
use io::{IoArgs, SelectArgs};
use std::process;

#[derive(Parser)]
#[command(name = "albany")]
#[command(about = "Albany: localized table statistics and linear forecasting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary statistics per column, labeled in the chosen language
    Describe {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        select: SelectArgs,

        /// Language of the statistic labels
        #[arg(short = 'l', long, default_value = "pt")]
        lang: Language,
    },

    /// Correlation matrix over the numeric columns
    Correlate {
        #[command(flatten)]
        io: IoArgs,

        /// Correlation method
        #[arg(long, default_value = "pearson")]
        method: CorrelationMethod,

        /// Minimum complete observations per column pair
        #[arg(long, default_value_t = 1)]
        min_periods: usize,

        /// Language of the header-label column
        #[arg(short = 'l', long, default_value = "pt")]
        lang: Language,
    },

    /// Rolling window statistics over each column
    Roll {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        select: SelectArgs,

        /// Number of rows per window
        #[arg(long)]
        window: usize,

        /// Statistic computed over each window
        #[arg(short = 't', long, default_value = "mean")]
        roll_type: RollKind,
    },

    /// Exponentially weighted statistics over each column
    Ewm {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        select: SelectArgs,

        /// Decay expressed as center of mass
        #[arg(long)]
        com: Option<f64>,

        /// Decay expressed as span
        #[arg(long)]
        span: Option<f64>,

        /// Decay expressed as half-life
        #[arg(long)]
        halflife: Option<f64>,

        /// Decay as a smoothing factor in (0, 1]
        #[arg(long)]
        alpha: Option<f64>,

        /// Ignore missing values when weighting
        #[arg(long)]
        ignore_na: bool,

        /// Statistic computed over the weighted history
        #[arg(short = 't', long, default_value = "mean")]
        ewm_type: EwmKind,
    },

    /// Fill missing values in each column
    Interpolate {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        select: SelectArgs,

        /// Interpolation method
        #[arg(long, default_value = "linear")]
        method: InterpolateMethod,

        /// Cap on consecutive filled values
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Autocorrelation of a single column by lag
    Acf {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        select: SelectArgs,

        /// Scale covariances by n-k instead of n
        #[arg(long)]
        unbiased: bool,

        /// Number of lags
        #[arg(long, default_value_t = 40)]
        nlags: usize,

        /// Confidence level for the Bartlett intervals
        #[arg(long)]
        alpha: Option<f64>,

        /// Treatment of missing values
        #[arg(long, default_value = "none")]
        missing: MissingPolicy,
    },

    /// Partial autocorrelation of a single column by lag
    Pacf {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        select: SelectArgs,

        /// Number of lags
        #[arg(short = 'n', long, default_value_t = 40)]
        nlags: usize,

        /// Estimation method
        #[arg(short = 'm', long, default_value = "ywunbiased")]
        method: PacfMethod,

        /// Confidence level for the intervals
        #[arg(short = 'a', long)]
        alpha: Option<f64>,
    },

    /// Seasonal decomposition of each column
    Decompose {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        select: SelectArgs,

        /// Composition of the components
        #[arg(short = 'm', long, default_value = "additive")]
        model: DecompositionModel,

        /// Length of the seasonal cycle in rows
        #[arg(long, visible_alias = "freq")]
        period: usize,

        /// Center the trend filter instead of trailing it
        #[arg(short = 't', long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
        two_sided: bool,

        /// Rows of trend extrapolated into the filter margins
        #[arg(short = 'e', long, default_value_t = 0)]
        extrapolate_trend: usize,

        /// Language of the component labels
        #[arg(short = 'l', long, default_value = "pt")]
        lang: Language,
    },

    /// Singular spectrum analysis of each column
    Ssa {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        select: SelectArgs,

        /// Trajectory window length in rows
        #[arg(short = 'w', long, default_value_t = 4)]
        window_size: usize,

        /// Trajectory window as a fraction of the series length
        #[arg(long, conflicts_with = "window_size")]
        window_fraction: Option<f64>,

        /// Number of contiguous component groups
        #[arg(short = 'g', long)]
        groups: Option<usize>,

        /// Explicit component group as a comma-separated list; repeatable
        #[arg(long = "group", value_name = "COMPONENTS", conflicts_with = "groups")]
        group: Vec<String>,
    },

    /// Multi-horizon linear forecast of the predictor columns
    Forecast {
        #[command(flatten)]
        io: IoArgs,

        /// Number of look-ahead horizons to fit
        #[arg(short = 't', long, default_value_t = 1, visible_alias = "ts")]
        time_step: usize,

        /// Linear model family
        #[arg(short = 'l', long, default_value = "ordinary", visible_alias = "lt")]
        linear_type: ModelFamily,

        /// Columns used as model features; every column when absent
        #[arg(short = 'r', long, num_args = 0.., value_name = "COLUMN")]
        regressors: Vec<String>,

        /// Columns to predict
        #[arg(short = 'p', long, num_args = 1.., required = true, value_name = "COLUMN")]
        predictors: Vec<String>,

        /// Fold count for the cross-validated families
        #[arg(long, default_value_t = 5)]
        cv: usize,

        /// Penalty grid for the cross-validated families
        #[arg(long, num_args = 0.., value_name = "ALPHA")]
        alphas: Vec<f64>,

        /// Fit an intercept
        #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
        fit_intercept: bool,

        /// Rescale centered features to unit norm
        #[arg(long)]
        normalize: bool,
    },

    /// Linear regression at a single row offset
    Regress {
        #[command(flatten)]
        io: IoArgs,

        /// Row shift between features and targets
        #[arg(long, default_value_t = 1, visible_alias = "off")]
        offset: usize,

        /// Columns used as model features; every column when absent
        #[arg(short = 'r', long, num_args = 0.., value_name = "COLUMN")]
        regressors: Vec<String>,

        /// Columns to predict
        #[arg(short = 'p', long, num_args = 1.., required = true, value_name = "COLUMN")]
        predictors: Vec<String>,

        /// Fit an intercept
        #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL", visible_alias = "fi")]
        fit_intercept: bool,

        /// Rescale centered features to unit norm
        #[arg(short = 'n', long)]
        normalize: bool,
    },

    /// Logistic classification at a single row offset
    Logistic {
        #[command(flatten)]
        io: IoArgs,

        /// Row shift between features and targets
        #[arg(long, default_value_t = 1, visible_alias = "off")]
        offset: usize,

        /// Columns used as model features; every column when absent
        #[arg(short = 'r', long, num_args = 0.., value_name = "COLUMN")]
        regressors: Vec<String>,

        /// Column holding the class labels
        #[arg(short = 'p', long, num_args = 1.., required = true, value_name = "COLUMN")]
        predictors: Vec<String>,

        /// Inverse regularization strength
        #[arg(long, default_value_t = 1.0)]
        c: f64,

        /// Convergence tolerance of the solver
        #[arg(long, default_value_t = 1e-4)]
        tol: f64,

        /// Iteration cap of the solver
        #[arg(long, default_value_t = 100)]
        max_iter: usize,

        /// Fit an intercept
        #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
        fit_intercept: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Describe { io, select, lang } => {
            let table = io.load()?;
            let result = describe(&table.frame, lang, select.headers.as_deref())?;
            io.write(table.index, result)?;
        }
        Commands::Correlate {
            io,
            method,
            min_periods,
            lang,
        } => {
            let options = CorrelateOptions {
                method,
                min_periods,
                language: lang,
            };
            let table = io.load()?;
            let result = correlate(&table.frame, &options)?;
            io.write(table.index, result)?;
        }
        Commands::Roll {
            io,
            select,
            window,
            roll_type,
        } => {
            let table = io.load()?;
            let result = roll(&table.frame, window, roll_type, select.headers.as_deref())?;
            io.write(table.index, result)?;
        }
        Commands::Ewm {
            io,
            select,
            com,
            span,
            halflife,
            alpha,
            ignore_na,
            ewm_type,
        } => {
            let config = EwmConfig {
                com,
                span,
                halflife,
                alpha,
                ignore_na,
            };
            let table = io.load()?;
            let result = ewm(&table.frame, &config, ewm_type, select.headers.as_deref())?;
            io.write(table.index, result)?;
        }
        Commands::Interpolate {
            io,
            select,
            method,
            limit,
        } => {
            let table = io.load()?;
            let result = interpolate(&table.frame, method, limit, select.headers.as_deref())?;
            io.write(table.index, result)?;
        }
        Commands::Acf {
            io,
            select,
            unbiased,
            nlags,
            alpha,
            missing,
        } => {
            let options = AcfOptions {
                unbiased,
                nlags,
                alpha,
                missing,
            };
            let table = io.load()?;
            let result = acf(&table.frame, &options, select.headers.as_deref())?;
            io.write(table.index, result)?;
        }
        Commands::Pacf {
            io,
            select,
            nlags,
            method,
            alpha,
        } => {
            let options = PacfOptions {
                nlags,
                method,
                alpha,
            };
            let table = io.load()?;
            let result = pacf(&table.frame, &options, select.headers.as_deref())?;
            io.write(table.index, result)?;
        }
        Commands::Decompose {
            io,
            select,
            model,
            period,
            two_sided,
            extrapolate_trend,
            lang,
        } => {
            let options = SeasonalOptions {
                model,
                period,
                two_sided,
                extrapolate_trend,
                language: lang,
            };
            let table = io.load()?;
            let result = seasonal(&table.frame, &options, select.headers.as_deref())?;
            io.write(table.index, result)?;
        }
        Commands::Ssa {
            io,
            select,
            window_size,
            window_fraction,
            groups,
            group,
        } => {
            let options = SsaOptions {
                window: window_fraction.map_or(SsaWindow::Rows(window_size), SsaWindow::Fraction),
                groups: if let Some(count) = groups {
                    SsaGrouping::Count(count)
                } else if group.is_empty() {
                    SsaGrouping::None
                } else {
                    SsaGrouping::Explicit(parse_groups(&group)?)
                },
            };
            let table = io.load()?;
            let result = ssa(&table.frame, &options, select.headers.as_deref())?;
            io.write(table.index, result)?;
        }
        Commands::Forecast {
            io,
            time_step,
            linear_type,
            regressors,
            predictors,
            cv,
            alphas,
            fit_intercept,
            normalize,
        } => {
            let options = ForecastOptions {
                regressor_columns: (!regressors.is_empty()).then_some(regressors),
                horizon_count: time_step,
                model_family: linear_type,
                fit_intercept,
                normalize,
                cv_folds: cv,
                alpha_grid: (!alphas.is_empty()).then_some(alphas),
            };
            let table = io.load()?;
            let config = ForecastConfig::new(&table.frame, None, &predictors, options)?;
            let mut engine = ForecastEngine::new(config);
            let result = engine.run()?;
            io.write(table.index, result)?;
        }
        Commands::Regress {
            io,
            offset,
            regressors,
            predictors,
            fit_intercept,
            normalize,
        } => {
            let options = OffsetOptions {
                predictor_columns: predictors,
                regressor_columns: (!regressors.is_empty()).then_some(regressors),
                offset,
                fit_intercept,
                normalize,
            };
            let table = io.load()?;
            let result = linear_offset(&table.frame, &options)?;
            io.write(table.index, result)?;
        }
        Commands::Logistic {
            io,
            offset,
            regressors,
            predictors,
            c,
            tol,
            max_iter,
            fit_intercept,
        } => {
            let options = LogisticOptions {
                predictor_columns: predictors,
                regressor_columns: (!regressors.is_empty()).then_some(regressors),
                offset,
                c,
                max_iter,
                tol,
                fit_intercept,
            };
            let table = io.load()?;
            let result = logistic_offset(&table.frame, &options)?;
            io.write(table.index, result)?;
        }
    }

    Ok(())
}

/// Parses repeated `--group` values, each a comma-separated component list.
fn parse_groups(specs: &[String]) -> Result<Vec<Vec<usize>>, Box<dyn std::error::Error>> {
    specs
        .iter()
        .map(|spec| {
            spec.split(',')
                .map(|part| part.trim().parse::<usize>())
                .collect::<Result<Vec<usize>, _>>()
                .map_err(|_| {
                    Box::<dyn std::error::Error>::from(format!("invalid component list: {spec}"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_describe_defaults() {
        let cli = Cli::try_parse_from(["albany", "describe", "-d", "data.csv"]).unwrap();
        match cli.command {
            Commands::Describe { io, select, lang } => {
                assert_eq!(io.dataset.to_str(), Some("data.csv"));
                assert!(io.file_out.is_none());
                assert!(!io.pretty);
                assert!(!io.csv);
                assert!(select.headers.is_none());
                assert_eq!(lang, Language::Pt);
            }
            _ => panic!("expected describe"),
        }
    }

    #[test]
    fn test_argparse_style_aliases() {
        let cli = Cli::try_parse_from([
            "albany", "roll", "-d", "data.csv", "--window", "3", "--pd", "date", "--hd", "a", "b",
        ])
        .unwrap();
        match cli.command {
            Commands::Roll {
                io,
                select,
                window,
                roll_type,
            } => {
                assert_eq!(io.parse_dates, Some(vec!["date".to_string()]));
                assert_eq!(select.headers, Some(vec!["a".to_string(), "b".to_string()]));
                assert_eq!(window, 3);
                assert_eq!(roll_type, RollKind::Mean);
            }
            _ => panic!("expected roll"),
        }
    }

    #[test]
    fn test_csv_conflicts_with_orient() {
        let result =
            Cli::try_parse_from(["albany", "describe", "-d", "data.csv", "--csv", "-o", "split"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ssa_window_flags_conflict() {
        let result = Cli::try_parse_from([
            "albany",
            "ssa",
            "-d",
            "data.csv",
            "-w",
            "5",
            "--window-fraction",
            "0.5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ssa_group_lists() {
        let cli = Cli::try_parse_from([
            "albany", "ssa", "-d", "data.csv", "--group", "0,1", "--group", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Ssa { group, groups, .. } => {
                assert_eq!(group, vec!["0,1".to_string(), "2".to_string()]);
                assert!(groups.is_none());
            }
            _ => panic!("expected ssa"),
        }
    }

    #[test]
    fn test_decompose_two_sided_takes_value() {
        let cli = Cli::try_parse_from([
            "albany",
            "decompose",
            "-d",
            "data.csv",
            "--freq",
            "12",
            "-t",
            "false",
        ])
        .unwrap();
        match cli.command {
            Commands::Decompose { period, two_sided, .. } => {
                assert_eq!(period, 12);
                assert!(!two_sided);
            }
            _ => panic!("expected decompose"),
        }
    }

    #[test]
    fn test_forecast_requires_predictors() {
        let result = Cli::try_parse_from(["albany", "forecast", "-d", "data.csv"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "albany", "forecast", "-d", "data.csv", "-p", "a", "b", "-l", "ridge-cv", "--ts", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Forecast {
                predictors,
                linear_type,
                time_step,
                cv,
                ..
            } => {
                assert_eq!(predictors, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(linear_type, ModelFamily::RidgeCv);
                assert_eq!(time_step, 3);
                assert_eq!(cv, 5);
            }
            _ => panic!("expected forecast"),
        }
    }

    #[test]
    fn test_logistic_offset_alias() {
        let cli = Cli::try_parse_from([
            "albany", "logistic", "-d", "data.csv", "-p", "label", "--off", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Logistic {
                offset,
                c,
                tol,
                max_iter,
                fit_intercept,
                ..
            } => {
                assert_eq!(offset, 2);
                assert_eq!(c, 1.0);
                assert_eq!(tol, 1e-4);
                assert_eq!(max_iter, 100);
                assert!(fit_intercept);
            }
            _ => panic!("expected logistic"),
        }
    }

    #[test]
    fn test_parse_groups() {
        let parsed = parse_groups(&["0,1, 2".to_string(), "3".to_string()]).unwrap();
        assert_eq!(parsed, vec![vec![0, 1, 2], vec![3]]);

        let err = parse_groups(&["0,x".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "invalid component list: 0,x");
    }
}
