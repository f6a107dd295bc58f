//! Localized descriptive statistics.
//!
//! [`describe`] summarizes every selected column into one row of the output
//! table: extremes, central tendency, quartiles, dispersion, shape, and
//! count, with column labels drawn from the [`Language`] word table. Nulls
//! are skipped; statistics that need more observations than a column has
//! come back as NaN rather than erroring.

use albany_data::numeric_column;
use polars::prelude::*;

use crate::columns::restrict;
use crate::error::Result;
use crate::lang::{Language, Word};

const FIRST_QUARTILE: f64 = 0.25;
const THIRD_QUARTILE: f64 = 0.75;

/// Per-column summary, field order matching the output column order.
struct ColumnSummary {
    name: String,
    max: f64,
    min: f64,
    mean: f64,
    median: f64,
    first_quartile: f64,
    third_quartile: f64,
    variance: f64,
    std_dev: f64,
    mean_abs_dev: f64,
    amplitude: f64,
    rms: f64,
    kurtosis: f64,
    skewness: f64,
    count: u32,
}

/// Describe every selected column of the table.
///
/// Returns one row per column with localized stat labels: header, max, min,
/// mean, median, both quartiles, variance and standard deviation (ddof 1),
/// mean absolute deviation, amplitude, root mean square, excess kurtosis,
/// skewness, and the non-null count.
pub fn describe(
    frame: &DataFrame,
    language: Language,
    headers: Option<&[String]>,
) -> Result<DataFrame> {
    let restricted = restrict(frame, headers)?;
    let mut summaries = Vec::with_capacity(restricted.width());
    for name in restricted.get_column_names() {
        let values = numeric_column(&restricted, name.as_str())?;
        summaries.push(summarize(name.as_str(), &values));
    }

    let label = |word: Word| -> PlSmallStr { language.word(word).into() };
    let stat = |pick: fn(&ColumnSummary) -> f64| summaries.iter().map(pick).collect::<Vec<_>>();
    let columns = vec![
        Series::new(
            label(Word::Header),
            summaries.iter().map(|s| s.name.clone()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(label(Word::Max), stat(|s| s.max)).into(),
        Series::new(label(Word::Min), stat(|s| s.min)).into(),
        Series::new(label(Word::Mean), stat(|s| s.mean)).into(),
        Series::new(label(Word::Median), stat(|s| s.median)).into(),
        Series::new(language.quartile(1).into(), stat(|s| s.first_quartile)).into(),
        Series::new(language.quartile(3).into(), stat(|s| s.third_quartile)).into(),
        Series::new(label(Word::Var), stat(|s| s.variance)).into(),
        Series::new(label(Word::Std), stat(|s| s.std_dev)).into(),
        Series::new(label(Word::Mad), stat(|s| s.mean_abs_dev)).into(),
        Series::new(label(Word::Amp), stat(|s| s.amplitude)).into(),
        Series::new(label(Word::Rms), stat(|s| s.rms)).into(),
        Series::new(label(Word::Kurtosis), stat(|s| s.kurtosis)).into(),
        Series::new(label(Word::Skew), stat(|s| s.skewness)).into(),
        Series::new(
            label(Word::Count),
            summaries.iter().map(|s| s.count).collect::<Vec<_>>(),
        )
        .into(),
    ];
    Ok(DataFrame::new(columns)?)
}

fn summarize(name: &str, values: &[Option<f64>]) -> ColumnSummary {
    let complete: Vec<f64> = values.iter().flatten().copied().collect();
    let count = complete.len();
    let n = count as f64;

    let max = complete.iter().copied().fold(f64::NAN, f64::max);
    let min = complete.iter().copied().fold(f64::NAN, f64::min);
    let mean = if count == 0 {
        f64::NAN
    } else {
        complete.iter().sum::<f64>() / n
    };

    // Central moment sums around the mean.
    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    let mut abs_dev = 0.0;
    for &value in &complete {
        let d = value - mean;
        m2 += d * d;
        m3 += d * d * d;
        m4 += d * d * d * d;
        abs_dev += d.abs();
    }

    let variance = if count < 2 { f64::NAN } else { m2 / (n - 1.0) };
    let skewness = if count < 3 {
        f64::NAN
    } else if m2 == 0.0 {
        0.0
    } else {
        n * (n - 1.0).sqrt() / (n - 2.0) * m3 / m2.powf(1.5)
    };
    let kurtosis = if count < 4 {
        f64::NAN
    } else if m2 == 0.0 {
        0.0
    } else {
        n * (n + 1.0) * (n - 1.0) * m4 / ((n - 2.0) * (n - 3.0) * m2 * m2)
            - 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
    };
    let rms = if count == 0 {
        f64::NAN
    } else {
        (complete.iter().map(|v| v * v).sum::<f64>() / n).sqrt()
    };

    let mut sorted = complete;
    sorted.sort_by(f64::total_cmp);

    ColumnSummary {
        name: name.to_string(),
        max,
        min,
        mean,
        median: quantile(&sorted, 0.5),
        first_quartile: quantile(&sorted, FIRST_QUARTILE),
        third_quartile: quantile(&sorted, THIRD_QUARTILE),
        variance,
        std_dev: variance.sqrt(),
        mean_abs_dev: if count == 0 { f64::NAN } else { abs_dev / n },
        amplitude: max - min,
        rms,
        kurtosis,
        skewness,
        count: count as u32,
    }
}

/// Quantile with linear interpolation over a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = (sorted.len() - 1) as f64 * q;
    let low = position.floor() as usize;
    let fraction = position - low as f64;
    if fraction == 0.0 {
        sorted[low]
    } else {
        sorted[low] + fraction * (sorted[low + 1] - sorted[low])
    }
}
