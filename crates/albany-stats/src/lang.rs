//! Output-label localization.
//!
//! Column labels on the descriptive and decomposition outputs are localized
//! through a fixed English/Portuguese word table plus two phrase builders.
//! Portuguese is the default; some entries are identical in both languages
//! (`max`, `rms`).

use std::str::FromStr;

use derive_more::Display;

use crate::error::StatsError;

/// Output language for localized column labels.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// English.
    #[display("en")]
    En,
    /// Portuguese. The default output language.
    #[default]
    #[display("pt")]
    Pt,
}

impl FromStr for Language {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "en" => Ok(Self::En),
            "pt" => Ok(Self::Pt),
            other => Err(StatsError::unsupported("language", other)),
        }
    }
}

/// Keys of the localized word table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Word {
    /// Column-name label on describe and correlation outputs.
    Header,
    /// Largest value.
    Max,
    /// Smallest value.
    Min,
    /// Arithmetic mean.
    Mean,
    /// Median.
    Median,
    /// Sample variance.
    Var,
    /// Sample standard deviation.
    Std,
    /// Mean absolute deviation.
    Mad,
    /// Amplitude (max minus min).
    Amp,
    /// Root mean square.
    Rms,
    /// Excess kurtosis.
    Kurtosis,
    /// Skewness.
    Skew,
    /// Non-null count.
    Count,
    /// Observed series of a seasonal decomposition.
    Observed,
    /// Seasonal component of a seasonal decomposition.
    Seasonal,
    /// Trend component of a seasonal decomposition.
    Trend,
    /// Residual component of a seasonal decomposition.
    Resid,
}

impl Language {
    /// Look up a word in the table for this language.
    pub const fn word(self, word: Word) -> &'static str {
        match self {
            Self::En => match word {
                Word::Header => "header",
                Word::Max => "max",
                Word::Min => "min",
                Word::Mean => "mean",
                Word::Median => "median",
                Word::Var => "variance",
                Word::Std => "standard deviation",
                Word::Mad => "absolute deviation",
                Word::Amp => "amplitude",
                Word::Rms => "rms",
                Word::Kurtosis => "kurtosis",
                Word::Skew => "skewness",
                Word::Count => "count",
                Word::Observed => "observed",
                Word::Seasonal => "seasonal",
                Word::Trend => "trend",
                Word::Resid => "resid",
            },
            Self::Pt => match word {
                Word::Header => "cabeçalho",
                Word::Max => "max",
                Word::Min => "min",
                Word::Mean => "média",
                Word::Median => "mediana",
                Word::Var => "variância",
                Word::Std => "desvio padrão",
                Word::Mad => "desvio absoluto",
                Word::Amp => "amplitude",
                Word::Rms => "rms",
                Word::Kurtosis => "curtose",
                Word::Skew => "assimetria",
                Word::Count => "contagem",
                Word::Observed => "observado",
                Word::Seasonal => "sazonal",
                Word::Trend => "tendência",
                Word::Resid => "resíduo",
            },
        }
    }

    /// Label for the n-th quartile ("1-quartile" / "1-quartil").
    pub fn quartile(self, n: usize) -> String {
        match self {
            Self::En => format!("{n}-quartile"),
            Self::Pt => format!("{n}-quartil"),
        }
    }

    /// Label for a limit value ("{x} limit" / "limite {x}").
    pub fn limit(self, x: &str) -> String {
        match self {
            Self::En => format!("{x} limit"),
            Self::Pt => format!("limite {x}"),
        }
    }
}
