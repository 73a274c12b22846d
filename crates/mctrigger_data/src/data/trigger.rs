use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Statistic a trigger compares against its threshold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerMetric {
    #[serde(rename = "variance")]
    Variance,
    #[serde(rename = "std_dev")]
    StandardDeviation,
    #[serde(rename = "rel_err")]
    RelativeError,
}

impl TriggerMetric {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerMetric::Variance => "variance",
            TriggerMetric::StandardDeviation => "std_dev",
            TriggerMetric::RelativeError => "rel_err",
        }
    }
}

impl fmt::Display for TriggerMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerMetric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variance" => Ok(TriggerMetric::Variance),
            "std_dev" | "std-dev" | "standard_deviation" => Ok(TriggerMetric::StandardDeviation),
            "rel_err" | "rel-err" | "relative_error" => Ok(TriggerMetric::RelativeError),
            other => anyhow::bail!("Unknown trigger metric '{other}'"),
        }
    }
}

/// Convergence criterion attached to one score of a tally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trigger {
    pub metric: TriggerMetric,
    pub threshold: f64,
    /// Position of the watched score in [`crate::Tally::scores`].
    pub score_index: usize,
}

impl Trigger {
    pub fn new(metric: TriggerMetric, threshold: f64, score_index: usize) -> Self {
        Self {
            metric,
            threshold,
            score_index,
        }
    }
}
