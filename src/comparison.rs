use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    prelude::*,
    statistics::{Statistics, StatsResult},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticKind {
    Mean,
    Median,
    Minimum,
    Maximum,
    Stdev,
    Variance,
}

impl StatisticKind {
    pub const ALL: [Self; 6] =
        [Self::Mean, Self::Median, Self::Minimum, Self::Maximum, Self::Stdev, Self::Variance];
}

impl Display for StatisticKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mean => write!(f, "Mean"),
            Self::Median => write!(f, "Median"),
            Self::Minimum => write!(f, "Minimum"),
            Self::Maximum => write!(f, "Maximum"),
            Self::Stdev => write!(f, "Stdev"),
            Self::Variance => write!(f, "Variance"),
        }
    }
}

impl Statistics {
    #[must_use]
    pub const fn get(&self, kind: StatisticKind) -> Option<Decimal> {
        match kind {
            StatisticKind::Mean => self.mean,
            StatisticKind::Median => self.median,
            StatisticKind::Minimum => self.minimum,
            StatisticKind::Maximum => self.maximum,
            StatisticKind::Stdev => self.stdev,
            StatisticKind::Variance => self.variance,
        }
    }

    /// Build the statistics by evaluating the function for every kind.
    pub fn from_fn(mut f: impl FnMut(StatisticKind) -> Option<Decimal>) -> Self {
        Self {
            mean: f(StatisticKind::Mean),
            median: f(StatisticKind::Median),
            minimum: f(StatisticKind::Minimum),
            maximum: f(StatisticKind::Maximum),
            stdev: f(StatisticKind::Stdev),
            variance: f(StatisticKind::Variance),
        }
    }

    /// Normalize every statistic by the area, provided the area is positive.
    #[must_use]
    pub fn per_unit_area(&self, area: Option<Decimal>) -> Self {
        let area = area.filter(|area| *area > Decimal::ZERO);
        Self::from_fn(|kind| self.get(kind)?.checked_div(area?))
    }

    /// Relative change of every statistic against the base, provided the base one is positive.
    #[must_use]
    pub fn increment_rate(&self, base: &Self) -> Self {
        Self::from_fn(|kind| increment_rate(base.get(kind)?, self.get(kind)?))
    }
}

/// Base-versus-reporting comparison of a single category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[must_use]
pub struct ComparativeResult {
    pub base: StatsResult,
    pub reporting: StatsResult,

    /// Reporting-period statistics divided by the subject area.
    pub per_unit_area: Statistics,

    /// Reporting-period statistics relative to the base-period ones.
    pub increment_rate: Statistics,

    /// Pairwise rate of change of the buckets, aligned by position.
    pub rates: Vec<Option<Decimal>>,
}

/// Compare the reporting period against the base period.
///
/// Total over its inputs: any missing operand, non-positive divisor or overflow
/// turns the affected field into `None`.
#[instrument(skip_all, fields(n_base = base.buckets.len(), n_reporting = reporting.buckets.len()))]
pub fn compare(
    base: StatsResult,
    reporting: StatsResult,
    subject_area: Option<Decimal>,
) -> ComparativeResult {
    let rates = base
        .buckets
        .iter()
        .zip(&reporting.buckets)
        .map(|(base, reporting)| {
            let base = base.value.filter(|value| !value.is_zero())?;
            let reporting = reporting.value.filter(|value| !value.is_zero())?;
            reporting.checked_sub(base)?.checked_div(base)
        })
        .collect();
    let per_unit_area = reporting.statistics.per_unit_area(subject_area);
    let increment_rate = reporting.statistics.increment_rate(&base.statistics);
    debug!(?increment_rate.mean, ?per_unit_area.mean, "compared");
    ComparativeResult { base, reporting, per_unit_area, increment_rate, rates }
}

fn increment_rate(base: Decimal, reporting: Decimal) -> Option<Decimal> {
    if base > Decimal::ZERO { reporting.checked_sub(base)?.checked_div(base) } else { None }
}
