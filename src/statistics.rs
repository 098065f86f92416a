use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;

use crate::{
    core::{
        Bucket,
        series::{Aggregate, BucketValues},
    },
    prelude::*,
};

/// The six descriptive statistics of a bucket sequence, each `None` when there is no data.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Statistics {
    pub mean: Option<Decimal>,
    pub median: Option<Decimal>,
    pub minimum: Option<Decimal>,
    pub maximum: Option<Decimal>,

    /// Population standard deviation.
    pub stdev: Option<Decimal>,

    /// Population variance.
    pub variance: Option<Decimal>,
}

impl Statistics {
    /// Compute the statistics over the values; `None` everywhere for an empty input.
    #[must_use]
    pub fn from_values(values: &[Decimal]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let count = Decimal::from(values.len());
        let Some(mean) = checked_sum(values.iter().copied()).and_then(|sum| sum.checked_div(count))
        else {
            warn!(n_values = values.len(), "the values are too large to average");
            return Self::default();
        };
        let variance = values
            .iter()
            .map(|value| value.checked_sub(mean).and_then(|delta| delta.checked_mul(delta)))
            .try_fold(Decimal::ZERO, |sum, square| sum.checked_add(square?))
            .and_then(|sum| sum.checked_div(count));
        Self {
            mean: Some(mean),
            median: values.iter().copied().median(),
            minimum: values.iter().min().copied(),
            maximum: values.iter().max().copied(),
            stdev: variance.and_then(|variance| variance.sqrt()),
            variance,
        }
    }
}

/// Summary of one period: the buckets, the subtotal and the statistics.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[must_use]
pub struct StatsResult {
    pub buckets: Vec<Bucket>,

    /// Sum over all buckets, counting the missing ones as zero.
    pub subtotal: Decimal,

    #[serde(flatten)]
    pub statistics: Statistics,
}

impl StatsResult {
    /// Result of a period that was not requested: no buckets, zero subtotal and no statistics.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Summarize the bucket sequence.
#[instrument(skip_all, fields(n_buckets = buckets.len()))]
pub fn summarize(buckets: Vec<Bucket>) -> StatsResult {
    let subtotal = checked_sum(buckets.values_including_missing_as_zero()).unwrap_or_else(|| {
        warn!("the subtotal overflows, saturating");
        Decimal::MAX
    });
    let values: Vec<Decimal> = buckets.values_excluding_missing().collect();
    let statistics = Statistics::from_values(&values);
    debug!(%subtotal, n_values = values.len(), "summarized");
    StatsResult { buckets, subtotal, statistics }
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, Decimal::checked_add)
}
