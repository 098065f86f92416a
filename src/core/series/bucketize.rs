use chrono::{DateTime, Utc};
use itertools::Itertools;
use rust_decimal::Decimal;

use crate::{
    config::AggregationConfig,
    core::{Bucket, Granularity, Interval, PeriodKey, RawPoint},
    prelude::*,
};

impl<T> Bucketize for T where T: ?Sized {}

pub trait Bucketize {
    /// Sum the points into contiguous, gap-filled period buckets covering the interval.
    ///
    /// The points may come in any order. Points outside the interval are ignored,
    /// and a point without a value does not count as a contribution.
    #[instrument(skip_all, fields(?interval, %granularity))]
    fn bucketize(
        self,
        interval: Interval,
        granularity: Granularity,
        config: &AggregationConfig,
    ) -> Result<Vec<Bucket>, AggregationError>
    where
        Self: Sized + IntoIterator<Item = RawPoint>,
    {
        let mut points =
            self.into_iter().filter(|point| interval.contains(point.timestamp)).collect_vec();
        points.sort_unstable_by_key(|point| point.timestamp);
        if let Some((duplicate, _)) =
            points.iter().tuple_windows().find(|(lhs, rhs)| lhs.timestamp == rhs.timestamp)
        {
            return Err(AggregationError::InvalidInput(format!(
                "duplicate timestamp {}",
                duplicate.timestamp
            )));
        }
        let n_points = points.len();
        let mut points = points.into_iter().peekable();

        let mut buckets = Vec::new();
        let mut key = PeriodKey::of(granularity, interval.start, config).ok_or_else(|| {
            AggregationError::InvalidInput(format!(
                "{} is outside the supported calendar",
                interval.start
            ))
        })?;
        let mut start = period_start(key, config)?;
        while start < interval.end {
            let next_key = key
                .next(config)
                .ok_or_else(|| AggregationError::InvalidInput(format!("no period after {key}")))?;
            let end = period_start(next_key, config)?;

            let mut value: Option<Decimal> = None;
            while let Some(point) = points.next_if(|point| point.timestamp < end) {
                if let Some(point_value) = point.value {
                    let sum = value.map_or(Some(point_value), |sum| sum.checked_add(point_value));
                    value = Some(sum.ok_or_else(|| {
                        AggregationError::InvalidInput(format!("the sum overflows at {key}"))
                    })?);
                }
            }

            let local_start = config.to_local(start).ok_or_else(|| {
                AggregationError::InvalidInput(format!("local time of {key} is out of calendar"))
            })?;
            buckets.push(Bucket {
                key,
                start,
                local_timestamp: local_start.format(granularity.display_format()).to_string(),
                value,
            });
            (key, start) = (next_key, end);
        }

        debug!(n_points, n_buckets = buckets.len(), "bucketized");
        Ok(buckets)
    }
}

/// Bucketize the points over `[range_start, range_end)`.
pub fn bucketize(
    points: impl IntoIterator<Item = RawPoint>,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    granularity: Granularity,
    config: &AggregationConfig,
) -> Result<Vec<Bucket>, AggregationError> {
    let interval = Interval::try_new(range_start, range_end)?;
    points.into_iter().bucketize(interval, granularity, config)
}

fn period_start(
    key: PeriodKey,
    config: &AggregationConfig,
) -> Result<DateTime<Utc>, AggregationError> {
    key.start(config).ok_or_else(|| {
        AggregationError::InvalidInput(format!("period {key} is outside the supported calendar"))
    })
}
