use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    config::AggregationConfig,
    core::{Interval, RawPoint},
    prelude::*,
};

/// Instant from which on the unit price applies.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Constructor, Serialize, Deserialize)]
pub struct TariffBreakpoint {
    pub effective_time: DateTime<Utc>,
    pub unit_price: Decimal,
}

/// Step-wise price schedule, sorted by the effective time.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[must_use]
pub struct TariffSchedule(Vec<TariffBreakpoint>);

impl FromIterator<TariffBreakpoint> for TariffSchedule {
    /// Collect the breakpoints, keeping the last one of those sharing an effective time.
    fn from_iter<T: IntoIterator<Item = TariffBreakpoint>>(iter: T) -> Self {
        let mut breakpoints = iter.into_iter().collect_vec();
        breakpoints.sort_by_key(|breakpoint| breakpoint.effective_time);
        let breakpoints = breakpoints
            .into_iter()
            .rev()
            .unique_by(|breakpoint| breakpoint.effective_time)
            .collect_vec()
            .into_iter()
            .rev()
            .collect();
        Self(breakpoints)
    }
}

impl TariffSchedule {
    #[must_use]
    pub fn breakpoints(&self) -> &[TariffBreakpoint] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Price in effect at the instant, `None` before the first breakpoint.
    #[must_use]
    pub fn price_at(&self, instant: DateTime<Utc>) -> Option<Decimal> {
        let index = self.0.partition_point(|breakpoint| breakpoint.effective_time <= instant);
        index.checked_sub(1).map(|index| self.0[index].unit_price)
    }

    /// Breakpoints in effect during `[start, end)`, keyed by the local time they apply from.
    ///
    /// The breakpoint preceding the range is reported at the range start, since that is
    /// when it starts to matter for the range.
    #[instrument(skip_all, fields(?interval, n_breakpoints = self.0.len()))]
    pub fn resolve(
        &self,
        interval: Interval,
        config: &AggregationConfig,
    ) -> Result<BTreeMap<NaiveDateTime, Decimal>, AggregationError> {
        let first_inside =
            self.0.partition_point(|breakpoint| breakpoint.effective_time <= interval.start);
        let preceding = first_inside
            .checked_sub(1)
            .map(|index| (interval.start, self.0[index].unit_price));
        let inside = self.0[first_inside..]
            .iter()
            .take_while(|breakpoint| breakpoint.effective_time < interval.end)
            .map(|breakpoint| (breakpoint.effective_time, breakpoint.unit_price));
        let resolved: BTreeMap<_, _> = preceding
            .into_iter()
            .chain(inside)
            .map(|(effective_time, unit_price)| {
                config.to_local(effective_time).map(|local| (local, unit_price)).ok_or_else(|| {
                    AggregationError::InvalidInput(format!(
                        "local time of {effective_time} is out of calendar"
                    ))
                })
            })
            .collect::<Result<_, _>>()?;
        debug!(n_resolved = resolved.len(), "resolved");
        Ok(resolved)
    }

    /// Weigh every point by the price in effect at its timestamp, producing cost points.
    ///
    /// A point stays without a value when it has none itself or when no price is in effect yet.
    pub fn weigh(&self, points: impl IntoIterator<Item = RawPoint>) -> Vec<RawPoint> {
        points
            .into_iter()
            .map(|point| {
                let cost = point
                    .value
                    .zip(self.price_at(point.timestamp))
                    .and_then(|(value, price)| value.checked_mul(price));
                RawPoint::new(point.timestamp, cost)
            })
            .collect()
    }
}

/// Resolve the schedule over `[range_start, range_end)`.
pub fn resolve_tariff(
    schedule: &TariffSchedule,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    config: &AggregationConfig,
) -> Result<BTreeMap<NaiveDateTime, Decimal>, AggregationError> {
    schedule.resolve(Interval::try_new(range_start, range_end)?, config)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::dec;

    use super::*;
    use crate::config::SamplingInterval;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, day, hour, 0, 0).unwrap()
    }

    fn local(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn schedule() -> TariffSchedule {
        TariffSchedule::from_iter([
            TariffBreakpoint::new(at(1, 16), dec!(0.30)),
            TariffBreakpoint::new(at(1, 0), dec!(0.10)),
            TariffBreakpoint::new(at(1, 8), dec!(0.20)),
            TariffBreakpoint::new(at(2, 0), dec!(0.15)),
        ])
    }

    #[test]
    fn test_price_at() {
        let schedule = schedule();
        assert_eq!(schedule.price_at(at(1, 0) - chrono::TimeDelta::seconds(1)), None);
        assert_eq!(schedule.price_at(at(1, 0)), Some(dec!(0.10)));
        assert_eq!(schedule.price_at(at(1, 9)), Some(dec!(0.20)));
        assert_eq!(schedule.price_at(at(3, 0)), Some(dec!(0.15)));
    }

    #[test]
    fn test_resolve_clamps_preceding_breakpoint() -> Result {
        let config = AggregationConfig::default();
        let resolved = resolve_tariff(&schedule(), at(1, 4), at(1, 20), &config)?;
        assert_eq!(
            resolved.into_iter().collect_vec(),
            [(local(1, 4), dec!(0.10)), (local(1, 8), dec!(0.20)), (local(1, 16), dec!(0.30))]
        );
        Ok(())
    }

    #[test]
    fn test_resolve_excludes_end() -> Result {
        let config = AggregationConfig::default();
        let resolved = resolve_tariff(&schedule(), at(1, 8), at(2, 0), &config)?;
        assert_eq!(
            resolved.into_iter().collect_vec(),
            [(local(1, 8), dec!(0.20)), (local(1, 16), dec!(0.30))]
        );
        Ok(())
    }

    #[test]
    fn test_resolve_shifts_to_local_time() -> Result {
        let config = AggregationConfig::try_new(480, SamplingInterval::Hourly)?;
        let resolved = resolve_tariff(&schedule(), at(1, 0), at(1, 12), &config)?;
        assert_eq!(
            resolved.into_iter().collect_vec(),
            [(local(1, 8), dec!(0.10)), (local(1, 16), dec!(0.20))]
        );
        Ok(())
    }

    #[test]
    fn test_resolve_before_schedule() -> Result {
        let resolved = resolve_tariff(
            &schedule(),
            at(1, 0) - chrono::TimeDelta::hours(5),
            at(1, 0),
            &AggregationConfig::default(),
        )?;
        assert!(resolved.is_empty());
        Ok(())
    }

    #[test]
    fn test_resolve_invalid_range() {
        let result = resolve_tariff(&schedule(), at(2, 0), at(1, 0), &AggregationConfig::default());
        assert!(matches!(result, Err(AggregationError::InvalidRange { .. })));
    }

    #[test]
    fn test_resolve_at_calendar_end() -> Result {
        let config = AggregationConfig::try_new(480, SamplingInterval::Hourly)?;
        let end = DateTime::<Utc>::MAX_UTC;
        let schedule = TariffSchedule::from_iter([TariffBreakpoint::new(at(1, 0), dec!(0.10))]);
        let result = resolve_tariff(&schedule, end - chrono::TimeDelta::hours(1), end, &config);
        assert!(matches!(result, Err(AggregationError::InvalidInput(_))));
        Ok(())
    }

    #[test]
    fn test_duplicate_effective_time_keeps_last() {
        let schedule = TariffSchedule::from_iter([
            TariffBreakpoint::new(at(1, 0), dec!(0.10)),
            TariffBreakpoint::new(at(1, 0), dec!(0.12)),
        ]);
        assert_eq!(schedule.breakpoints(), [TariffBreakpoint::new(at(1, 0), dec!(0.12))]);
    }

    #[test]
    fn test_weigh() {
        let costs = schedule().weigh([
            RawPoint::new(at(1, 0) - chrono::TimeDelta::hours(1), Some(dec!(3))),
            RawPoint::new(at(1, 9), Some(dec!(2))),
            RawPoint::new(at(1, 10), None),
            RawPoint::new(at(1, 17), Some(dec!(10))),
        ]);
        let values = costs.iter().map(|point| point.value).collect_vec();
        assert_eq!(values, [None, Some(dec!(0.40)), None, Some(dec!(3.00))]);
    }
}
