use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{config::AggregationConfig, core::Interval, error::AggregationError};

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    derive_more::Display,
    derive_more::From,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PointId(pub u64);

/// Table the point samples are stored in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointKind {
    #[display("energy")]
    EnergyValue,

    #[display("analog")]
    AnalogValue,

    #[display("digital")]
    DigitalValue,
}

/// Sensor point associated with the subject.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub name: String,
    pub units: String,
    pub kind: PointKind,
}

impl Point {
    /// Parameter name as it appears in the report, for example `Temperature (°C)`.
    #[must_use]
    pub fn parameter_name(&self) -> String {
        format!("{} ({})", self.name, self.units)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Constructor, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

/// Named time series attached to the report next to the category statistics.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ParameterSeries {
    pub name: String,

    /// Local wall-clock timestamps.
    pub timestamps: Vec<NaiveDateTime>,

    pub values: Vec<Decimal>,
}

impl ParameterSeries {
    /// Chronological samples of the point within the closed interval `[start, end]`.
    pub fn of_point(
        point: &Point,
        samples: impl IntoIterator<Item = Sample>,
        interval: Interval,
        config: &AggregationConfig,
    ) -> Result<Self, AggregationError> {
        let (timestamps, values) = samples
            .into_iter()
            .filter(|sample| interval.contains_inclusive(sample.timestamp))
            .sorted_by_key(|sample| sample.timestamp)
            .map(|sample| {
                config.to_local(sample.timestamp).map(|local| (local, sample.value)).ok_or_else(
                    || {
                        AggregationError::InvalidInput(format!(
                            "local time of {} is out of calendar",
                            sample.timestamp
                        ))
                    },
                )
            })
            .process_results(|samples| samples.unzip())?;
        Ok(Self { name: point.parameter_name(), timestamps, values })
    }

    /// Resolved tariff of the category.
    #[must_use]
    pub fn of_tariff(category_name: &str, resolved: &BTreeMap<NaiveDateTime, Decimal>) -> Self {
        let (timestamps, values) = resolved.iter().map(|(time, price)| (*time, *price)).unzip();
        Self { name: format!("Tariff-{category_name}"), timestamps, values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Most recent sample of every point taken strictly after `since`.
///
/// Points without such a sample are absent from the result.
pub fn latest_values(
    samples: impl IntoIterator<Item = (PointId, Sample)>,
    since: DateTime<Utc>,
) -> BTreeMap<PointId, Sample> {
    let mut latest = BTreeMap::new();
    for (point_id, sample) in samples.into_iter().filter(|(_, sample)| sample.timestamp > since) {
        latest
            .entry(point_id)
            .and_modify(|latest: &mut Sample| {
                if sample.timestamp > latest.timestamp {
                    *latest = sample;
                }
            })
            .or_insert(sample);
    }
    latest
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta, TimeZone};
    use rust_decimal::dec;

    use super::*;
    use crate::{config::SamplingInterval, prelude::*};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, hour, 0, 0).unwrap()
    }

    fn temperature() -> Point {
        Point {
            id: PointId(7),
            name: "Temperature".to_string(),
            units: "°C".to_string(),
            kind: PointKind::AnalogValue,
        }
    }

    #[test]
    fn test_of_point_uses_closed_range() -> Result {
        let config = AggregationConfig::try_new(120, SamplingInterval::Hourly)?;
        let samples = [
            Sample::new(at(3), dec!(21.5)),
            Sample::new(at(1), dec!(20.0)),
            Sample::new(at(0), dec!(19.0)),
            Sample::new(at(4), dec!(22.0)),
        ];
        let interval = Interval::try_new(at(1), at(3))?;
        let series = ParameterSeries::of_point(&temperature(), samples, interval, &config)?;
        assert_eq!(series.name, "Temperature (°C)");
        assert_eq!(series.values, [dec!(20.0), dec!(21.5)]);
        let day = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(
            series.timestamps,
            [day.and_hms_opt(3, 0, 0).unwrap(), day.and_hms_opt(5, 0, 0).unwrap()]
        );
        Ok(())
    }

    #[test]
    fn test_of_point_at_calendar_end() -> Result {
        let config = AggregationConfig::try_new(120, SamplingInterval::Hourly)?;
        let end = DateTime::<Utc>::MAX_UTC;
        let interval = Interval::try_new(end - TimeDelta::hours(1), end)?;
        let samples = [Sample::new(end, dec!(20))];
        let result = ParameterSeries::of_point(&temperature(), samples, interval, &config);
        assert!(matches!(result, Err(AggregationError::InvalidInput(_))));
        Ok(())
    }

    #[test]
    fn test_of_tariff() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let resolved = BTreeMap::from([
            (day.and_hms_opt(8, 0, 0).unwrap(), dec!(0.2)),
            (day.and_hms_opt(0, 0, 0).unwrap(), dec!(0.1)),
        ]);
        let series = ParameterSeries::of_tariff("Electricity", &resolved);
        assert_eq!(series.name, "Tariff-Electricity");
        assert_eq!(series.values, [dec!(0.1), dec!(0.2)]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_latest_values() {
        let since = at(10);
        let samples = [
            (PointId(1), Sample::new(at(11), dec!(1))),
            (PointId(1), Sample::new(at(12), dec!(2))),
            (PointId(1), Sample::new(since + TimeDelta::minutes(30), dec!(3))),
            (PointId(2), Sample::new(since, dec!(4))),
            (PointId(3), Sample::new(at(9), dec!(5))),
            (PointId(3), Sample::new(at(11), dec!(6))),
        ];
        let latest = latest_values(samples, since);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[&PointId(1)].value, dec!(2));
        assert!(!latest.contains_key(&PointId(2)));
        assert_eq!(latest[&PointId(3)].value, dec!(6));
    }

    #[test]
    fn test_point_kind_serde() -> Result {
        let kind: PointKind = serde_json::from_str(r#""DIGITAL_VALUE""#)?;
        assert_eq!(kind, PointKind::DigitalValue);
        assert_eq!(kind.to_string(), "digital");
        Ok(())
    }
}
