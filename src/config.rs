use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::{core::Interval, prelude::*};

/// Resolution of the underlying pre-aggregated source.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SamplingInterval {
    HalfHourly,

    #[default]
    Hourly,
}

impl SamplingInterval {
    #[must_use]
    pub const fn minutes(self) -> u32 {
        match self {
            Self::HalfHourly => 30,
            Self::Hourly => 60,
        }
    }

    #[must_use]
    pub fn time_delta(self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.minutes()))
    }
}

impl TryFrom<u32> for SamplingInterval {
    type Error = AggregationError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        match minutes {
            30 => Ok(Self::HalfHourly),
            60 => Ok(Self::Hourly),
            _ => Err(AggregationError::InvalidInput(format!(
                "unsupported sampling interval of {minutes} minutes"
            ))),
        }
    }
}

impl From<SamplingInterval> for u32 {
    fn from(interval: SamplingInterval) -> Self {
        interval.minutes()
    }
}

impl FromStr for SamplingInterval {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minutes = s.trim().parse::<u32>().map_err(|_| {
            AggregationError::InvalidInput(format!("`{s}` is not a number of minutes"))
        })?;
        Self::try_from(minutes)
    }
}

/// Signed UTC offset in the `±HH:MM` notation, for example `+08:00`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct UtcOffset(i32);

impl UtcOffset {
    #[must_use]
    pub const fn minutes(self) -> i32 {
        self.0
    }
}

impl FromStr for UtcOffset {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AggregationError::InvalidInput(format!("`{s}` is not a `±HH:MM` offset"));
        let s = s.trim();
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        let is_two_digits =
            |part: &str| part.len() == 2 && part.bytes().all(|byte| byte.is_ascii_digit());
        if !is_two_digits(hours) || !is_two_digits(minutes) {
            return Err(invalid());
        }
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        Ok(Self(sign * (hours * 60 + minutes)))
    }
}

impl Display for UtcOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let minutes = self.0.unsigned_abs();
        write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

/// Everything the engine needs to know about the deployment, passed explicitly.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct AggregationConfig {
    timezone_offset_minutes: i32,
    sampling_interval: SamplingInterval,
}

impl AggregationConfig {
    const MAX_OFFSET_MINUTES: i32 = 24 * 60;

    pub fn try_new(
        timezone_offset_minutes: i32,
        sampling_interval: SamplingInterval,
    ) -> Result<Self, AggregationError> {
        if timezone_offset_minutes.abs() >= Self::MAX_OFFSET_MINUTES {
            return Err(AggregationError::InvalidInput(format!(
                "timezone offset of {timezone_offset_minutes} minutes is out of range"
            )));
        }
        Ok(Self { timezone_offset_minutes, sampling_interval })
    }

    #[must_use]
    pub const fn timezone_offset_minutes(&self) -> i32 {
        self.timezone_offset_minutes
    }

    #[must_use]
    pub fn timezone_offset(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.timezone_offset_minutes))
    }

    #[must_use]
    pub const fn sampling_interval(&self) -> SamplingInterval {
        self.sampling_interval
    }

    /// Snap the start time down onto the sampling grid.
    #[must_use]
    pub fn normalize_start(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start.duration_trunc(self.sampling_interval.time_delta()).unwrap_or(start)
    }

    /// Interpret the local wall-clock time in the configured offset.
    ///
    /// `None` when the result falls outside the supported calendar.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        local.checked_sub_signed(self.timezone_offset()).map(|utc| utc.and_utc())
    }

    /// Shift the instant into the configured local wall-clock time.
    ///
    /// `None` when the result falls outside the supported calendar.
    #[must_use]
    pub fn to_local(&self, utc: DateTime<Utc>) -> Option<NaiveDateTime> {
        utc.naive_utc().checked_add_signed(self.timezone_offset())
    }

    /// Parse a local wall-clock time like `2025-01-31T00:00:00`.
    pub fn parse_local(&self, local: &str) -> Result<DateTime<Utc>, AggregationError> {
        let parsed = NaiveDateTime::parse_from_str(local.trim(), LOCAL_DATETIME_FORMAT)
            .map_err(|error| {
                AggregationError::InvalidInput(format!("`{local}` is not a local date-time: {error}"))
            })?;
        self.to_utc(parsed).ok_or_else(|| {
            AggregationError::InvalidInput(format!("`{local}` is outside the supported calendar"))
        })
    }

    /// Parse local period bounds into a UTC interval with the start snapped onto the sampling grid.
    pub fn parse_period(&self, start: &str, end: &str) -> Result<Interval, AggregationError> {
        Interval::try_new(self.normalize_start(self.parse_local(start)?), self.parse_local(end)?)
    }
}

pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Options of the report pipeline that are not part of the engine itself.
#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Append the resolved tariffs to the parameters of the report.
    pub append_tariffs: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { append_tariffs: true }
    }
}

/// Configuration file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aggregation: AggregationSection,
    pub report: ReportOptions,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AggregationSection {
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub utc_offset: Option<UtcOffset>,

    pub minutes_to_count: Option<SamplingInterval>,
}

impl Config {
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse `{}`", path.display()))
    }

    /// Build the engine configuration, letting explicit overrides win over the file.
    pub fn aggregation(
        &self,
        utc_offset: Option<UtcOffset>,
        sampling_interval: Option<SamplingInterval>,
    ) -> Result<AggregationConfig> {
        let offset = utc_offset.or(self.aggregation.utc_offset).unwrap_or_default();
        let sampling_interval =
            sampling_interval.or(self.aggregation.minutes_to_count).unwrap_or_default();
        Ok(AggregationConfig::try_new(offset.minutes(), sampling_interval)?)
    }
}
