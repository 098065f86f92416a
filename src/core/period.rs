use std::fmt::{Display, Formatter};

use chrono::{DateTime, Datelike, DurationRound, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::{config::AggregationConfig, core::Granularity};

/// Canonical label of a single bucket.
///
/// Calendar keys refer to the local calendar of the configured offset.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(untagged)]
pub enum PeriodKey {
    /// Start of a sampling slot, truncated to whole minutes.
    Instant(DateTime<Utc>),

    /// Local calendar day, used by both daily and weekly buckets.
    Date(NaiveDate),

    Month { year: i32, month: u32 },

    Year(i32),
}

impl PeriodKey {
    /// Key of the period containing the instant, `None` when its local time is out of calendar.
    #[must_use]
    pub fn of(
        granularity: Granularity,
        instant: DateTime<Utc>,
        config: &AggregationConfig,
    ) -> Option<Self> {
        let local = || config.to_local(instant);
        Some(match granularity {
            Granularity::Hourly => Self::Instant(
                instant.duration_trunc(config.sampling_interval().time_delta()).unwrap_or(instant),
            ),
            Granularity::Daily | Granularity::Weekly => Self::Date(local()?.date()),
            Granularity::Monthly => {
                let local = local()?;
                Self::Month { year: local.year(), month: local.month() }
            }
            Granularity::Yearly => Self::Year(local()?.year()),
        })
    }

    /// UTC instant the period starts at, `None` outside the supported calendar.
    #[must_use]
    pub fn start(self, config: &AggregationConfig) -> Option<DateTime<Utc>> {
        let date = match self {
            Self::Instant(instant) => return Some(instant),
            Self::Date(date) => date,
            Self::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1)?,
            Self::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1)?,
        };
        config.to_utc(date.and_time(NaiveTime::MIN))
    }

    /// Key of the immediately following period.
    #[must_use]
    pub fn next(self, config: &AggregationConfig) -> Option<Self> {
        match self {
            Self::Instant(instant) => {
                instant.checked_add_signed(config.sampling_interval().time_delta()).map(Self::Instant)
            }
            Self::Date(date) => date.succ_opt().map(Self::Date),
            Self::Month { year, month: 12 } => {
                year.checked_add(1).map(|year| Self::Month { year, month: 1 })
            }
            Self::Month { year, month } => Some(Self::Month { year, month: month + 1 }),
            Self::Year(year) => year.checked_add(1).map(Self::Year),
        }
    }
}

impl Display for PeriodKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instant(instant) => write!(f, "{}", instant.format("%Y-%m-%dT%H:%MZ")),
            Self::Date(date) => write!(f, "{date}"),
            Self::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Year(year) => write!(f, "{year:04}"),
        }
    }
}
