use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Period type a report is bucketed by.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,

    /// Keyed by calendar day, exactly like [`Granularity::Daily`].
    Weekly,

    Monthly,
    Yearly,
}

impl Granularity {
    pub const ALL: [Self; 5] = [Self::Hourly, Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Display format of a bucket's local start time.
    #[must_use]
    pub const fn display_format(self) -> &'static str {
        match self {
            Self::Hourly => "%Y-%m-%dT%H:%M:%S",
            Self::Daily | Self::Weekly => "%Y-%m-%d",
            Self::Monthly => "%Y-%m",
            Self::Yearly => "%Y",
        }
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|granularity| granularity.as_str() == s)
            .ok_or_else(|| AggregationError::InvalidGranularity(s.to_owned()))
    }
}
