use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::prelude::*;

/// Half-open UTC time range.
#[derive(Copy, Clone, Eq, PartialEq, Serialize)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Utc>,

    /// Exclusive.
    pub end: DateTime<Utc>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AggregationError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(AggregationError::InvalidRange { start, end })
        }
    }

    #[must_use]
    pub fn contains(self, other: DateTime<Utc>) -> bool {
        (self.start <= other) && (other < self.end)
    }

    /// Closed-range membership, for collaborators that query `BETWEEN start AND end`.
    #[must_use]
    pub fn contains_inclusive(self, other: DateTime<Utc>) -> bool {
        (self.start <= other) && (other <= self.end)
    }
}
