use chrono::{DateTime, Utc};

/// Contract violations raised by the aggregation engine.
///
/// Missing data is never an error: sparse buckets, absent base statistics and zero areas
/// all degrade to `None` fields instead.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("invalid range: start {start} must precede end {end}")]
    InvalidRange { start: DateTime<Utc>, end: DateTime<Utc> },

    #[error("invalid granularity `{0}`, expected one of: hourly, daily, weekly, monthly, yearly")]
    InvalidGranularity(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
