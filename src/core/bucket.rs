use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::PeriodKey;

/// One aggregation unit of a report.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Bucket {
    pub key: PeriodKey,

    /// UTC start of the bucket, possibly preceding the requested range.
    pub start: DateTime<Utc>,

    /// Local start time formatted to the granularity's precision.
    pub local_timestamp: String,

    /// Sum of the contributing points, or `None` if nothing contributed.
    pub value: Option<Decimal>,
}
