use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Single pre-aggregated observation.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    derive_more::Constructor,
    Deserialize,
    Serialize,
)]
pub struct RawPoint {
    pub timestamp: DateTime<Utc>,

    /// `None` when the source recorded the hour without a reading.
    pub value: Option<Decimal>,
}
