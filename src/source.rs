use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    core::{Interval, RawPoint},
    parameters::{Point, Sample},
    prelude::*,
    tariff::TariffSchedule,
};

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    derive_more::From,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Energy category metadata.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub unit_of_measure: String,
}

/// The tenant, meter or similar the report is built for.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,

    /// Floor area, unknown when absent.
    pub area: Option<Decimal>,
}

pub trait TelemetrySource {
    /// Categories with any telemetry within the interval.
    fn categories_with_data(&self, interval: Interval) -> Result<Vec<CategoryId>>;

    /// Deduplicated telemetry of the category within the interval, in no particular order.
    fn telemetry(&self, category_id: CategoryId, interval: Interval) -> Result<Vec<RawPoint>>;
}

pub trait MetadataSource {
    fn subject(&self) -> Result<Subject>;

    fn category(&self, category_id: CategoryId) -> Result<Category>;
}

pub trait TariffSource {
    /// Price schedule of the category, including the breakpoint preceding the interval if any.
    fn tariff(&self, category_id: CategoryId, interval: Interval) -> Result<TariffSchedule>;
}

pub trait PointSource {
    fn points(&self) -> Result<Vec<Point>>;

    fn samples(&self, point: &Point, interval: Interval) -> Result<Vec<Sample>>;
}

/// Everything a report needs.
pub trait Sources: TelemetrySource + MetadataSource + TariffSource + PointSource {}

impl<T> Sources for T where T: TelemetrySource + MetadataSource + TariffSource + PointSource {}
