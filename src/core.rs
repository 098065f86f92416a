pub mod bucket;
pub mod granularity;
pub mod interval;
pub mod period;
pub mod point;
pub mod series;

pub use self::{
    bucket::Bucket,
    granularity::Granularity,
    interval::Interval,
    period::PeriodKey,
    point::RawPoint,
};
