#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

pub mod comparison;
pub mod config;
pub mod core;
pub mod dataset;
pub mod error;
pub mod parameters;
pub mod prelude;
pub mod report;
pub mod source;
pub mod statistics;
pub mod tariff;

pub use self::{
    comparison::{ComparativeResult, compare},
    config::AggregationConfig,
    core::{Bucket, Granularity, PeriodKey, RawPoint, series::bucketize},
    error::AggregationError,
    statistics::{StatsResult, summarize},
    tariff::{TariffBreakpoint, TariffSchedule, resolve_tariff},
};
