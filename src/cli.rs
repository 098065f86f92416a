mod realtime;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meterstat::{
    config::{AggregationConfig, Config, SamplingInterval, UtcOffset},
    dataset::Dataset,
    prelude::*,
};

pub use self::{
    realtime::{RealtimeArgs, realtime},
    report::{ReportArgs, report},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare the reporting period against the base period, category by category.
    #[clap(name = "report")]
    Report(Box<ReportArgs>),

    /// Show the latest values of the associated points.
    #[clap(name = "realtime")]
    Realtime(Box<RealtimeArgs>),
}

#[derive(Parser)]
pub struct DatasetArgs {
    /// JSON snapshot of the subject, its telemetry, tariffs and points.
    #[clap(long = "dataset", env = "DATASET_PATH")]
    pub path: PathBuf,
}

impl DatasetArgs {
    pub fn load(&self) -> Result<Dataset> {
        Dataset::read_from(&self.path)
    }
}

#[derive(Parser)]
pub struct AggregationArgs {
    /// Optional TOML configuration file.
    #[clap(long = "config", env = "METERSTAT_CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Deployment UTC offset, for example `+08:00`.
    #[clap(long, env = "UTC_OFFSET", allow_hyphen_values = true)]
    pub utc_offset: Option<UtcOffset>,

    /// Sampling interval of the telemetry in minutes: 30 or 60.
    #[clap(long, env = "MINUTES_TO_COUNT")]
    pub minutes_to_count: Option<SamplingInterval>,
}

impl AggregationArgs {
    /// Read the configuration file, if any, and apply the overrides on top of it.
    pub fn resolve(&self) -> Result<(Config, AggregationConfig)> {
        let config = match &self.config_path {
            Some(path) => Config::read_from(path)?,
            None => Config::default(),
        };
        let aggregation = config.aggregation(self.utc_offset, self.minutes_to_count)?;
        info!(
            timezone_offset_minutes = aggregation.timezone_offset_minutes(),
            sampling_interval = aggregation.sampling_interval().minutes(),
            "configured",
        );
        Ok((config, aggregation))
    }
}
