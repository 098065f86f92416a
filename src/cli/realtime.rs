use chrono::{TimeDelta, Utc};
use clap::Parser;
use meterstat::{parameters::latest_values, prelude::*, source::PointSource};

use crate::{
    cli::{AggregationArgs, DatasetArgs},
    tables::build_latest_values_table,
};

#[derive(Parser)]
pub struct RealtimeArgs {
    #[clap(flatten)]
    pub dataset: DatasetArgs,

    #[clap(flatten)]
    pub aggregation: AggregationArgs,

    /// Only consider the samples taken within the last so many minutes.
    #[clap(long, default_value = "60", env = "REALTIME_WINDOW_MINUTES")]
    pub window_minutes: u32,

    /// Local time to look back from instead of now, for example `2025-01-01T12:00:00`.
    #[clap(long)]
    pub until: Option<String>,
}

#[instrument(skip_all, fields(window_minutes = args.window_minutes))]
pub fn realtime(args: &RealtimeArgs) -> Result {
    let (_, aggregation) = args.aggregation.resolve()?;
    let until = match &args.until {
        Some(until) => aggregation.parse_local(until)?,
        None => Utc::now(),
    };
    let since = until
        .checked_sub_signed(TimeDelta::minutes(i64::from(args.window_minutes)))
        .context("the window reaches before the supported calendar")?;

    let dataset = args.dataset.load()?;
    let latest =
        latest_values(dataset.all_samples().map(|(point, sample)| (point.id, sample)), since);
    let rows: Vec<_> = dataset
        .points()?
        .into_iter()
        .filter_map(|point| latest.get(&point.id).map(|sample| (point, *sample)))
        .collect();
    info!(n_points = rows.len(), %since, "fetched");

    println!("{}", build_latest_values_table(&rows, &aggregation));
    Ok(())
}
