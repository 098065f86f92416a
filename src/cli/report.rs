use clap::Parser;
use meterstat::{core::Granularity, prelude::*, report::Analyzer};

use crate::{
    cli::{AggregationArgs, DatasetArgs},
    tables::{build_category_table, build_parameters_table, build_statistics_table},
};

#[derive(Parser)]
pub struct ReportArgs {
    #[clap(flatten)]
    pub dataset: DatasetArgs,

    #[clap(flatten)]
    pub aggregation: AggregationArgs,

    /// `hourly`, `daily`, `weekly`, `monthly` or `yearly`.
    #[clap(long = "period-type", default_value = "daily", env = "PERIOD_TYPE")]
    pub granularity: Granularity,

    /// Local start of the base period, for example `2025-01-01T00:00:00`.
    #[clap(long, requires = "base_end")]
    pub base_start: Option<String>,

    /// Local end of the base period, exclusive.
    #[clap(long, requires = "base_start")]
    pub base_end: Option<String>,

    /// Local start of the reporting period.
    #[clap(long)]
    pub reporting_start: String,

    /// Local end of the reporting period, exclusive.
    #[clap(long)]
    pub reporting_end: String,

    /// Skip the tariff and point parameters.
    #[clap(long)]
    pub quick: bool,

    /// Print the report as JSON instead of tables.
    #[clap(long)]
    pub json: bool,
}

#[instrument(skip_all)]
pub fn report(args: &ReportArgs) -> Result {
    let (config, aggregation) = args.aggregation.resolve()?;
    let base = match (&args.base_start, &args.base_end) {
        (Some(start), Some(end)) => {
            Some(aggregation.parse_period(start, end).context("invalid base period")?)
        }
        _ => None,
    };
    let reporting = aggregation
        .parse_period(&args.reporting_start, &args.reporting_end)
        .context("invalid reporting period")?;
    let dataset = args.dataset.load()?;

    let report = Analyzer::builder()
        .config(&aggregation)
        .granularity(args.granularity)
        .maybe_base(base)
        .reporting(reporting)
        .options(config.report)
        .quick(args.quick)
        .build()
        .analyze(&dataset)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for category in &report.categories {
        println!("{} ({})", category.category.name, category.category.unit_of_measure);
        println!("{}", build_category_table(category));
        println!("{}", build_statistics_table(category));
    }
    if !report.parameters.is_empty() {
        println!("{}", build_parameters_table(&report.parameters));
    }
    Ok(())
}
