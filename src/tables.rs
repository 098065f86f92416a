use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use meterstat::{
    comparison::StatisticKind,
    config::{AggregationConfig, LOCAL_DATETIME_FORMAT},
    core::Bucket,
    parameters::{ParameterSeries, Point, Sample},
    report::CategoryReport,
};
use rust_decimal::Decimal;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn value_cell(value: Option<Decimal>) -> Cell {
    match value {
        Some(value) => Cell::new(value.normalize()).set_alignment(CellAlignment::Right),
        None => Cell::new("–").set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
    }
}

fn rate_cell(rate: Option<Decimal>) -> Cell {
    let Some(percent) = rate.and_then(|rate| rate.checked_mul(Decimal::ONE_HUNDRED)) else {
        return value_cell(None);
    };
    Cell::new(format!("{percent:+.2}%")).set_alignment(CellAlignment::Right).fg(
        if percent > Decimal::ZERO {
            Color::Red
        } else if percent < Decimal::ZERO {
            Color::Green
        } else {
            Color::Reset
        },
    )
}

fn timestamp_cell(bucket: Option<&Bucket>) -> Cell {
    bucket.map_or_else(|| Cell::new(""), |bucket| Cell::new(&bucket.local_timestamp))
}

/// Buckets of both periods side by side, paired by position.
#[must_use]
pub fn build_category_table(report: &CategoryReport) -> Table {
    let comparison = &report.comparison;
    let n_rows = comparison.base.buckets.len().max(comparison.reporting.buckets.len());

    let mut table = new_table();
    table.set_header(vec!["Base", "Value", "Reporting", "Value", "Rate", "Cost"]);
    for index in 0..n_rows {
        let base = comparison.base.buckets.get(index);
        let reporting = comparison.reporting.buckets.get(index);
        table.add_row(vec![
            timestamp_cell(base).add_attribute(Attribute::Dim),
            value_cell(base.and_then(|bucket| bucket.value)),
            timestamp_cell(reporting),
            value_cell(reporting.and_then(|bucket| bucket.value)),
            rate_cell(comparison.rates.get(index).copied().flatten()),
            value_cell(report.cost.buckets.get(index).and_then(|bucket| bucket.value)),
        ]);
    }
    table
}

#[must_use]
pub fn build_statistics_table(report: &CategoryReport) -> Table {
    let comparison = &report.comparison;

    let mut table = new_table();
    table.set_header(vec!["", "Base", "Reporting", "Per unit area", "Increment", "Cost"]);
    table.add_row(vec![
        Cell::new("Subtotal").add_attribute(Attribute::Bold),
        value_cell(Some(comparison.base.subtotal)),
        value_cell(Some(comparison.reporting.subtotal)),
        value_cell(None),
        value_cell(None),
        value_cell(Some(report.cost.subtotal)),
    ]);
    for kind in StatisticKind::ALL {
        table.add_row(vec![
            Cell::new(kind).add_attribute(Attribute::Bold),
            value_cell(comparison.base.statistics.get(kind)),
            value_cell(comparison.reporting.statistics.get(kind)),
            value_cell(comparison.per_unit_area.get(kind).map(|value| value.round_dp(6))),
            rate_cell(comparison.increment_rate.get(kind)),
            value_cell(report.cost.statistics.get(kind).map(|value| value.round_dp(6))),
        ]);
    }
    table
}

#[must_use]
pub fn build_parameters_table(parameters: &[ParameterSeries]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Parameter", "Timestamp", "Value"]);
    for series in parameters {
        if series.is_empty() {
            table.add_row(vec![Cell::new(&series.name), Cell::new(""), value_cell(None)]);
        }
        for (timestamp, value) in series.timestamps.iter().zip(&series.values) {
            table.add_row(vec![
                Cell::new(&series.name),
                Cell::new(timestamp.format(LOCAL_DATETIME_FORMAT)).add_attribute(Attribute::Dim),
                value_cell(Some(*value)),
            ]);
        }
    }
    table
}

#[must_use]
pub fn build_latest_values_table(rows: &[(Point, Sample)], config: &AggregationConfig) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Point", "Kind", "Timestamp", "Value"]);
    for (point, sample) in rows {
        table.add_row(vec![
            Cell::new(point.id).add_attribute(Attribute::Dim),
            Cell::new(point.parameter_name()),
            Cell::new(point.kind),
            Cell::new(
                config
                    .to_local(sample.timestamp)
                    .map(|local| local.format(LOCAL_DATETIME_FORMAT).to_string())
                    .unwrap_or_default(),
            ),
            value_cell(Some(sample.value)),
        ]);
    }
    table
}
