use std::collections::BTreeMap;

use bon::Builder;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    comparison::{ComparativeResult, compare},
    config::{AggregationConfig, ReportOptions},
    core::{Granularity, Interval, series::Bucketize},
    parameters::ParameterSeries,
    prelude::*,
    source::{Category, CategoryId, Sources, Subject},
    statistics::{StatsResult, summarize},
};

/// Base-versus-reporting analysis of one subject.
#[derive(Builder)]
pub struct Analyzer<'a> {
    config: &'a AggregationConfig,
    granularity: Granularity,

    /// Comparison window, the report has no base figures without it.
    base: Option<Interval>,

    reporting: Interval,

    #[builder(default)]
    options: ReportOptions,

    /// Skip the parameters.
    #[builder(default)]
    quick: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub subject: Subject,
    pub granularity: Granularity,
    pub base: Option<Interval>,
    pub reporting: Interval,
    pub categories: Vec<CategoryReport>,
    pub parameters: Vec<ParameterSeries>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryReport {
    #[serde(flatten)]
    pub category: Category,

    #[serde(flatten)]
    pub comparison: ComparativeResult,

    /// Prices in effect during the reporting period, by local time.
    pub tariff: BTreeMap<NaiveDateTime, Decimal>,

    /// Reporting-period consumption weighted by the tariff.
    pub cost: StatsResult,
}

impl Analyzer<'_> {
    #[instrument(
        skip_all,
        fields(granularity = %self.granularity, reporting = ?self.reporting, quick = self.quick),
    )]
    pub fn analyze(&self, sources: &impl Sources) -> Result<Report> {
        let subject = sources.subject().context("failed to fetch the subject")?;

        let mut category_ids = sources.categories_with_data(self.reporting)?;
        if let Some(base) = self.base {
            category_ids.extend(sources.categories_with_data(base)?);
        }
        category_ids.sort_unstable();
        category_ids.dedup();
        info!(subject = %subject.name, n_categories = category_ids.len(), "analyzing…");

        let mut parameters = Vec::new();
        let mut categories = Vec::with_capacity(category_ids.len());
        for category_id in category_ids {
            let report = self
                .analyze_category(sources, category_id, subject.area)
                .with_context(|| format!("failed to analyze category {category_id}"))?;
            if self.options.append_tariffs && !self.quick {
                parameters.push(ParameterSeries::of_tariff(&report.category.name, &report.tariff));
            }
            categories.push(report);
        }

        if !self.quick {
            for point in sources.points()? {
                let samples = sources.samples(&point, self.reporting)?;
                parameters.push(ParameterSeries::of_point(
                    &point,
                    samples,
                    self.reporting,
                    self.config,
                )?);
            }
        }

        info!(n_categories = categories.len(), n_parameters = parameters.len(), "done");
        Ok(Report {
            subject,
            granularity: self.granularity,
            base: self.base,
            reporting: self.reporting,
            categories,
            parameters,
        })
    }

    #[instrument(skip_all, fields(%category_id))]
    fn analyze_category(
        &self,
        sources: &impl Sources,
        category_id: CategoryId,
        subject_area: Option<Decimal>,
    ) -> Result<CategoryReport> {
        let category = sources.category(category_id)?;

        let base = match self.base {
            Some(base) => summarize(
                sources.telemetry(category_id, base)?.bucketize(base, self.granularity, self.config)?,
            ),
            None => StatsResult::empty(),
        };
        let telemetry = sources.telemetry(category_id, self.reporting)?;
        let schedule = sources.tariff(category_id, self.reporting)?;
        let costs = schedule.weigh(telemetry.iter().copied());
        let reporting =
            summarize(telemetry.bucketize(self.reporting, self.granularity, self.config)?);
        let cost = summarize(costs.bucketize(self.reporting, self.granularity, self.config)?);

        Ok(CategoryReport {
            category,
            comparison: compare(base, reporting, subject_area),
            tariff: schedule.resolve(self.reporting, self.config)?,
            cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::dec;

    use super::*;
    use crate::dataset::tests::dataset;

    fn base() -> Interval {
        Interval::try_new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 4, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn reporting() -> Interval {
        Interval::try_new(
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 4, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_analyze() -> Result {
        let config = AggregationConfig::default();
        let report = Analyzer::builder()
            .config(&config)
            .granularity(Granularity::Hourly)
            .base(base())
            .reporting(reporting())
            .build()
            .analyze(&dataset())?;

        assert_eq!(report.subject.name, "Tenant A");
        let ids: Vec<_> = report.categories.iter().map(|report| report.category.id).collect();
        assert_eq!(ids, [CategoryId(1), CategoryId(2)]);

        let electricity = &report.categories[0].comparison;
        assert_eq!(electricity.base.subtotal, dec!(60));
        assert_eq!(electricity.reporting.subtotal, dec!(85));
        assert_eq!(electricity.rates, [Some(dec!(0.5)), None, None, Some(dec!(0.5))]);
        assert_eq!(electricity.per_unit_area.maximum, Some(dec!(0.45)));
        assert_eq!(
            electricity.increment_rate.mean.map(|rate| rate.round_dp(4)),
            Some(dec!(0.4167))
        );

        // 15 × 0.10 + 25 × 0.20 + 45 × 0.20:
        assert_eq!(report.categories[0].cost.subtotal, dec!(15.5));
        assert_eq!(report.categories[0].tariff.len(), 2);

        // Water has no base telemetry:
        let water = &report.categories[1].comparison;
        assert_eq!(water.base.subtotal, Decimal::ZERO);
        assert_eq!(water.increment_rate.mean, None);

        let names: Vec<_> = report.parameters.iter().map(|series| series.name.as_str()).collect();
        assert_eq!(names, ["Tariff-Electricity", "Tariff-Water", "Temperature (°C)"]);
        assert_eq!(report.parameters[1].len(), 0);
        assert_eq!(report.parameters[2].values, [dec!(21.5), dec!(22.0)]);
        Ok(())
    }

    #[test]
    fn test_quick_mode_skips_parameters() -> Result {
        let config = AggregationConfig::default();
        let report = Analyzer::builder()
            .config(&config)
            .granularity(Granularity::Daily)
            .reporting(reporting())
            .quick(true)
            .build()
            .analyze(&dataset())?;
        assert!(report.parameters.is_empty());
        assert_eq!(report.categories.len(), 2);
        assert_eq!(report.categories[0].comparison.reporting.buckets.len(), 1);
        assert_eq!(report.categories[0].comparison.base, StatsResult::empty());
        Ok(())
    }

    #[test]
    fn test_without_tariff_parameters() -> Result {
        let config = AggregationConfig::default();
        let report = Analyzer::builder()
            .config(&config)
            .granularity(Granularity::Hourly)
            .reporting(reporting())
            .options(ReportOptions { append_tariffs: false })
            .build()
            .analyze(&dataset())?;
        assert_eq!(report.parameters.len(), 1);
        Ok(())
    }

    #[test]
    fn test_report_serializes() -> Result {
        let config = AggregationConfig::default();
        let report = Analyzer::builder()
            .config(&config)
            .granularity(Granularity::Hourly)
            .base(base())
            .reporting(reporting())
            .build()
            .analyze(&dataset())?;
        let json = serde_json::to_value(&report)?;
        assert_eq!(json["categories"][0]["name"], "Electricity");
        assert_eq!(json["granularity"], "hourly");
        assert!(json["categories"][0]["tariff"].is_object());
        Ok(())
    }
}
