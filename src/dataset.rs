use std::path::Path;

use itertools::Itertools;
use serde::Deserialize;

use crate::{
    core::{Interval, RawPoint},
    parameters::{Point, Sample},
    prelude::*,
    source::{
        Category,
        CategoryId,
        MetadataSource,
        PointSource,
        Subject,
        TariffSource,
        TelemetrySource,
    },
    tariff::{TariffBreakpoint, TariffSchedule},
};

/// JSON snapshot of everything the report collaborators would otherwise query.
#[derive(Debug, Deserialize)]
pub struct Dataset {
    subject: Subject,

    #[serde(default)]
    categories: Vec<CategoryData>,

    #[serde(default)]
    points: Vec<PointData>,
}

#[derive(Debug, Deserialize)]
struct CategoryData {
    #[serde(flatten)]
    category: Category,

    #[serde(default)]
    telemetry: Vec<RawPoint>,

    #[serde(default)]
    tariff: Vec<TariffBreakpoint>,
}

#[derive(Debug, Deserialize)]
struct PointData {
    #[serde(flatten)]
    point: Point,

    #[serde(default)]
    samples: Vec<Sample>,
}

impl Dataset {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let dataset: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        info!(
            subject = %dataset.subject.name,
            n_categories = dataset.categories.len(),
            n_points = dataset.points.len(),
            "loaded",
        );
        Ok(dataset)
    }

    fn category_data(&self, category_id: CategoryId) -> Result<&CategoryData> {
        self.categories
            .iter()
            .find(|data| data.category.id == category_id)
            .with_context(|| format!("category {category_id} is not in the dataset"))
    }

    /// Every sample of every point, for the realtime view.
    pub fn all_samples(&self) -> impl Iterator<Item = (&Point, Sample)> {
        self.points.iter().flat_map(|data| data.samples.iter().map(|sample| (&data.point, *sample)))
    }
}

impl TelemetrySource for Dataset {
    fn categories_with_data(&self, interval: Interval) -> Result<Vec<CategoryId>> {
        Ok(self
            .categories
            .iter()
            .filter(|data| data.telemetry.iter().any(|point| interval.contains(point.timestamp)))
            .map(|data| data.category.id)
            .collect())
    }

    fn telemetry(&self, category_id: CategoryId, interval: Interval) -> Result<Vec<RawPoint>> {
        Ok(self
            .category_data(category_id)?
            .telemetry
            .iter()
            .filter(|point| interval.contains(point.timestamp))
            .copied()
            .collect())
    }
}

impl MetadataSource for Dataset {
    fn subject(&self) -> Result<Subject> {
        Ok(self.subject.clone())
    }

    fn category(&self, category_id: CategoryId) -> Result<Category> {
        Ok(self.category_data(category_id)?.category.clone())
    }
}

impl TariffSource for Dataset {
    fn tariff(&self, category_id: CategoryId, interval: Interval) -> Result<TariffSchedule> {
        Ok(self
            .category_data(category_id)?
            .tariff
            .iter()
            .filter(|breakpoint| breakpoint.effective_time < interval.end)
            .copied()
            .collect())
    }
}

impl PointSource for Dataset {
    fn points(&self) -> Result<Vec<Point>> {
        Ok(self.points.iter().map(|data| data.point.clone()).collect())
    }

    fn samples(&self, point: &Point, interval: Interval) -> Result<Vec<Sample>> {
        Ok(self
            .points
            .iter()
            .filter(|data| data.point.id == point.id)
            .flat_map(|data| &data.samples)
            .filter(|sample| interval.contains_inclusive(sample.timestamp))
            .copied()
            .collect_vec())
    }
}

#[cfg(test)]
pub mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::dec;

    use super::*;
    use crate::parameters::{PointId, PointKind};

    pub const DATASET: &str = r#"
    {
        "subject": { "name": "Tenant A", "area": "100" },
        "categories": [
            {
                "id": 2,
                "name": "Water",
                "unit_of_measure": "m³",
                "telemetry": [
                    { "timestamp": "2025-02-01T00:00:00Z", "value": "1.5" }
                ]
            },
            {
                "id": 1,
                "name": "Electricity",
                "unit_of_measure": "kWh",
                "telemetry": [
                    { "timestamp": "2025-01-01T00:00:00Z", "value": "10" },
                    { "timestamp": "2025-01-01T01:00:00Z", "value": "20" },
                    { "timestamp": "2025-01-01T03:00:00Z", "value": "30" },
                    { "timestamp": "2025-02-01T00:00:00Z", "value": "15" },
                    { "timestamp": "2025-02-01T02:00:00Z", "value": "25" },
                    { "timestamp": "2025-02-01T03:00:00Z", "value": "45" }
                ],
                "tariff": [
                    { "effective_time": "2024-12-01T00:00:00Z", "unit_price": "0.10" },
                    { "effective_time": "2025-02-01T02:00:00Z", "unit_price": "0.20" },
                    { "effective_time": "2025-03-01T00:00:00Z", "unit_price": "0.30" }
                ]
            }
        ],
        "points": [
            {
                "id": 7,
                "name": "Temperature",
                "units": "°C",
                "kind": "ANALOG_VALUE",
                "samples": [
                    { "timestamp": "2025-02-01T01:00:00Z", "value": "21.5" },
                    { "timestamp": "2025-02-01T04:00:00Z", "value": "22.0" },
                    { "timestamp": "2025-02-01T05:00:00Z", "value": "23.0" }
                ]
            }
        ]
    }
    "#;

    pub fn dataset() -> Dataset {
        serde_json::from_str(DATASET).unwrap()
    }

    fn february() -> Interval {
        Interval::try_new(
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 4, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse() -> Result {
        let dataset = dataset();
        let subject = dataset.subject()?;
        assert_eq!(subject.name, "Tenant A");
        assert_eq!(subject.area, Some(dec!(100)));
        assert_eq!(dataset.category(CategoryId(1))?.unit_of_measure, "kWh");
        let points = dataset.points()?;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, PointId(7));
        assert_eq!(points[0].kind, PointKind::AnalogValue);
        Ok(())
    }

    #[test]
    fn test_unknown_category() {
        assert!(dataset().category(CategoryId(42)).is_err());
    }

    #[test]
    fn test_queries_respect_interval() -> Result {
        let dataset = dataset();
        assert_eq!(dataset.categories_with_data(february())?, [CategoryId(2), CategoryId(1)]);
        assert_eq!(dataset.telemetry(CategoryId(1), february())?.len(), 3);

        let schedule = dataset.tariff(CategoryId(1), february())?;
        assert_eq!(schedule.breakpoints().len(), 2);

        let point = &dataset.points()?[0];
        let samples = dataset.samples(point, february())?;
        let values = samples.iter().map(|sample| sample.value).collect_vec();
        assert_eq!(values, [dec!(21.5), dec!(22.0)]);
        Ok(())
    }

    #[test]
    fn test_all_samples() {
        assert_eq!(dataset().all_samples().count(), 3);
    }
}
