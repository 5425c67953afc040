pub mod document;
pub mod export;
pub mod html;
pub mod printable;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dataset::AnalysisDataset;
use crate::geometry::AreaMetrics;
use crate::types::DateRange;

pub use export::{build_export, export_filename, AnalysisExport};
pub use printable::build_document;

/// Everything the JSON export and the printable report are built from. Each
/// lookup into the change summary has a fallback literal, so a missing metric
/// shows a placeholder instead of a blank.
pub struct ReportInput<'a> {
    pub dataset: &'a AnalysisDataset,
    pub dates: &'a DateRange,
    pub area: Option<AreaMetrics>,
    /// Human-readable place name, e.g. "Chittagong, Bangladesh".
    pub location: &'a str,
    pub generated_at: DateTime<Utc>,
}

impl ReportInput<'_> {
    /// Look up one field of a change-summary row, or fall back.
    pub(crate) fn metric<'s>(&'s self, metric: &str, field: Field, fallback: &'s str) -> &'s str {
        self.dataset
            .change_row(metric)
            .map(|row| match field {
                Field::Start => row.value_start.as_str(),
                Field::End => row.value_end.as_str(),
                Field::Change => row.change.as_str(),
            })
            .filter(|v| !v.is_empty())
            .unwrap_or(fallback)
    }

    /// First component of the location label ("Chittagong" for
    /// "Chittagong, Bangladesh").
    pub(crate) fn region(&self) -> &str {
        self.location.split(',').next().unwrap_or(self.location).trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Start,
    End,
    Change,
}

// ─── Editorial content ───────────────────────────────────────────────

pub const CRITICAL_IMPACTS: [&str; 5] = [
    "Habitat fragmentation affecting 15+ endemic species",
    "Soil erosion risk increased by 35%",
    "Carbon sequestration capacity reduced by 28%",
    "Flood vulnerability enhanced in downstream areas",
    "Microclimate disruption and temperature increases",
];

pub const SOCIOECONOMIC_FACTORS: [&str; 5] = [
    "Population pressure: 2.3% annual growth",
    "Agricultural demand: 15% cropland expansion",
    "Urban development: 4 new industrial zones",
    "Economic drivers: Timber export revenues",
    "Policy gaps: Limited enforcement capacity",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub action: &'static str,
    pub timeline: &'static str,
    pub expected_impact: &'static str,
}

const fn rec(
    priority: Priority,
    action: &'static str,
    timeline: &'static str,
    expected_impact: &'static str,
) -> Recommendation {
    Recommendation {
        priority,
        action,
        timeline,
        expected_impact,
    }
}

/// Printable report recommendations. The JSON export omits the monitoring
/// entry, see [`exported_recommendations`].
pub const RECOMMENDATIONS: [Recommendation; 5] = [
    rec(
        Priority::High,
        "Emergency logging moratorium in critical zones",
        "Immediate",
        "Prevent 5% additional loss",
    ),
    rec(
        Priority::High,
        "Establish 50km² protected buffer zones",
        "3 months",
        "Protect remaining core habitat",
    ),
    rec(
        Priority::Medium,
        "Deploy satellite monitoring system",
        "6 months",
        "Real-time deforestation alerts",
    ),
    rec(
        Priority::Medium,
        "Implement sustainable agriculture programs",
        "12 months",
        "Reduce expansion pressure",
    ),
    rec(
        Priority::Low,
        "Community-based reforestation initiative",
        "24 months",
        "Restore 10% degraded areas",
    ),
];

const MONITORING_ACTION: &str = "Deploy satellite monitoring system";

pub fn exported_recommendations() -> Vec<Recommendation> {
    RECOMMENDATIONS
        .iter()
        .filter(|r| r.action != MONITORING_ACTION)
        .copied()
        .collect()
}

/// Methodology as (label, text) pairs; the last entry depends on the years.
pub fn methodology(start_year: i32, end_year: i32) -> Vec<(&'static str, String)> {
    vec![
        (
            "Data Sources",
            "Landsat 8/9 and Sentinel-2 satellite missions with 30m spatial resolution.".to_string(),
        ),
        (
            "Processing",
            "Google Earth Engine cloud computing platform with supervised machine learning classification."
                .to_string(),
        ),
        (
            "Validation",
            "Ground-truthing through field surveys in 25 representative locations.".to_string(),
        ),
        (
            "Accuracy",
            "Overall classification accuracy of 94.2% with kappa coefficient of 0.91.".to_string(),
        ),
        (
            "Temporal Coverage",
            format!("Annual composite imagery from {start_year}-{end_year} with cloud coverage <10%."),
        ),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::DateRange;

    pub fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 14, 8, 30, 0).unwrap()
    }

    pub fn dataset_2020_2025() -> (AnalysisDataset, DateRange) {
        let dates = DateRange::parse("2020-01-01", "2025-08-01").unwrap();
        (AnalysisDataset::for_range(&dates), dates)
    }

    pub fn input<'a>(dataset: &'a AnalysisDataset, dates: &'a DateRange) -> ReportInput<'a> {
        ReportInput {
            dataset,
            dates,
            area: None,
            location: "Chittagong, Bangladesh",
            generated_at: generated_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::dataset::{METRIC_FOREST, METRIC_NDVI};

    #[test]
    fn test_metric_lookup_and_fallback() {
        let (mut ds, dates) = dataset_2020_2025();
        {
            let input = input(&ds, &dates);
            assert_eq!(input.metric(METRIC_FOREST, Field::Change, "-22.6%"), "-31.4%");
            assert_eq!(input.metric(METRIC_NDVI, Field::End, "0.5"), "0.50");
            assert_eq!(input.metric("Water", Field::Start, "x"), "x");
        }

        ds.change_summary.retain(|r| r.metric != METRIC_FOREST);
        let input = input(&ds, &dates);
        assert_eq!(input.metric(METRIC_FOREST, Field::Change, "-22.6%"), "-22.6%");
    }

    #[test]
    fn test_empty_value_falls_back() {
        let (mut ds, dates) = dataset_2020_2025();
        ds.change_summary[0].value_start.clear();
        let input = input(&ds, &dates);
        assert_eq!(input.metric(METRIC_FOREST, Field::Start, "31%"), "31%");
    }

    #[test]
    fn test_region() {
        let (ds, dates) = dataset_2020_2025();
        let mut input = input(&ds, &dates);
        assert_eq!(input.region(), "Chittagong");
        input.location = "Sylhet";
        assert_eq!(input.region(), "Sylhet");
    }

    #[test]
    fn test_methodology_years() {
        let m = methodology(2020, 2025);
        assert_eq!(m.len(), 5);
        assert!(m[4].1.contains("2020-2025"));
    }
}
