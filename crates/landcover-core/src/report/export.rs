use chrono::{NaiveDate, SecondsFormat};
use serde::Serialize;

use super::{
    exported_recommendations, methodology, Field, Recommendation, ReportInput, CRITICAL_IMPACTS,
    SOCIOECONOMIC_FACTORS,
};
use crate::dataset::{
    ChangeRow, ClassCount, CoverageEntry, TimelineRow, METRIC_BARREN, METRIC_FOREST, METRIC_NDVI,
    METRIC_URBAN,
};
use crate::geometry::AreaMetrics;
use crate::types::FormattedPeriod;

pub const DATA_SOURCE: &str = "Remote Sensing Satellite Data";

// ─── Export schema ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisExport {
    pub metadata: Metadata,
    pub key_findings: KeyFindings,
    pub coverage_data: CoverageData,
    pub timeline_data: Vec<TimelineRow>,
    pub class_data: Vec<ClassCount>,
    pub change_summary: Vec<ChangeRow>,
    pub summary: String,
    pub environmental_impact: EnvironmentalImpact,
    pub methodology: String,
    pub strategic_recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub analysis_date: String,
    pub period: FormattedPeriod,
    pub location: String,
    pub data_source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_area: Option<AreaMetrics>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFindings {
    pub forest_loss: String,
    pub ndvi_decline: String,
    pub analysis_period_years: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageData {
    pub start_period: CoveragePeriod,
    pub end_period: CoveragePeriod,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoveragePeriod {
    pub date: String,
    pub data: Vec<CoverageEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalImpact {
    pub critical_impacts: Vec<&'static str>,
    pub socioeconomic_factors: Vec<&'static str>,
}

// ─── Assembly ────────────────────────────────────────────────────────

pub fn build_export(input: &ReportInput<'_>) -> AnalysisExport {
    let ds = input.dataset;
    let period = input.dates.formatted();

    AnalysisExport {
        metadata: Metadata {
            title: format!("Deforestation Analysis - {}", input.location),
            analysis_date: input.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            period: period.clone(),
            location: input.location.to_string(),
            data_source: DATA_SOURCE,
            selected_area: input.area,
        },
        key_findings: KeyFindings {
            forest_loss: input.metric(METRIC_FOREST, Field::Change, "-22.6%").to_string(),
            ndvi_decline: input.metric(METRIC_NDVI, Field::Change, "0.65 → 0.5").to_string(),
            analysis_period_years: ds.period_years(),
        },
        coverage_data: CoverageData {
            start_period: CoveragePeriod {
                date: period.from,
                data: ds.coverage_start.clone(),
            },
            end_period: CoveragePeriod {
                date: period.to,
                data: ds.coverage_end.clone(),
            },
        },
        timeline_data: ds.timeline.clone(),
        class_data: ds.classes.clone(),
        change_summary: ds.change_summary.clone(),
        summary: summary_text(input),
        environmental_impact: EnvironmentalImpact {
            critical_impacts: CRITICAL_IMPACTS.to_vec(),
            socioeconomic_factors: SOCIOECONOMIC_FACTORS.to_vec(),
        },
        methodology: methodology(ds.start_year, ds.end_year)
            .into_iter()
            .map(|(label, text)| format!("{label}: {text}"))
            .collect::<Vec<_>>()
            .join(" "),
        strategic_recommendations: exported_recommendations(),
    }
}

/// The natural-language paragraph with metric values substituted in.
pub fn summary_text(input: &ReportInput<'_>) -> String {
    let ds = input.dataset;
    format!(
        "Analysis of {location} from {start} to {end} reveals significant deforestation primarily \
         driven by agricultural expansion, urbanization, and illegal logging. Forest coverage \
         decreased from {f0} to {f1} (a {fc} loss), NDVI average declined from {n0} to {n1}, urban \
         coverage increased from {u0} to {u1} ({uc}), and barren land expanded from {b0} to {b1} \
         ({bc}). This contributes to habitat loss, soil erosion, and increased vulnerability to \
         natural disasters.",
        location = input.location,
        start = ds.start_year,
        end = ds.end_year,
        f0 = input.metric(METRIC_FOREST, Field::Start, "31%"),
        f1 = input.metric(METRIC_FOREST, Field::End, "24%"),
        fc = input.metric(METRIC_FOREST, Field::Change, "22.6%"),
        n0 = input.metric(METRIC_NDVI, Field::Start, "0.65"),
        n1 = input.metric(METRIC_NDVI, Field::End, "0.5"),
        u0 = input.metric(METRIC_URBAN, Field::Start, "30%"),
        u1 = input.metric(METRIC_URBAN, Field::End, "35%"),
        uc = input.metric(METRIC_URBAN, Field::Change, "+16.7%"),
        b0 = input.metric(METRIC_BARREN, Field::Start, "21%"),
        b1 = input.metric(METRIC_BARREN, Field::End, "25%"),
        bc = input.metric(METRIC_BARREN, Field::Change, "+19.0%"),
    )
}

/// `deforestation-analysis-YYYY-MM-DD.json`
pub fn export_filename(date: NaiveDate) -> String {
    format!("deforestation-analysis-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::types::Point;

    #[test]
    fn test_period_and_years() {
        let (ds, dates) = dataset_2020_2025();
        let export = build_export(&input(&ds, &dates));
        let json = serde_json::to_value(&export).unwrap();

        assert_eq!(
            json["metadata"]["period"],
            serde_json::json!({"from": "01/01/2020", "to": "08/01/2025"})
        );
        assert_eq!(json["keyFindings"]["analysisPeriodYears"], 5);
        assert_eq!(json["keyFindings"]["forestLoss"], "-31.4%");
        assert_eq!(json["keyFindings"]["ndviDecline"], "-0.15");
        assert_eq!(json["metadata"]["analysisDate"], "2025-09-14T08:30:00.000Z");
        assert_eq!(
            json["metadata"]["title"],
            "Deforestation Analysis - Chittagong, Bangladesh"
        );
        assert!(json["metadata"].get("selectedArea").is_none());
    }

    #[test]
    fn test_top_level_field_order() {
        let (ds, dates) = dataset_2020_2025();
        let text = serde_json::to_string(&build_export(&input(&ds, &dates))).unwrap();
        let keys = [
            "\"metadata\"",
            "\"keyFindings\"",
            "\"coverageData\"",
            "\"timelineData\"",
            "\"classData\"",
            "\"changeSummary\"",
            "\"summary\"",
            "\"environmentalImpact\"",
            "\"methodology\"",
            "\"strategicRecommendations\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_forest_row_uses_fallback() {
        let (mut ds, dates) = dataset_2020_2025();
        ds.change_summary.retain(|r| r.metric != METRIC_FOREST);
        let export = build_export(&input(&ds, &dates));

        assert_eq!(export.key_findings.forest_loss, "-22.6%");
        assert!(export
            .summary
            .contains("Forest coverage decreased from 31% to 24% (a 22.6% loss)"));
    }

    #[test]
    fn test_summary_uses_dataset_values() {
        let (ds, dates) = dataset_2020_2025();
        let summary = summary_text(&input(&ds, &dates));
        assert!(summary.starts_with("Analysis of Chittagong, Bangladesh from 2020 to 2025 reveals"));
        assert!(summary.contains("decreased from 35% to 24% (a -31.4% loss)"));
        assert!(summary.contains("NDVI average declined from 0.65 to 0.50"));
        assert!(summary.contains("barren land expanded from 17% to 27% (+58.8%)"));
    }

    #[test]
    fn test_selected_area_and_tables() {
        let (ds, dates) = dataset_2020_2025();
        let mut input = input(&ds, &dates);
        input.area = Some(AreaMetrics {
            area_km2: 30.12,
            perimeter_km: 22.4,
            centroid: Point::new(22.33, 91.83),
        });
        let json = serde_json::to_value(build_export(&input)).unwrap();

        assert_eq!(json["metadata"]["selectedArea"]["areaKm2"], 30.12);
        assert_eq!(json["coverageData"]["startPeriod"]["date"], "01/01/2020");
        assert_eq!(json["coverageData"]["endPeriod"]["data"][0]["value"], 24);
        assert_eq!(json["timelineData"].as_array().unwrap().len(), 6);
        assert_eq!(json["changeSummary"][2]["value2025"], "36%");
        assert_eq!(json["strategicRecommendations"][0]["priority"], "HIGH");
        let recs = json["strategicRecommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 4);
        assert!(recs.iter().all(|r| r["action"] != "Deploy satellite monitoring system"));
        assert_eq!(recs[2]["priority"], "MEDIUM");
        assert_eq!(recs[3]["expectedImpact"], "Restore 10% degraded areas");
        assert!(json["methodology"]
            .as_str()
            .unwrap()
            .ends_with("Temporal Coverage: Annual composite imagery from 2020-2025 with cloud coverage <10%."));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 14).unwrap();
        assert_eq!(export_filename(date), "deforestation-analysis-2025-09-14.json");
    }
}
