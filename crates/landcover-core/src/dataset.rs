use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::types::{round_f64, DateRange};

pub const FOREST_COLOR: &str = "#10b981";
pub const BARREN_COLOR: &str = "#f97316";
pub const URBAN_COLOR: &str = "#ef4444";

pub const METRIC_FOREST: &str = "Forest Coverage";
pub const METRIC_NDVI: &str = "NDVI Average";
pub const METRIC_URBAN: &str = "Urban Coverage";
pub const METRIC_BARREN: &str = "Barren Land";

pub const NOT_AVAILABLE: &str = "N/A";

const NDVI_START: f64 = 0.65;
const NDVI_END: f64 = 0.5;

/// Placeholder tiles for the baseline period.
pub static BASELINE_IMAGES: [&str; 12] = [
    "/images/AnnualCrop_1054.jpg",
    "/images/AnnualCrop_1143.jpg",
    "/images/AnnualCrop_1184.jpg",
    "/images/Forest_1.jpg",
    "/images/Forest_1056.jpg",
    "/images/Highway_1061.jpg",
    "/images/River_1008.jpg",
    "/images/Forest_1135.jpg",
    "/images/HerbaceousVegetation_1044.jpg",
    "/images/HerbaceousVegetation_1090.jpg",
    "/images/AnnualCrop_1054.jpg",
    "/images/Highway_1061.jpg",
];

/// Placeholder tiles for the comparison period.
pub static COMPARISON_IMAGES: [&str; 12] = [
    "/images/Highway_1064.jpg",
    "/images/Highway_1075.jpg",
    "/images/River_1008.jpg",
    "/images/Highway_1061.jpg",
    "/images/Forest_1056.jpg",
    "/images/Forest_1135.jpg",
    "/images/HerbaceousVegetation_1044.jpg",
    "/images/AnnualCrop_1054.jpg",
    "/images/Forest_1135.jpg",
    "/images/HerbaceousVegetation_1044.jpg",
    "/images/Highway_1061.jpg",
    "/images/River_1008.jpg",
];

// ─── Table rows ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageEntry {
    pub name: &'static str,
    pub value: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    #[serde(serialize_with = "serialize_year")]
    pub year: i32,
    pub forest: u32,
    pub barren: u32,
    pub urban: u32,
}

fn serialize_year<S: Serializer>(year: &i32, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(year)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub name: &'static str,
    pub value: u32,
}

/// One change-summary row. Serializes with year-keyed value fields, e.g.
/// `{"metric": .., "value2020": .., "value2025": .., "change": ..}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRow {
    pub metric: String,
    pub start_year: i32,
    pub end_year: i32,
    pub value_start: String,
    pub value_end: String,
    pub change: String,
}

impl Serialize for ChangeRow {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let same_year = self.start_year == self.end_year;
        let mut map = s.serialize_map(Some(if same_year { 3 } else { 4 }))?;
        map.serialize_entry("metric", &self.metric)?;
        if same_year {
            // One key per year; the later value wins.
            map.serialize_entry(&format!("value{}", self.end_year), &self.value_end)?;
        } else {
            map.serialize_entry(&format!("value{}", self.start_year), &self.value_start)?;
            map.serialize_entry(&format!("value{}", self.end_year), &self.value_end)?;
        }
        map.serialize_entry("change", &self.change)?;
        map.end()
    }
}

// ─── Static tables ───────────────────────────────────────────────────

static FULL_TIMELINE: [TimelineRow; 12] = [
    row(2015, 45, 8, 15),
    row(2016, 43, 10, 17),
    row(2017, 41, 12, 19),
    row(2018, 39, 14, 21),
    row(2019, 37, 15, 23),
    row(2020, 35, 17, 26),
    row(2021, 33, 19, 28),
    row(2022, 31, 21, 30),
    row(2023, 29, 23, 32),
    row(2024, 27, 25, 34),
    row(2025, 24, 27, 36),
    row(2026, 22, 28, 38),
];

const fn row(year: i32, forest: u32, barren: u32, urban: u32) -> TimelineRow {
    TimelineRow {
        year,
        forest,
        barren,
        urban,
    }
}

pub fn full_timeline() -> &'static [TimelineRow] {
    &FULL_TIMELINE
}

pub fn baseline_coverage() -> Vec<CoverageEntry> {
    vec![
        coverage("Forest", 31, FOREST_COLOR),
        coverage("Barren", 21, BARREN_COLOR),
        coverage("Urban", 30, URBAN_COLOR),
    ]
}

pub fn comparison_coverage() -> Vec<CoverageEntry> {
    vec![
        coverage("Forest", 24, FOREST_COLOR),
        coverage("Barren", 25, BARREN_COLOR),
        coverage("Urban", 35, URBAN_COLOR),
    ]
}

fn coverage(name: &'static str, value: u32, color: &'static str) -> CoverageEntry {
    CoverageEntry { name, value, color }
}

pub fn class_counts() -> Vec<ClassCount> {
    [
        ("AnnualCrop", 5),
        ("Forest", 6),
        ("HerbaceousVegetation", 4),
        ("Highway", 6),
        ("Industrial", 0),
        ("Pasture", 0),
        ("PermanentCrop", 0),
        ("Residential", 0),
        ("River", 3),
        ("SeaLake", 0),
    ]
    .into_iter()
    .map(|(name, value)| ClassCount { name, value })
    .collect()
}

// ─── Derived dataset ─────────────────────────────────────────────────

/// Everything the results view and the reports consume for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDataset {
    pub start_year: i32,
    pub end_year: i32,
    pub coverage_start: Vec<CoverageEntry>,
    pub coverage_end: Vec<CoverageEntry>,
    pub timeline: Vec<TimelineRow>,
    pub classes: Vec<ClassCount>,
    pub change_summary: Vec<ChangeRow>,
}

impl AnalysisDataset {
    pub fn for_range(range: &DateRange) -> Self {
        let start_year = range.start_year();
        let end_year = range.end_year();
        if range.is_reversed() {
            log::warn!("date range {} .. {} is reversed", range.from, range.to);
        }
        let timeline = timeline_between(start_year, end_year);
        let change_summary = change_summary(&timeline, start_year, end_year);
        Self {
            start_year,
            end_year,
            coverage_start: baseline_coverage(),
            coverage_end: comparison_coverage(),
            timeline,
            classes: class_counts(),
            change_summary,
        }
    }

    pub fn period_years(&self) -> i32 {
        self.end_year - self.start_year
    }

    pub fn change_row(&self, metric: &str) -> Option<&ChangeRow> {
        self.change_summary.iter().find(|r| r.metric == metric)
    }
}

/// Coverage percentage of a named category, if present.
pub fn coverage_value(entries: &[CoverageEntry], name: &str) -> Option<u32> {
    entries.iter().find(|e| e.name == name).map(|e| e.value)
}

pub fn timeline_between(start_year: i32, end_year: i32) -> Vec<TimelineRow> {
    FULL_TIMELINE
        .iter()
        .filter(|r| r.year >= start_year && r.year <= end_year)
        .copied()
        .collect()
}

pub fn change_summary(timeline: &[TimelineRow], start_year: i32, end_year: i32) -> Vec<ChangeRow> {
    let start = timeline.iter().find(|r| r.year == start_year);
    let end = timeline.iter().find(|r| r.year == end_year);

    let make = |metric: &str, value_start: String, value_end: String, change: String| ChangeRow {
        metric: metric.to_string(),
        start_year,
        end_year,
        value_start,
        value_end,
        change,
    };

    let (Some(start), Some(end)) = (start, end) else {
        return [METRIC_FOREST, METRIC_NDVI, METRIC_URBAN, METRIC_BARREN]
            .into_iter()
            .map(|m| {
                make(
                    m,
                    NOT_AVAILABLE.to_string(),
                    NOT_AVAILABLE.to_string(),
                    NOT_AVAILABLE.to_string(),
                )
            })
            .collect();
    };

    vec![
        make(
            METRIC_FOREST,
            format!("{}%", start.forest),
            format!("{}%", end.forest),
            percent_change(start.forest, end.forest, false),
        ),
        make(
            METRIC_NDVI,
            format!("{NDVI_START:.2}"),
            format!("{NDVI_END:.2}"),
            format!("{:.2}", NDVI_END - NDVI_START),
        ),
        make(
            METRIC_URBAN,
            format!("{}%", start.urban),
            format!("{}%", end.urban),
            percent_change(start.urban, end.urban, true),
        ),
        make(
            METRIC_BARREN,
            format!("{}%", start.barren),
            format!("{}%", end.barren),
            percent_change(start.barren, end.barren, true),
        ),
    ]
}

/// `(end - start) / start` as a one-decimal percentage string.
fn percent_change(start: u32, end: u32, signed: bool) -> String {
    if start == 0 {
        return NOT_AVAILABLE.to_string();
    }
    let pct = one_decimal((end as f64 - start as f64) / start as f64 * 100.0);
    if signed {
        format!("{pct:+.1}%")
    } else {
        format!("{pct:.1}%")
    }
}

/// Rounds to one decimal with ties away from zero. `{:.1}` alone rounds
/// exact ties such as 6.25 to even.
pub(crate) fn one_decimal(v: f64) -> f64 {
    round_f64(v, 1)
}
