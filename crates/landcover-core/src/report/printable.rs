use super::document::{Block, Cell, Document, MetricTile, Section, Span, Table, TableStyle, Tone};
use super::{methodology, Field, ReportInput, CRITICAL_IMPACTS, RECOMMENDATIONS, SOCIOECONOMIC_FACTORS};
use crate::dataset::{
    coverage_value, one_decimal, CoverageEntry, TimelineRow, METRIC_BARREN, METRIC_FOREST, METRIC_NDVI, METRIC_URBAN,
    NOT_AVAILABLE,
};
use crate::types::format_long_date;

pub const REPORT_TITLE: &str = "Deforestation Analysis Report";

pub const EXECUTIVE_SUMMARY: &str = "Executive Summary";
pub const CHANGE_DETECTION: &str = "Change Detection Summary";
pub const LAND_COVERAGE: &str = "Land Coverage Analysis";
pub const ANNUAL_TREND: &str = "Annual Trend Analysis";
pub const ENVIRONMENTAL_IMPACT: &str = "Environmental Impact Assessment";
pub const METHODOLOGY: &str = "Methodology & Data Quality";
pub const RECOMMENDATIONS_TITLE: &str = "Strategic Recommendations";

/// Lay out the printable report. Section order is fixed.
pub fn build_document(input: &ReportInput<'_>) -> Document {
    let period = input.dates.formatted();
    let years = input.dataset.period_years();

    let mut meta = vec![format!(
        "Generated: {} | Satellite Remote Sensing Analysis",
        format_long_date(input.generated_at.date_naive())
    )];
    if let Some(area) = input.area {
        meta.push(format!(
            "Selected area: {} km² | Perimeter: {} km | Centroid: {:.4}, {:.4}",
            area.area_km2, area.perimeter_km, area.centroid.latitude, area.centroid.longitude
        ));
    }

    Document {
        title: REPORT_TITLE.to_string(),
        subtitle: format!("Analysis Period: {} to {}", period.from, period.to),
        meta,
        metrics: vec![
            MetricTile {
                value: input.metric(METRIC_FOREST, Field::Change, "-22.6%").to_string(),
                label: "Forest Loss",
            },
            MetricTile {
                value: input.metric(METRIC_NDVI, Field::Change, "0.65→0.5").to_string(),
                label: "NDVI Decline",
            },
            MetricTile {
                value: format!("{years} Years"),
                label: "Study Period",
            },
        ],
        sections: vec![
            Section {
                title: EXECUTIVE_SUMMARY,
                blocks: vec![Block::Paragraph(vec![Span::Text(executive_summary(input))])],
            },
            Section {
                title: CHANGE_DETECTION,
                blocks: vec![Block::Table(change_table(input))],
            },
            Section {
                title: LAND_COVERAGE,
                blocks: vec![Block::Table(coverage_table(input))],
            },
            Section {
                title: ANNUAL_TREND,
                blocks: vec![Block::Table(trend_table(&input.dataset.timeline))],
            },
            Section {
                title: ENVIRONMENTAL_IMPACT,
                blocks: vec![Block::Table(impact_table())],
            },
            Section {
                title: METHODOLOGY,
                blocks: vec![Block::Paragraph(methodology_spans(input))],
            },
            Section {
                title: RECOMMENDATIONS_TITLE,
                blocks: vec![Block::Table(recommendation_table())],
            },
        ],
    }
}

fn executive_summary(input: &ReportInput<'_>) -> String {
    format!(
        "Comprehensive satellite imagery analysis reveals critical deforestation in {region} region \
         with {fc} forest coverage decline over {years} years. Primary drivers include agricultural \
         expansion (62%), urbanization (23%), and illegal logging (15%). NDVI index decreased from \
         {n0} to {n1}, indicating severe vegetation health deterioration. Immediate intervention \
         required to prevent irreversible environmental degradation affecting biodiversity, soil \
         stability, and climate resilience.",
        region = input.region(),
        fc = input.metric(METRIC_FOREST, Field::Change, "22.6%"),
        years = input.dataset.period_years(),
        n0 = input.metric(METRIC_NDVI, Field::Start, "0.65"),
        n1 = input.metric(METRIC_NDVI, Field::End, "0.5"),
    )
}

fn change_table(input: &ReportInput<'_>) -> Table {
    let ds = input.dataset;
    let mut table = Table::new(
        TableStyle::Data,
        [
            "Metric".to_string(),
            format!("{} Value", ds.start_year),
            format!("{} Value", ds.end_year),
            "Change".to_string(),
        ],
    );
    if ds.change_summary.is_empty() {
        return table.row([Cell::new("No change detection data available").span(4)]);
    }
    for row in &ds.change_summary {
        let tone = if row.change.starts_with('-') {
            Tone::Negative
        } else {
            Tone::Positive
        };
        table = table.row([
            Cell::new(&row.metric),
            Cell::new(or_not_available(&row.value_start)),
            Cell::new(or_not_available(&row.value_end)),
            Cell::new(or_not_available(&row.change)).tone(tone),
        ]);
    }
    table
}

fn or_not_available(s: &str) -> &str {
    if s.is_empty() {
        NOT_AVAILABLE
    } else {
        s
    }
}

fn coverage_table(input: &ReportInput<'_>) -> Table {
    let ds = input.dataset;
    let period = input.dates.formatted();
    let value = |entries: &[CoverageEntry], name: &str, fallback: u32| {
        i64::from(coverage_value(entries, name).unwrap_or(fallback))
    };

    let forest = (value(&ds.coverage_start, "Forest", 31), value(&ds.coverage_end, "Forest", 24));
    let barren = (value(&ds.coverage_start, "Barren", 21), value(&ds.coverage_end, "Barren", 25));
    let urban = (value(&ds.coverage_start, "Urban", 30), value(&ds.coverage_end, "Urban", 35));

    Table::new(
        TableStyle::Coverage,
        [
            "Land Cover Type".to_string(),
            format!("Baseline ({})", period.from),
            format!("Current ({})", period.to),
            "Absolute Change".to_string(),
            "Percentage Change".to_string(),
            "Trend".to_string(),
        ],
    )
    .row([
        Cell::new("Forest Coverage").tone(Tone::Forest),
        Cell::new(format!("{}%", forest.0)),
        Cell::new(format!("{}%", forest.1)),
        Cell::new(format!("-{}%", forest.0 - forest.1)).tone(Tone::Negative),
        Cell::new(input.metric(METRIC_FOREST, Field::Change, "-22.6%")).tone(Tone::Negative),
        Cell::new("Declining ↓").tone(Tone::Negative),
    ])
    .row([
        Cell::new("Barren Land").tone(Tone::Barren),
        Cell::new(format!("{}%", barren.0)),
        Cell::new(format!("{}%", barren.1)),
        Cell::new(format!("+{}%", barren.1 - barren.0)).tone(Tone::Positive),
        Cell::new(input.metric(METRIC_BARREN, Field::Change, "+19.0%")).tone(Tone::Positive),
        Cell::new("Increasing ↑").tone(Tone::Positive),
    ])
    .row([
        Cell::new("Urban Areas").tone(Tone::Urban),
        Cell::new(format!("{}%", urban.0)),
        Cell::new(format!("{}%", urban.1)),
        Cell::new(format!("+{}%", urban.1 - urban.0)).tone(Tone::Positive),
        Cell::new(input.metric(METRIC_URBAN, Field::Change, "+16.7%")).tone(Tone::Positive),
        Cell::new("Expanding ↑").tone(Tone::Positive),
    ])
}

/// Year-over-year forest change and deforestation rate.
pub fn trend_table(timeline: &[TimelineRow]) -> Table {
    let mut table = Table::new(
        TableStyle::Data,
        [
            "Year",
            "Forest (%)",
            "Change",
            "Barren (%)",
            "Urban (%)",
            "Deforestation Rate",
        ],
    );
    let mut prev: Option<&TimelineRow> = None;
    for row in timeline {
        let (change, rate) = match prev {
            None => (Cell::new("Baseline"), NOT_AVAILABLE.to_string()),
            Some(p) => {
                let diff = f64::from(row.forest) - f64::from(p.forest);
                let sign = if diff > 0.0 { "+" } else { "" };
                let tone = (diff < 0.0).then_some(Tone::Negative);
                let rate = if p.forest == 0 {
                    NOT_AVAILABLE.to_string()
                } else {
                    format!("{:.1}%", one_decimal((diff / f64::from(p.forest) * 100.0).abs()))
                };
                (Cell::new(format!("{sign}{diff:.1}%")).maybe_tone(tone), rate)
            }
        };
        table = table.row([
            Cell::new(row.year.to_string()).strong(),
            Cell::new(format!("{}%", row.forest)),
            change,
            Cell::new(format!("{}%", row.barren)),
            Cell::new(format!("{}%", row.urban)),
            Cell::new(rate),
        ]);
        prev = Some(row);
    }
    table
}

fn impact_table() -> Table {
    CRITICAL_IMPACTS.iter().zip(SOCIOECONOMIC_FACTORS.iter()).fold(
        Table::new(TableStyle::Impact, ["Critical Impacts", "Socioeconomic Factors"]),
        |table, (impact, factor)| table.row([Cell::new(*impact), Cell::new(*factor)]),
    )
}

fn methodology_spans(input: &ReportInput<'_>) -> Vec<Span> {
    let entries = methodology(input.dataset.start_year, input.dataset.end_year);
    let last = entries.len().saturating_sub(1);
    let mut spans = Vec::with_capacity(entries.len() * 2);
    for (i, (label, text)) in entries.into_iter().enumerate() {
        let gap = if i < last { " " } else { "" };
        spans.push(Span::Strong(format!("{label}:")));
        spans.push(Span::Text(format!(" {text}{gap}")));
    }
    spans
}

fn recommendation_table() -> Table {
    RECOMMENDATIONS.iter().fold(
        Table::new(
            TableStyle::Data,
            ["Priority", "Action", "Timeline", "Expected Impact"],
        ),
        |table, rec| {
            table.row([
                Cell::new(rec.priority.as_str()).strong(),
                Cell::new(rec.action),
                Cell::new(rec.timeline),
                Cell::new(rec.expected_impact),
            ])
        },
    )
}
