pub mod analysis;
pub mod dataset;
pub mod error;
pub mod geocode;
pub mod geometry;
pub mod report;
pub mod selector;
pub mod shell;
pub mod tiles;
pub mod types;

use analysis::DialogTimings;
use chrono::{DateTime, Utc};
use error::CoreError;
use shell::MapShell;
use std::path::Path;
use types::{DateRange, Polygon};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Html,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub dates: DateRange,
    pub area: Option<Polygon>,
    pub location: String,
    pub pretty: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            dates: DateRange::default(),
            area: None,
            location: shell::DEFAULT_LOCATION.to_string(),
            pretty: false,
        }
    }
}

/// Read a polygon from a JSON array of `{"lat": .., "lon": ..}` points.
pub fn load_polygon(path: &Path) -> Result<Polygon, CoreError> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Build a headless shell for the given options and render one report.
pub fn render_report(
    format: ReportFormat,
    opts: &ReportOptions,
    generated_at: DateTime<Utc>,
) -> Result<String, CoreError> {
    let mut shell = MapShell::new(DialogTimings::default(), &opts.location);
    shell.set_dates(opts.dates);
    if let Some(polygon) = &opts.area {
        shell.start_drawing();
        // Dialog timers have no consumer here.
        let _ = shell.complete_drawing(polygon.clone())?;
    }

    match format {
        ReportFormat::Json => {
            let export = shell.export(generated_at);
            let json = if opts.pretty {
                serde_json::to_string_pretty(&export)?
            } else {
                serde_json::to_string(&export)?
            };
            Ok(json)
        }
        ReportFormat::Html => Ok(shell.printable_report(generated_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use types::Point;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 14, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_render_json_with_area() {
        let opts = ReportOptions {
            area: Some(Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 0.01),
                Point::new(0.01, 0.01),
                Point::new(0.01, 0.0),
            ])),
            ..Default::default()
        };
        let json = render_report(ReportFormat::Json, &opts, generated_at()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["selectedArea"]["areaKm2"], 1.24);
        assert_eq!(value["metadata"]["location"], "Chittagong, Bangladesh");
    }

    #[test]
    fn test_render_html() {
        let opts = ReportOptions {
            dates: DateRange::parse("2021-01-01", "2024-01-01").unwrap(),
            location: "Sylhet, Bangladesh".into(),
            ..Default::default()
        };
        let html = render_report(ReportFormat::Html, &opts, generated_at()).unwrap();
        assert!(html.contains("deforestation in Sylhet region"));
        assert!(html.contains("3 Years"));
    }

    #[test]
    fn test_load_polygon_missing_file() {
        let err = load_polygon(Path::new("/nonexistent/area.json")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
