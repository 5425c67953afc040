use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::DateError;

/// Round a float to N decimal places.
pub fn round_f64(v: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (v * factor).round() / factor
}

/// Wrapper that rounds f64 to 6 decimal places on serialization.
fn serialize_f64_rounded<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_f64(*v, 6))
}

// ─── Coordinates ─────────────────────────────────────────────────────

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "lat", serialize_with = "serialize_f64_rounded")]
    pub latitude: f64,
    #[serde(rename = "lon", serialize_with = "serialize_f64_rounded")]
    pub longitude: f64,
}

impl Point {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Ordered vertices, implicitly closed (last connects to first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Point>);

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn vertices(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A polygon needs at least three vertices to enclose an area.
    pub fn is_valid(&self) -> bool {
        self.0.len() >= 3
    }

    /// Consecutive vertex pairs including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> {
        let n = self.0.len();
        (0..n).map(move |i| (&self.0[i], &self.0[(i + 1) % n]))
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

// ─── Dates ───────────────────────────────────────────────────────────

/// Inclusive analysis period. `from <= to` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Default for DateRange {
    fn default() -> Self {
        // 2020-01-01 .. 2025-08-01
        Self {
            from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            to: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Parse a pair of `YYYY-MM-DD` strings.
    pub fn parse(from: &str, to: &str) -> Result<Self, DateError> {
        Ok(Self {
            from: parse_date(from)?,
            to: parse_date(to)?,
        })
    }

    pub fn start_year(&self) -> i32 {
        self.from.year()
    }

    pub fn end_year(&self) -> i32 {
        self.to.year()
    }

    /// Whole calendar years between the start and end year.
    pub fn period_years(&self) -> i32 {
        self.end_year() - self.start_year()
    }

    pub fn is_reversed(&self) -> bool {
        self.from > self.to
    }

    /// The `{from, to}` pair as displayed in reports (MM/DD/YYYY).
    pub fn formatted(&self) -> FormattedPeriod {
        FormattedPeriod {
            from: format_us_date(self.from),
            to: format_us_date(self.to),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedPeriod {
    pub from: String,
    pub to: String,
}

pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| DateError::Invalid {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

/// en-US numeric date, e.g. `01/31/2024`.
pub fn format_us_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// en-US long date, e.g. `January 31, 2024`.
pub fn format_long_date(date: NaiveDate) -> String {
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_f64() {
        assert_eq!(round_f64(1.23456, 2), 1.23);
        assert_eq!(round_f64(1.235001, 2), 1.24);
        assert_eq!(round_f64(-0.004, 2), -0.0);
    }

    #[test]
    fn test_polygon_edges_wrap() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ]);
        let edges: Vec<_> = poly.edges().collect();
        assert_eq!(edges.len(), 3);
        assert_eq!(*edges[2].0, Point::new(1.0, 1.0));
        assert_eq!(*edges[2].1, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_date_range_years() {
        let range = DateRange::parse("2020-01-01", "2025-08-01").unwrap();
        assert_eq!(range.start_year(), 2020);
        assert_eq!(range.end_year(), 2025);
        assert_eq!(range.period_years(), 5);
        assert!(!range.is_reversed());
        assert_eq!(range, DateRange::default());
    }

    #[test]
    fn test_reversed_range_is_accepted() {
        let range = DateRange::parse("2024-01-01", "2021-01-01").unwrap();
        assert!(range.is_reversed());
        assert_eq!(range.period_years(), -3);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2020/01/01").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_formatting() {
        let range = DateRange::parse("2020-01-01", "2025-08-01").unwrap();
        let period = range.formatted();
        assert_eq!(period.from, "01/01/2020");
        assert_eq!(period.to, "08/01/2025");
        assert_eq!(format_long_date(range.to), "August 1, 2025");
    }

    #[test]
    fn test_point_serializes_short_keys() {
        let json = serde_json::to_string(&Point::new(23.8103, 90.4125)).unwrap();
        assert_eq!(json, r#"{"lat":23.8103,"lon":90.4125}"#);
    }
}
