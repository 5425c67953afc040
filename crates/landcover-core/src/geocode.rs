use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Queries shorter than this produce no suggestions and no request.
pub const MIN_SUGGEST_CHARS: usize = 3;
pub const SUGGESTION_LIMIT: usize = 5;

/// Photon geocoder response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Properties {
    pub name: Option<String>,
    pub street: Option<String>,
    pub housenumber: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// A geocoding hit ready for display and recentering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    pub name: String,
}

impl Place {
    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

impl From<&Feature> for Place {
    fn from(feature: &Feature) -> Self {
        let [lon, lat] = feature.geometry.coordinates;
        let props = &feature.properties;
        let name = non_empty(&props.name)
            .or_else(|| non_empty(&props.street))
            .unwrap_or("Unknown")
            .to_string();
        Self {
            lat,
            lon,
            label: format_label(props),
            name,
        }
    }
}

/// Join the available address fields with ", ".
pub fn format_label(props: &Properties) -> String {
    [
        &props.name,
        &props.street,
        &props.housenumber,
        &props.city,
        &props.state,
        &props.country,
    ]
    .into_iter()
    .filter_map(non_empty)
    .collect::<Vec<_>>()
    .join(", ")
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Whether a query is long enough to be sent for suggestions. Length counts
/// the query as typed, surrounding spaces included; blank input never qualifies.
pub fn should_suggest(query: &str) -> bool {
    !query.trim().is_empty() && query.chars().count() >= MIN_SUGGEST_CHARS
}
