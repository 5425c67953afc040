use serde::{Deserialize, Serialize};

use crate::types::Point;

const ESRI_IMAGERY: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const ESRI_PLACES: &str = "https://server.arcgisonline.com/ArcGIS/rest/services/Reference/World_Boundaries_and_Places/MapServer/tile/{z}/{y}/{x}";
const OSM_STREETS: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Web Mercator cannot represent latitudes beyond this.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileMode {
    #[serde(rename = "satellite")]
    Satellite,
    #[default]
    #[serde(rename = "satellite+names+roads")]
    Hybrid,
    #[serde(rename = "roads")]
    Streets,
}

impl TileMode {
    pub const ALL: [TileMode; 3] = [TileMode::Satellite, TileMode::Hybrid, TileMode::Streets];

    pub fn label(self) -> &'static str {
        match self {
            TileMode::Satellite => "Satellite view",
            TileMode::Hybrid => "Hybrid view",
            TileMode::Streets => "Streets view",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TileMode::Satellite => "Pure satellite imagery",
            TileMode::Hybrid => "Satellite with labels",
            TileMode::Streets => "Street view with roads",
        }
    }

    /// Raster layers bottom to top.
    pub fn layers(self) -> Vec<TileLayer> {
        match self {
            TileMode::Satellite => vec![TileLayer::new(ESRI_IMAGERY, "© Esri © OpenStreetMap", &[])],
            TileMode::Hybrid => vec![
                TileLayer::new(ESRI_IMAGERY, "", &[]),
                TileLayer::new(ESRI_PLACES, "© Esri", &[]),
            ],
            TileMode::Streets => vec![TileLayer::new(OSM_STREETS, "© OpenStreetMap", &["a", "b", "c"])],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileLayer {
    pub url_template: &'static str,
    pub attribution: &'static str,
    pub subdomains: Vec<&'static str>,
}

impl TileLayer {
    fn new(url_template: &'static str, attribution: &'static str, subdomains: &[&'static str]) -> Self {
        Self {
            url_template,
            attribution,
            subdomains: subdomains.to_vec(),
        }
    }

    /// Expand `{z}`, `{x}`, `{y}` and `{s}` for one tile. Subdomains rotate
    /// by `(x + y) % n` so neighbouring tiles spread across hosts.
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> String {
        let mut url = self
            .url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string());
        if !self.subdomains.is_empty() {
            let idx = (x as usize + y as usize) % self.subdomains.len();
            url = url.replace("{s}", self.subdomains[idx]);
        }
        url
    }
}

/// Slippy-map tile containing `point` at `zoom`.
pub fn tile_for(point: Point, zoom: u32) -> (u32, u32) {
    let n = 2f64.powi(zoom as i32);
    let lat = point.latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = ((point.longitude + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n).floor();
    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(serde_json::to_string(&TileMode::Hybrid).unwrap(), r#""satellite+names+roads""#);
        let mode: TileMode = serde_json::from_str(r#""roads""#).unwrap();
        assert_eq!(mode, TileMode::Streets);
        assert_eq!(TileMode::default(), TileMode::Hybrid);
    }

    #[test]
    fn test_hybrid_stacks_overlay() {
        let layers = TileMode::Hybrid.layers();
        assert_eq!(layers.len(), 2);
        assert!(layers[1].url_template.contains("World_Boundaries_and_Places"));
    }

    #[test]
    fn test_esri_template_is_z_y_x() {
        let layer = &TileMode::Satellite.layers()[0];
        assert!(layer.tile_url(7, 95, 54).ends_with("/tile/7/54/95"));
    }

    #[test]
    fn test_osm_subdomain_rotation() {
        let layer = &TileMode::Streets.layers()[0];
        assert_eq!(layer.tile_url(3, 0, 0), "https://a.tile.openstreetmap.org/3/0/0.png");
        assert_eq!(layer.tile_url(3, 1, 0), "https://b.tile.openstreetmap.org/3/1/0.png");
        assert_eq!(layer.tile_url(3, 1, 1), "https://c.tile.openstreetmap.org/3/1/1.png");
    }

    #[test]
    fn test_tile_for() {
        assert_eq!(tile_for(Point::new(0.0, 0.0), 0), (0, 0));
        assert_eq!(tile_for(Point::new(0.0, 0.0), 1), (1, 1));
        // Dhaka at zoom 7.
        assert_eq!(tile_for(Point::new(23.8103, 90.4125), 7), (96, 55));
        // Poles and the antimeridian stay inside the grid.
        assert_eq!(tile_for(Point::new(90.0, 180.0), 2), (3, 0));
        assert_eq!(tile_for(Point::new(-90.0, -180.0), 2), (0, 3));
    }
}
