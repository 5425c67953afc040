use serde::Serialize;

use crate::error::SelectorError;
use crate::geometry::{polygon_metrics_or_fallback, AreaMetrics};
use crate::types::Polygon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectorState {
    #[default]
    Idle,
    Drawing,
    HasShape,
}

/// The single user-selected polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnArea {
    pub polygon: Polygon,
}

impl DrawnArea {
    /// Metrics are derived on demand and never cached.
    pub fn metrics(&self) -> AreaMetrics {
        polygon_metrics_or_fallback(&self.polygon)
    }
}

/// Signals the controller emits instead of calling into presentation code.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
    /// A shape was completed or clicked; the details panel should open.
    AreaSelected(AreaMetrics),
}

/// Draw controller holding at most one polygon.
#[derive(Debug, Default)]
pub struct AreaSelector {
    state: SelectorState,
    area: Option<DrawnArea>,
}

impl AreaSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn area(&self) -> Option<&DrawnArea> {
        self.area.as_ref()
    }

    /// Enter polygon drawing mode. An existing shape is discarded.
    pub fn start_drawing(&mut self) {
        match self.state {
            SelectorState::Drawing => {}
            SelectorState::Idle | SelectorState::HasShape => {
                self.area = None;
                self.state = SelectorState::Drawing;
                log::debug!("area selector: drawing started");
            }
        }
    }

    /// The user closed the polygon. Replaces any previous shape.
    ///
    /// Drawing mode stays armed after a shape is finished, so a second
    /// completion from `HasShape` supersedes the first.
    pub fn complete_drawing(&mut self, polygon: Polygon) -> Result<SelectorEvent, SelectorError> {
        if self.state == SelectorState::Idle {
            return Err(SelectorError::NotDrawing);
        }
        if let Some(prior) = self.area.take() {
            log::debug!("area selector: replacing {}-vertex shape", prior.polygon.len());
        }
        let area = DrawnArea { polygon };
        let metrics = area.metrics();
        log::info!(
            "area selected: {} vertices, {} km², {} km",
            area.polygon.len(),
            metrics.area_km2,
            metrics.perimeter_km
        );
        self.area = Some(area);
        self.state = SelectorState::HasShape;
        Ok(SelectorEvent::AreaSelected(metrics))
    }

    /// Clicking the tracked shape opens its details again.
    pub fn reselect(&self) -> Option<SelectorEvent> {
        self.area
            .as_ref()
            .map(|area| SelectorEvent::AreaSelected(area.metrics()))
    }

    pub fn clear_drawings(&mut self) {
        self.area = None;
        self.state = SelectorState::Idle;
    }
}
