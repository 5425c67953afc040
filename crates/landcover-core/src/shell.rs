use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::{AnalysisDialog, DialogEvent, DialogTimings, Step, TimerCommand, TimerTicket};
use crate::dataset::{AnalysisDataset, BASELINE_IMAGES, COMPARISON_IMAGES};
use crate::error::SelectorError;
use crate::geocode::Place;
use crate::geometry::AreaMetrics;
use crate::report::{self, AnalysisExport, ReportInput};
use crate::selector::{AreaSelector, SelectorEvent, SelectorState};
use crate::tiles::TileMode;
use crate::types::{DateRange, FormattedPeriod, Point, Polygon};

pub const DEFAULT_CENTER: Point = Point::new(23.8103, 90.4125);
pub const DEFAULT_ZOOM: u8 = 7;
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 18;
/// Zoom used whenever a search result or location fix recenters the map.
pub const FOCUS_ZOOM: u8 = 15;
pub const DEFAULT_LOCATION: &str = "Chittagong, Bangladesh";
pub const YOUR_LOCATION: &str = "Your Location";

/// Options the client passes to the device geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    #[serde(with = "millis")]
    pub timeout: Duration,
}

pub const GEOLOCATION_OPTIONS: GeolocationOptions = GeolocationOptions {
    enable_high_accuracy: true,
    timeout: Duration::from_secs(10),
};

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationError {
    PermissionDenied,
    Timeout,
    Unavailable,
    Unsupported,
}

impl GeolocationError {
    pub fn alert(self) -> &'static str {
        match self {
            GeolocationError::Unsupported => "Geolocation is not supported by this browser.",
            _ => "Could not get your location. Please enable location services.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub center: Point,
    pub zoom: u8,
    pub tile_mode: TileMode,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_mode: TileMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Point,
    pub label: String,
}

/// Top-level dashboard controller owning the map view, drawn area, date
/// range and analysis dialog. Operations that can start or stop dialog timers
/// return the [`TimerCommand`]s the caller must execute.
#[derive(Debug)]
pub struct MapShell {
    view: MapView,
    selector: AreaSelector,
    dates: DateRange,
    dataset: AnalysisDataset,
    dialog: AnalysisDialog,
    location_label: String,
    marker: Option<Marker>,
    alert: Option<String>,
}

impl Default for MapShell {
    fn default() -> Self {
        Self::new(DialogTimings::default(), DEFAULT_LOCATION)
    }
}

impl MapShell {
    pub fn new(timings: DialogTimings, location_label: &str) -> Self {
        let dates = DateRange::default();
        Self {
            view: MapView::default(),
            selector: AreaSelector::new(),
            dataset: AnalysisDataset::for_range(&dates),
            dates,
            dialog: AnalysisDialog::new(timings),
            location_label: location_label.to_string(),
            marker: None,
            alert: None,
        }
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn selector(&self) -> &AreaSelector {
        &self.selector
    }

    pub fn dialog(&self) -> &AnalysisDialog {
        &self.dialog
    }

    pub fn dates(&self) -> &DateRange {
        &self.dates
    }

    pub fn dataset(&self) -> &AnalysisDataset {
        &self.dataset
    }

    pub fn location_label(&self) -> &str {
        &self.location_label
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// The last user-facing alert, cleared when read.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    // ─── Map view ────────────────────────────────────────────────────

    pub fn set_tile_mode(&mut self, mode: TileMode) {
        self.view.tile_mode = mode;
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom = (self.view.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom = self.view.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    /// Center on a point at [`FOCUS_ZOOM`].
    pub fn recenter(&mut self, point: Point) {
        self.view.center = point;
        self.view.zoom = FOCUS_ZOOM;
    }

    /// Commit a geocoding result: recenter and label subsequent reports.
    pub fn commit_place(&mut self, place: &Place) {
        log::info!("recentering on {:?}", place.label);
        self.recenter(place.point());
        if !place.label.is_empty() {
            self.location_label = place.label.clone();
        }
    }

    /// Apply a one-shot device location result.
    pub fn locate(&mut self, fix: Result<Point, GeolocationError>) {
        match fix {
            Ok(point) => {
                self.recenter(point);
                self.marker = Some(Marker {
                    position: point,
                    label: YOUR_LOCATION.to_string(),
                });
            }
            Err(e) => {
                log::warn!("geolocation failed: {e:?}");
                self.raise_alert(e.alert());
            }
        }
    }

    // ─── Area selection ──────────────────────────────────────────────

    pub fn start_drawing(&mut self) {
        self.selector.start_drawing();
    }

    /// Finish the polygon being drawn; the analysis dialog opens.
    pub fn complete_drawing(&mut self, polygon: Polygon) -> Result<Vec<TimerCommand>, SelectorError> {
        let event = self.selector.complete_drawing(polygon)?;
        Ok(self.on_selector_event(event))
    }

    /// Click on the existing shape.
    pub fn reselect_area(&mut self) -> Vec<TimerCommand> {
        match self.selector.reselect() {
            Some(event) => self.on_selector_event(event),
            None => Vec::new(),
        }
    }

    pub fn clear_drawings(&mut self) {
        self.selector.clear_drawings();
    }

    fn on_selector_event(&mut self, event: SelectorEvent) -> Vec<TimerCommand> {
        match event {
            SelectorEvent::AreaSelected(_) => self.dialog.handle(DialogEvent::Open),
        }
    }

    pub fn area_metrics(&self) -> Option<AreaMetrics> {
        self.selector.area().map(|a| a.metrics())
    }

    // ─── Dates and dialog ────────────────────────────────────────────

    pub fn set_dates(&mut self, dates: DateRange) {
        self.dates = dates;
        self.dataset = AnalysisDataset::for_range(&dates);
    }

    pub fn analyze(&mut self) -> Vec<TimerCommand> {
        self.dialog.handle(DialogEvent::Analyze)
    }

    pub fn close_dialog(&mut self) -> Vec<TimerCommand> {
        self.dialog.handle(DialogEvent::Close)
    }

    pub fn timer_fired(&mut self, ticket: TimerTicket) -> Vec<TimerCommand> {
        self.dialog.handle(DialogEvent::TimerFired(ticket))
    }

    // ─── Reports ─────────────────────────────────────────────────────

    fn report_input(&self, generated_at: DateTime<Utc>) -> ReportInput<'_> {
        ReportInput {
            dataset: &self.dataset,
            dates: &self.dates,
            area: self.area_metrics(),
            location: &self.location_label,
            generated_at,
        }
    }

    pub fn export(&self, generated_at: DateTime<Utc>) -> AnalysisExport {
        report::build_export(&self.report_input(generated_at))
    }

    pub fn printable_report(&self, generated_at: DateTime<Utc>) -> String {
        report::html::render_printable(&report::build_document(&self.report_input(generated_at)))
    }

    pub fn snapshot(&self) -> ShellSnapshot<'_> {
        let step = self.dialog.step();
        let status = step.status_text();
        // A closed dialog keeps its step until the reset timer fires.
        let showing = |s: Step| self.dialog.is_open() && step == s;
        ShellSnapshot {
            view: &self.view,
            selector: self.selector.state(),
            area: self.selector.area().map(|a| &a.polygon),
            metrics: self.area_metrics(),
            dates: self.dates.formatted(),
            location: &self.location_label,
            marker: self.marker.as_ref(),
            dialog: DialogSnapshot {
                open: self.dialog.is_open(),
                step,
                headline: status.map(|s| s.0),
                detail: status.map(|s| s.1),
                baseline_images: showing(Step::Images).then_some(&BASELINE_IMAGES[..]),
                comparison_images: showing(Step::Images).then_some(&COMPARISON_IMAGES[..]),
                results: showing(Step::Results).then_some(&self.dataset),
            },
            alert: self.alert.as_deref(),
        }
    }
}

/// Read-only view of the shell for presentation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSnapshot<'a> {
    pub view: &'a MapView,
    pub selector: SelectorState,
    pub area: Option<&'a Polygon>,
    pub metrics: Option<AreaMetrics>,
    pub dates: FormattedPeriod,
    pub location: &'a str,
    pub marker: Option<&'a Marker>,
    pub dialog: DialogSnapshot<'a>,
    pub alert: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogSnapshot<'a> {
    pub open: bool,
    pub step: Step,
    pub headline: Option<&'static str>,
    pub detail: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_images: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_images: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<&'a AnalysisDataset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![
            Point::new(22.30, 91.80),
            Point::new(22.30, 91.85),
            Point::new(22.35, 91.85),
            Point::new(22.35, 91.80),
        ])
    }

    #[test]
    fn test_zoom_clamps() {
        let mut shell = MapShell::default();
        for _ in 0..30 {
            shell.zoom_in();
        }
        assert_eq!(shell.view().zoom, MAX_ZOOM);
        for _ in 0..30 {
            shell.zoom_out();
        }
        assert_eq!(shell.view().zoom, MIN_ZOOM);
    }

    #[test]
    fn test_completed_drawing_opens_dialog() {
        let mut shell = MapShell::default();
        shell.start_drawing();
        let cmds = shell.complete_drawing(square()).unwrap();
        assert_eq!(cmds.len(), 1);
        assert!(shell.dialog().is_open());
        assert_eq!(shell.dialog().step(), Step::Loading);

        // Clicking the shape while the dialog is open changes nothing.
        assert!(shell.reselect_area().is_empty());
    }

    #[test]
    fn test_reselect_after_close_reopens() {
        let mut shell = MapShell::default();
        shell.start_drawing();
        shell.complete_drawing(square()).unwrap();
        shell.close_dialog();
        assert!(!shell.dialog().is_open());
        assert!(!shell.reselect_area().is_empty());
        assert!(shell.dialog().is_open());
    }

    #[test]
    fn test_commit_place_recenters_and_labels() {
        let mut shell = MapShell::default();
        let place = Place {
            lat: 23.7,
            lon: 90.4,
            label: "Dhaka, Bangladesh".into(),
            name: "Dhaka".into(),
        };
        shell.commit_place(&place);
        assert_eq!(shell.view().center, Point::new(23.7, 90.4));
        assert_eq!(shell.view().zoom, FOCUS_ZOOM);
        assert_eq!(shell.location_label(), "Dhaka, Bangladesh");
    }

    #[test]
    fn test_locate_success_places_single_marker() {
        let mut shell = MapShell::default();
        shell.locate(Ok(Point::new(1.0, 2.0)));
        shell.locate(Ok(Point::new(3.0, 4.0)));
        let marker = shell.marker().unwrap();
        assert_eq!(marker.position, Point::new(3.0, 4.0));
        assert_eq!(marker.label, YOUR_LOCATION);
        assert_eq!(shell.view().zoom, FOCUS_ZOOM);
    }

    #[test]
    fn test_locate_failure_alerts_and_keeps_view() {
        let mut shell = MapShell::default();
        let before = *shell.view();
        shell.locate(Err(GeolocationError::PermissionDenied));
        assert_eq!(*shell.view(), before);
        assert_eq!(
            shell.take_alert().as_deref(),
            Some("Could not get your location. Please enable location services.")
        );
        assert!(shell.take_alert().is_none());

        shell.locate(Err(GeolocationError::Unsupported));
        assert_eq!(
            shell.take_alert().as_deref(),
            Some("Geolocation is not supported by this browser.")
        );
    }

    #[test]
    fn test_set_dates_recomputes_dataset() {
        let mut shell = MapShell::default();
        assert_eq!(shell.dataset().timeline.len(), 6);
        shell.set_dates(DateRange::parse("2022-03-01", "2024-03-01").unwrap());
        assert_eq!(shell.dataset().start_year, 2022);
        assert_eq!(shell.dataset().timeline.len(), 3);
    }

    #[test]
    fn test_snapshot_shows_images_only_in_images_step() {
        let mut shell = MapShell::default();
        shell.start_drawing();
        let cmds = shell.complete_drawing(square()).unwrap();
        let TimerCommand::Schedule { ticket, .. } = cmds[0] else {
            panic!("expected a scheduled timer");
        };
        let json = serde_json::to_value(shell.snapshot()).unwrap();
        assert!(json["dialog"].get("baselineImages").is_none());
        assert_eq!(json["dialog"]["headline"], "Finding satellite images...");

        shell.timer_fired(ticket);
        let json = serde_json::to_value(shell.snapshot()).unwrap();
        assert_eq!(json["dialog"]["step"], "images");
        assert_eq!(json["dialog"]["baselineImages"].as_array().unwrap().len(), 12);
        assert_eq!(json["view"]["tileMode"], "satellite+names+roads");
        assert_eq!(json["selector"], "hasShape");
    }

    fn fire_scheduled(shell: &mut MapShell, cmds: Vec<TimerCommand>) {
        for cmd in cmds {
            if let TimerCommand::Schedule { ticket, .. } = cmd {
                shell.timer_fired(ticket);
            }
        }
    }

    #[test]
    fn test_closed_dialog_hides_results_before_reset() {
        let mut shell = MapShell::default();
        shell.start_drawing();
        let cmds = shell.complete_drawing(square()).unwrap();
        fire_scheduled(&mut shell, cmds);
        let cmds = shell.analyze();
        fire_scheduled(&mut shell, cmds);
        let json = serde_json::to_value(shell.snapshot()).unwrap();
        assert_eq!(json["dialog"]["step"], "results");
        assert!(json["dialog"].get("results").is_some());

        shell.close_dialog();
        assert_eq!(shell.dialog().step(), Step::Results);
        let json = serde_json::to_value(shell.snapshot()).unwrap();
        assert_eq!(json["dialog"]["open"], false);
        assert!(json["dialog"].get("results").is_none());
    }

    #[test]
    fn test_geolocation_options() {
        let json = serde_json::to_value(GEOLOCATION_OPTIONS).unwrap();
        assert_eq!(json["enableHighAccuracy"], true);
        assert_eq!(json["timeout"], 10000);
    }
}
