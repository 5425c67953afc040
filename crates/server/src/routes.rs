use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use landcover_core::analysis::Step;
use landcover_core::geocode::Place;
use landcover_core::geometry::AreaMetrics;
use landcover_core::report::export_filename;
use landcover_core::selector::SelectorState;
use landcover_core::shell::{GeolocationError, MapShell, MapView, Marker, GEOLOCATION_OPTIONS};
use landcover_core::tiles::{TileLayer, TileMode};
use landcover_core::types::{DateRange, FormattedPeriod, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::search::SearchError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/state", get(get_state))
        .route("/api/tiles", get(get_tiles).put(put_tiles))
        .route("/api/view/zoom-in", post(zoom_in))
        .route("/api/view/zoom-out", post(zoom_out))
        .route("/api/search/suggest", get(suggest))
        .route("/api/search", post(search))
        .route("/api/search/select", post(select_place))
        .route("/api/locate", get(locate_options).post(locate))
        .route("/api/area/start", post(start_drawing))
        .route("/api/area", post(complete_area).delete(clear_area))
        .route("/api/area/select", post(reselect_area))
        .route("/api/dates", put(put_dates))
        .route("/api/dialog/analyze", post(analyze))
        .route("/api/dialog/close", post(close_dialog))
        .route("/api/report.json", get(report_json))
        .route("/api/report.html", get(report_html))
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    error: String,
}

/// Full presentation snapshot. A pending alert is delivered once.
async fn get_state(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let mut shell = state.shell.lock().await;
    let value = serde_json::to_value(shell.snapshot()).map_err(|e| {
        tracing::error!("snapshot serialization failed: {e}");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Snapshot serialization failed")
    })?;
    shell.take_alert();
    Ok(Json(value))
}

// ─── Map view ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TileModeInfo {
    mode: TileMode,
    label: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct TilesResponse {
    mode: TileMode,
    layers: Vec<TileLayer>,
    modes: Vec<TileModeInfo>,
}

fn tiles_response(mode: TileMode) -> TilesResponse {
    TilesResponse {
        mode,
        layers: mode.layers(),
        modes: TileMode::ALL
            .iter()
            .map(|&m| TileModeInfo {
                mode: m,
                label: m.label(),
                description: m.description(),
            })
            .collect(),
    }
}

async fn get_tiles(State(state): State<AppState>) -> Json<TilesResponse> {
    let shell = state.shell.lock().await;
    Json(tiles_response(shell.view().tile_mode))
}

#[derive(Deserialize)]
struct TilesRequest {
    mode: TileMode,
}

async fn put_tiles(
    State(state): State<AppState>,
    Json(req): Json<TilesRequest>,
) -> Json<TilesResponse> {
    let mut shell = state.shell.lock().await;
    shell.set_tile_mode(req.mode);
    Json(tiles_response(req.mode))
}

async fn zoom_in(State(state): State<AppState>) -> Json<MapView> {
    let mut shell = state.shell.lock().await;
    shell.zoom_in();
    Json(*shell.view())
}

async fn zoom_out(State(state): State<AppState>) -> Json<MapView> {
    let mut shell = state.shell.lock().await;
    shell.zoom_out();
    Json(*shell.view())
}

// ─── Search ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SuggestParams {
    #[serde(default)]
    q: String,
}

async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<Vec<Place>> {
    Json(state.search.suggest(&params.q).await)
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
}

#[derive(Serialize)]
struct PlaceResponse {
    place: Place,
    view: MapView,
}

/// Geocode without holding the shell lock, then commit the hit.
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let place = match state.search.search(&req.query).await {
        Ok(place) => place,
        Err(SearchError::EmptyQuery) => return Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e @ SearchError::NotFound) => {
            return Err(error_response(StatusCode::NOT_FOUND, &e.to_string()))
        }
        Err(e @ SearchError::Transient(_)) => {
            return Err(error_response(StatusCode::BAD_GATEWAY, &e.to_string()))
        }
    };
    let mut shell = state.shell.lock().await;
    shell.commit_place(&place);
    Ok(Json(PlaceResponse {
        place,
        view: *shell.view(),
    })
    .into_response())
}

#[derive(Deserialize)]
struct SelectRequest {
    place: Place,
}

async fn select_place(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Json<PlaceResponse> {
    let mut shell = state.shell.lock().await;
    shell.commit_place(&req.place);
    Json(PlaceResponse {
        place: req.place,
        view: *shell.view(),
    })
}

// ─── Geolocation ─────────────────────────────────────────────────────

async fn locate_options() -> impl IntoResponse {
    Json(GEOLOCATION_OPTIONS)
}

#[derive(Deserialize)]
enum LocateRequest {
    #[serde(rename = "ok")]
    Fix(Point),
    #[serde(rename = "error")]
    Failed(GeolocationError),
}

#[derive(Serialize)]
struct LocateResponse {
    view: MapView,
    marker: Option<Marker>,
    alert: Option<String>,
}

async fn locate(
    State(state): State<AppState>,
    Json(req): Json<LocateRequest>,
) -> Json<LocateResponse> {
    let mut shell = state.shell.lock().await;
    shell.locate(match req {
        LocateRequest::Fix(point) => Ok(point),
        LocateRequest::Failed(kind) => Err(kind),
    });
    Json(LocateResponse {
        view: *shell.view(),
        marker: shell.marker().cloned(),
        alert: shell.take_alert(),
    })
}

// ─── Area selection ──────────────────────────────────────────────────

#[derive(Serialize)]
struct SelectorResponse {
    selector: SelectorState,
}

async fn start_drawing(State(state): State<AppState>) -> Json<SelectorResponse> {
    let mut shell = state.shell.lock().await;
    shell.start_drawing();
    Json(SelectorResponse {
        selector: shell.selector().state(),
    })
}

#[derive(Deserialize)]
struct AreaRequest {
    points: Vec<Point>,
}

#[derive(Serialize)]
struct AreaResponse {
    metrics: AreaMetrics,
    dialog: DialogStatus,
}

#[derive(Serialize)]
struct DialogStatus {
    open: bool,
    step: Step,
}

async fn complete_area(
    State(state): State<AppState>,
    Json(req): Json<AreaRequest>,
) -> Result<Json<AreaResponse>, ApiError> {
    let mut shell = state.shell.lock().await;
    let commands = shell
        .complete_drawing(Polygon::new(req.points))
        .map_err(|e| error_response(StatusCode::CONFLICT, &e.to_string()))?;
    state.timers.apply(&state.shell, commands);
    area_response(&shell)
}

async fn reselect_area(State(state): State<AppState>) -> Result<Json<AreaResponse>, ApiError> {
    let mut shell = state.shell.lock().await;
    let commands = shell.reselect_area();
    state.timers.apply(&state.shell, commands);
    area_response(&shell)
}

fn area_response(shell: &MapShell) -> Result<Json<AreaResponse>, ApiError> {
    let metrics = shell
        .area_metrics()
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "No area selected"))?;
    Ok(Json(AreaResponse {
        metrics,
        dialog: dialog_status(shell),
    }))
}

async fn clear_area(State(state): State<AppState>) -> StatusCode {
    let mut shell = state.shell.lock().await;
    shell.clear_drawings();
    StatusCode::NO_CONTENT
}

// ─── Dates and dialog ────────────────────────────────────────────────

#[derive(Deserialize)]
struct DatesRequest {
    from: String,
    to: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DatesResponse {
    period: FormattedPeriod,
    period_years: i32,
}

async fn put_dates(
    State(state): State<AppState>,
    Json(req): Json<DatesRequest>,
) -> Result<Json<DatesResponse>, ApiError> {
    let dates = DateRange::parse(&req.from, &req.to)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))?;
    let mut shell = state.shell.lock().await;
    shell.set_dates(dates);
    Ok(Json(DatesResponse {
        period: dates.formatted(),
        period_years: shell.dataset().period_years(),
    }))
}

fn dialog_status(shell: &MapShell) -> DialogStatus {
    DialogStatus {
        open: shell.dialog().is_open(),
        step: shell.dialog().step(),
    }
}

async fn analyze(State(state): State<AppState>) -> Json<DialogStatus> {
    let mut shell = state.shell.lock().await;
    let commands = shell.analyze();
    state.timers.apply(&state.shell, commands);
    Json(dialog_status(&shell))
}

async fn close_dialog(State(state): State<AppState>) -> Json<DialogStatus> {
    let mut shell = state.shell.lock().await;
    let commands = shell.close_dialog();
    state.timers.apply(&state.shell, commands);
    Json(dialog_status(&shell))
}

// ─── Reports ─────────────────────────────────────────────────────────

async fn report_json(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let shell = state.shell.lock().await;
    let json = serde_json::to_string_pretty(&shell.export(now)).map_err(|_| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "JSON serialization failed",
        )
    })?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(now.date_naive())
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        json,
    ))
}

async fn report_html(State(state): State<AppState>) -> Html<String> {
    let shell = state.shell.lock().await;
    Html(shell.printable_report(Utc::now()))
}

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
}
