use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Resident, SpotLayout};
use super::eligibility::{classify, standing, Eligibility, PaymentStanding};
use super::export::{result_csv, result_file_name, result_xlsx, TemplateKind};
use super::import::ResidentDraft;
use super::service::LotteryService;
use crate::error::AppError;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Upper bound for each category of `/spots/generate`.
const MAX_GENERATED_SPOTS: usize = 5_000;

/// Router builder exposing resident, spot and draw endpoints.
pub fn lottery_router(service: Arc<LotteryService>) -> Router {
    Router::new()
        .route(
            "/api/v1/residents",
            get(list_residents_handler).post(add_resident_handler),
        )
        .route("/api/v1/residents/import", post(import_residents_handler))
        .route("/api/v1/residents/double-spots", put(double_spots_handler))
        .route("/api/v1/spots", get(list_spots_handler))
        .route("/api/v1/spots/import", post(import_spots_handler))
        .route(
            "/api/v1/spots/import/:layout",
            post(import_spots_with_layout_handler),
        )
        .route("/api/v1/spots/generate", post(generate_spots_handler))
        .route("/api/v1/lottery/draw", post(draw_handler))
        .route("/api/v1/lottery/latest", get(latest_handler))
        .route("/api/v1/lottery/latest/csv", get(latest_csv_handler))
        .route("/api/v1/lottery/latest/xlsx", get(latest_xlsx_handler))
        .route("/api/v1/stats", get(stats_handler))
        .route("/api/v1/templates/:name", get(template_handler))
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub(crate) struct ResidentView {
    #[serde(flatten)]
    resident: Resident,
    standing: PaymentStanding,
    eligibility: Eligibility,
}

impl From<Resident> for ResidentView {
    fn from(resident: Resident) -> Self {
        Self {
            standing: standing(&resident),
            eligibility: classify(&resident),
            resident,
        }
    }
}

/// Manually entered resident. Validated with the spreadsheet rules.
#[derive(Debug, Deserialize)]
pub(crate) struct ResidentRequest {
    name: String,
    apartment: String,
    payment_status: String,
    #[serde(default)]
    months_overdue: Option<u32>,
    #[serde(default)]
    has_justification: bool,
}

impl From<ResidentRequest> for ResidentDraft {
    fn from(request: ResidentRequest) -> Self {
        Self {
            name: Some(request.name),
            apartment: Some(request.apartment),
            payment_status: Some(request.payment_status),
            months_overdue: request.months_overdue.map(|months| months.to_string()),
            has_justification: Some(request.has_justification.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DoubleSpotRequest {
    apartments: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateSpotsRequest {
    #[serde(default)]
    covered: usize,
    #[serde(default)]
    uncovered: usize,
}

pub(crate) async fn list_residents_handler(
    State(service): State<Arc<LotteryService>>,
) -> Json<Vec<ResidentView>> {
    let residents = service
        .residents()
        .into_iter()
        .map(ResidentView::from)
        .collect();
    Json(residents)
}

pub(crate) async fn add_resident_handler(
    State(service): State<Arc<LotteryService>>,
    Json(request): Json<ResidentRequest>,
) -> Response {
    match service.add_resident(request.into()) {
        Ok(resident) => (StatusCode::CREATED, Json(ResidentView::from(resident))).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

/// Accepts a CSV or XLSX body.
pub(crate) async fn import_residents_handler(
    State(service): State<Arc<LotteryService>>,
    body: Bytes,
) -> Response {
    match service.import_residents(Cursor::new(body)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn double_spots_handler(
    State(service): State<Arc<LotteryService>>,
    Json(request): Json<DoubleSpotRequest>,
) -> impl IntoResponse {
    Json(service.configure_double_spots(&request.apartments))
}

pub(crate) async fn list_spots_handler(
    State(service): State<Arc<LotteryService>>,
) -> impl IntoResponse {
    Json(service.spots())
}

pub(crate) async fn import_spots_handler(
    State(service): State<Arc<LotteryService>>,
    body: Bytes,
) -> Response {
    import_spots(&service, body, None)
}

pub(crate) async fn import_spots_with_layout_handler(
    State(service): State<Arc<LotteryService>>,
    Path(layout): Path<String>,
    body: Bytes,
) -> Response {
    let layout = match layout.as_str() {
        "sections" => SpotLayout::Sections,
        "detailed" => SpotLayout::Detailed,
        other => {
            let payload = json!({
                "error": format!("unknown spot layout '{other}' (expected sections or detailed)"),
            });
            return (StatusCode::NOT_FOUND, Json(payload)).into_response();
        }
    };
    import_spots(&service, body, Some(layout))
}

fn import_spots(service: &LotteryService, body: Bytes, layout: Option<SpotLayout>) -> Response {
    match service.import_spots(Cursor::new(body), layout) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn generate_spots_handler(
    State(service): State<Arc<LotteryService>>,
    Json(request): Json<GenerateSpotsRequest>,
) -> Response {
    if request.covered > MAX_GENERATED_SPOTS || request.uncovered > MAX_GENERATED_SPOTS {
        let payload = json!({
            "error": format!("at most {MAX_GENERATED_SPOTS} spots per category can be generated"),
        });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    Json(service.generate_spots(request.covered, request.uncovered)).into_response()
}

pub(crate) async fn draw_handler(State(service): State<Arc<LotteryService>>) -> impl IntoResponse {
    (StatusCode::CREATED, Json(service.draw()))
}

pub(crate) async fn latest_handler(
    State(service): State<Arc<LotteryService>>,
) -> Result<impl IntoResponse, AppError> {
    let report = service.latest().ok_or(AppError::NoLotteryResult)?;
    Ok(Json(report))
}

pub(crate) async fn latest_csv_handler(
    State(service): State<Arc<LotteryService>>,
) -> Result<Response, AppError> {
    let report = service.latest().ok_or(AppError::NoLotteryResult)?;
    let bytes = result_csv(&report)?;
    Ok(attachment(
        "text/csv; charset=utf-8",
        &result_file_name(&report, "csv"),
        bytes,
    ))
}

pub(crate) async fn latest_xlsx_handler(
    State(service): State<Arc<LotteryService>>,
) -> Result<Response, AppError> {
    let report = service.latest().ok_or(AppError::NoLotteryResult)?;
    let bytes = result_xlsx(&report)?;
    Ok(attachment(
        XLSX_CONTENT_TYPE,
        &result_file_name(&report, "xlsx"),
        bytes,
    ))
}

pub(crate) async fn stats_handler(State(service): State<Arc<LotteryService>>) -> impl IntoResponse {
    Json(service.stats())
}

pub(crate) async fn template_handler(Path(name): Path<String>) -> Result<Response, AppError> {
    let Some(kind) = TemplateKind::parse(&name) else {
        let payload = json!({
            "error": format!("unknown template '{name}'"),
            "available": TemplateKind::ALL.map(TemplateKind::slug),
        });
        return Ok((StatusCode::NOT_FOUND, Json(payload)).into_response());
    };

    let bytes = kind.workbook()?;
    Ok(attachment(XLSX_CONTENT_TYPE, kind.file_name(), bytes))
}

fn attachment(content_type: &'static str, file_name: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}
