use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::lottery::export::ExportError;
use crate::workflows::lottery::import::{ResidentImportError, SpotImportError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    ResidentImport(ResidentImportError),
    SpotImport(SpotImportError),
    Export(ExportError),
    NoLotteryResult,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::ResidentImport(err) => write!(f, "resident import error: {}", err),
            AppError::SpotImport(err) => write!(f, "spot import error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::NoLotteryResult => write!(f, "no lottery has been drawn yet"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::ResidentImport(err) => Some(err),
            AppError::SpotImport(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::NoLotteryResult => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::ResidentImport(_) | AppError::SpotImport(_) => StatusCode::BAD_REQUEST,
            AppError::NoLotteryResult => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::ResidentImport(err) if !err.row_errors().is_empty() => Json(json!({
                "error": self.to_string(),
                "rows": err.row_errors(),
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ResidentImportError> for AppError {
    fn from(value: ResidentImportError) -> Self {
        Self::ResidentImport(value)
    }
}

impl From<SpotImportError> for AppError {
    fn from(value: SpotImportError) -> Self {
        Self::SpotImport(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::lottery::import::RowError;

    #[test]
    fn import_errors_map_to_bad_request() {
        let error = AppError::from(ResidentImportError::Validation(vec![RowError::new(
            3,
            "apartment (Apartamento) is required",
        )]));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let error = AppError::from(SpotImportError::UnknownLayout);
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_result_maps_to_not_found() {
        let response = AppError::NoLotteryResult.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn display_prefixes_the_failing_layer() {
        let error = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(error.to_string(), "io error: disk full");
    }
}
