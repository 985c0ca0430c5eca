use crate::config::ConfigError;
use crate::rating::{GradingServiceError, RatingModelError};
use crate::telemetry::TelemetryError;
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
    RatingModel(RatingModelError),
    Grading(GradingServiceError),
    Json(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::RatingModel(err) => write!(f, "rating model error: {}", err),
            AppError::Grading(err) => write!(f, "grading error: {}", err),
            AppError::Json(err) => write!(f, "invalid request payload: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::RatingModel(err) => Some(err),
            AppError::Grading(err) => Some(err),
            AppError::Json(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Grading(err) if err.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Grading(err) if err.is_conflict() => StatusCode::CONFLICT,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::RatingModel(_)
            | AppError::Grading(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Grading(err) => match err.validation() {
                Some(report) => json!({ "error": self.to_string(), "validation": report }),
                None => json!({ "error": self.to_string() }),
            },
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
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

impl From<RatingModelError> for AppError {
    fn from(value: RatingModelError) -> Self {
        Self::RatingModel(value)
    }
}

impl From<GradingServiceError> for AppError {
    fn from(value: GradingServiceError) -> Self {
        Self::Grading(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{
        InputError, LineOfBusiness, LoanId, RatingConfigError, SubmissionStoreError,
    };

    #[test]
    fn client_errors_map_to_unprocessable() {
        let error = AppError::from(GradingServiceError::UnsupportedLineOfBusiness(
            LineOfBusiness::MiddleMarket,
        ));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let error = AppError::from(GradingServiceError::Input(InputError::RatingOutOfRange(9)));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn infrastructure_errors_map_to_internal_error() {
        let error = AppError::from(GradingServiceError::Store(
            SubmissionStoreError::Unavailable("offline".to_string()),
        ));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let error = AppError::from(GradingServiceError::Config(RatingConfigError::BlendWeight(
            1.5,
        )));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_submission_maps_to_conflict() {
        let error = AppError::from(GradingServiceError::Store(SubmissionStoreError::Conflict(
            LoanId("loan-000042".to_string()),
        )));
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }
}
