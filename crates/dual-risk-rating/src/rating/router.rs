use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::service::{GradePreview, GradingRequest, GradingServiceError, LoanGradingService};
use super::store::{SubmissionStore, SubmissionStoreError};
use crate::error::AppError;

/// Router exposing loan submission and live grade previews.
pub fn grading_router<S>(service: Arc<LoanGradingService<S>>) -> Router
where
    S: SubmissionStore + 'static,
{
    Router::new()
        .route("/submit-loan", post(submit_handler::<S>))
        .route("/api/v1/grades/preview", post(preview_handler::<S>))
        .with_state(service)
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<LoanGradingService<S>>>,
    Json(request): Json<GradingRequest>,
) -> Response
where
    S: SubmissionStore + 'static,
{
    match service.submit(request) {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(GradingServiceError::Incomplete(incomplete)) => {
            let payload = json!({
                "error": incomplete.to_string(),
                "validation": incomplete.0,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(GradingServiceError::Store(SubmissionStoreError::Conflict(loan_id))) => {
            let payload = json!({
                "error": format!("loan {loan_id} has already been submitted"),
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(error) if error.is_client_error() => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => {
            tracing::error!(error = %other, "loan submission failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn preview_handler<S>(
    State(service): State<Arc<LoanGradingService<S>>>,
    Json(request): Json<GradingRequest>,
) -> Result<Json<GradePreview>, AppError>
where
    S: SubmissionStore + 'static,
{
    let preview = service.preview(&request)?;
    Ok(Json(preview))
}
