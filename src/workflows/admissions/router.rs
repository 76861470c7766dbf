use std::sync::Arc;

use axum::{
    extract::{Path, Query as UrlQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationStatus, Enrichment};
use super::notify::NotificationSink;
use super::providers::{CandidateDirectory, TargetCatalog};
use super::service::{AdmissionsError, AdmissionsService};
use crate::store::DocumentStore;

/// Router builder exposing the eligibility, application, arbitration, and
/// job-matching endpoints.
pub fn admissions_router<S, P, N>(service: Arc<AdmissionsService<S, P, N>>) -> Router
where
    S: DocumentStore + 'static,
    P: CandidateDirectory + TargetCatalog + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/admissions/eligibility/:student_id/:target_id",
            get(eligibility_handler::<S, P, N>),
        )
        .route(
            "/api/v1/admissions/applications",
            post(apply_handler::<S, P, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id",
            get(application_handler::<S, P, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/status",
            post(status_handler::<S, P, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/select",
            post(select_handler::<S, P, N>),
        )
        .route(
            "/api/v1/jobs/matches/:student_id",
            get(matches_handler::<S, P, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyRequest {
    pub student_id: String,
    pub target_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub status: ApplicationStatus,
    pub reviewer: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectRequest {
    pub student_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReadOptions {
    #[serde(default)]
    pub refresh: bool,
}

fn error_response(error: AdmissionsError) -> Response {
    let status = match &error {
        AdmissionsError::AlreadyApplied
        | AdmissionsError::ApplicationCapExceeded
        | AdmissionsError::StoreConflict => StatusCode::CONFLICT,
        AdmissionsError::TargetUnavailable => StatusCode::GONE,
        AdmissionsError::NotQualified { .. } | AdmissionsError::InvalidTransition { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AdmissionsError::InvalidSelection => StatusCode::UNPROCESSABLE_ENTITY,
        AdmissionsError::NotFound(_) => StatusCode::NOT_FOUND,
        AdmissionsError::Unauthorized => StatusCode::FORBIDDEN,
        AdmissionsError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut payload = json!({ "error": error.to_string() });
    if let AdmissionsError::NotQualified { missing } = &error {
        payload["missing_requirements"] = json!(missing);
    }

    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn eligibility_handler<S, P, N>(
    State(service): State<Arc<AdmissionsService<S, P, N>>>,
    Path((student_id, target_id)): Path<(String, String)>,
) -> Response
where
    S: DocumentStore + 'static,
    P: CandidateDirectory + TargetCatalog + 'static,
    N: NotificationSink + 'static,
{
    match service.check_eligibility(&student_id, &target_id) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<S, P, N>(
    State(service): State<Arc<AdmissionsService<S, P, N>>>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    P: CandidateDirectory + TargetCatalog + 'static,
    N: NotificationSink + 'static,
{
    match service.apply_for_target(&request.student_id, &request.target_id) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_handler<S, P, N>(
    State(service): State<Arc<AdmissionsService<S, P, N>>>,
    Path(application_id): Path<String>,
    UrlQuery(options): UrlQuery<ReadOptions>,
) -> Response
where
    S: DocumentStore + 'static,
    P: CandidateDirectory + TargetCatalog + 'static,
    N: NotificationSink + 'static,
{
    let enrichment = if options.refresh {
        Enrichment::Refreshed
    } else {
        Enrichment::Stored
    };
    match service.get_application(&application_id, enrichment) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S, P, N>(
    State(service): State<Arc<AdmissionsService<S, P, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    P: CandidateDirectory + TargetCatalog + 'static,
    N: NotificationSink + 'static,
{
    match service.update_application_status(&application_id, request.status, &request.reviewer) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn select_handler<S, P, N>(
    State(service): State<Arc<AdmissionsService<S, P, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<SelectRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    P: CandidateDirectory + TargetCatalog + 'static,
    N: NotificationSink + 'static,
{
    match service.select_admission(&request.student_id, &application_id) {
        Ok(outcome) => {
            let payload = json!({
                "accepted": outcome.accepted,
                "declined": outcome.declined,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn matches_handler<S, P, N>(
    State(service): State<Arc<AdmissionsService<S, P, N>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
    P: CandidateDirectory + TargetCatalog + 'static,
    N: NotificationSink + 'static,
{
    match service.matches_for_student(&student_id) {
        Ok(matches) => (StatusCode::OK, axum::Json(matches)).into_response(),
        Err(error) => error_response(error),
    }
}
