use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{DonorId, RequestId, RequestSubmission};
use super::notification::MailTransport;
use super::repository::{DonorRepository, RepositoryError, RequestRepository};
use super::service::{DonationService, DonationServiceError, HospitalDecision};

type SharedService<D, R, M> = Arc<DonationService<D, R, M>>;

/// Router builder exposing request intake, donor matching and donor actions.
pub fn donation_router<D, R, M>(service: SharedService<D, R, M>) -> Router
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    Router::new()
        .route("/api/v1/requests", post(create_request_handler::<D, R, M>))
        .route(
            "/api/v1/requests/:request_id",
            put(update_request_handler::<D, R, M>),
        )
        .route(
            "/api/v1/requests/:request_id/accept",
            post(accept_handler::<D, R, M>),
        )
        .route(
            "/api/v1/requests/:request_id/reject",
            post(reject_handler::<D, R, M>),
        )
        .route(
            "/api/v1/requests/:request_id/fulfil",
            post(fulfil_handler::<D, R, M>),
        )
        .route(
            "/api/v1/requests/:request_id/hospital",
            post(hospital_handler::<D, R, M>),
        )
        .route(
            "/api/v1/requests/:request_id/notices",
            get(notices_handler::<D, R, M>),
        )
        .route(
            "/api/v1/requesters/:requester_id/requests",
            get(requester_requests_handler::<D, R, M>),
        )
        .route(
            "/api/v1/donors/:donor_id/candidates",
            get(candidates_handler::<D, R, M>),
        )
        .route(
            "/api/v1/donors/:donor_id/spotlight",
            get(spotlight_handler::<D, R, M>),
        )
        .route(
            "/api/v1/donors/:donor_id/status",
            get(status_handler::<D, R, M>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DonorActionPayload {
    pub(crate) donor_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FulfilmentPayload {
    pub(crate) donor_id: String,
    #[serde(default)]
    pub(crate) donated_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HospitalDecisionPayload {
    pub(crate) decision: HospitalDecision,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) async fn create_request_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    axum::Json(submission): axum::Json<RequestSubmission>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    match service.create_request(submission, Utc::now()).await {
        Ok(created) => (StatusCode::CREATED, axum::Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_request_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(request_id): Path<String>,
    axum::Json(submission): axum::Json<RequestSubmission>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    match service.update_request(&RequestId(request_id), submission) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn requester_requests_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(requester_id): Path<String>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    match service.requests_for_requester(&requester_id) {
        Ok(requests) => (StatusCode::OK, axum::Json(requests)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn candidates_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(donor_id): Path<String>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    match service.candidates(&DonorId(donor_id)) {
        Ok(requests) => (StatusCode::OK, axum::Json(requests)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn spotlight_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(donor_id): Path<String>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    match service.spotlight(&DonorId(donor_id)) {
        Ok(Some(request)) => (StatusCode::OK, axum::Json(request)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(donor_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    match service.donor_status(&DonorId(donor_id), as_of) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn accept_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(request_id): Path<String>,
    axum::Json(payload): axum::Json<DonorActionPayload>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    let request_id = RequestId(request_id);
    match service.accept(&request_id, &DonorId(payload.donor_id), Utc::now()) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(request_id): Path<String>,
    axum::Json(payload): axum::Json<DonorActionPayload>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    let request_id = RequestId(request_id);
    match service.reject(&request_id, &DonorId(payload.donor_id), Utc::now()) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fulfil_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(request_id): Path<String>,
    axum::Json(payload): axum::Json<FulfilmentPayload>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    let today = Utc::now().date_naive();
    let donated_on = payload.donated_on.unwrap_or(today);
    match service.confirm_donation(
        &RequestId(request_id),
        &DonorId(payload.donor_id),
        donated_on,
        today,
    ) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn hospital_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(request_id): Path<String>,
    axum::Json(payload): axum::Json<HospitalDecisionPayload>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    match service.hospital_decision(&RequestId(request_id), payload.decision) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn notices_handler<D, R, M>(
    State(service): State<SharedService<D, R, M>>,
    Path(request_id): Path<String>,
) -> Response
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    match service.fulfilment_notices(&RequestId(request_id)) {
        Ok(notices) => (StatusCode::OK, axum::Json(notices)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: DonationServiceError) -> Response {
    let status = match &error {
        DonationServiceError::Validation(_) | DonationServiceError::OutOfOrderDonation { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DonationServiceError::IncompleteHealthProfile
        | DonationServiceError::ActionBlocked { .. } => StatusCode::FORBIDDEN,
        DonationServiceError::NotOffered(_)
        | DonationServiceError::Repository(RepositoryError::Conflict(_))
        | DonationServiceError::Repository(RepositoryError::Duplicate) => StatusCode::CONFLICT,
        DonationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DonationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
