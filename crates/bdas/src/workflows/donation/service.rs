use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{
    BloodRequest, DonationStatus, Donor, DonorId, HospitalApproval, RecordConflict, RequestId,
    RequestSubmission, ValidationError,
};
use super::eligibility::{
    health_profile_complete, DonorBadge, DonorHealthStatus, EligibilityConfig,
    EligibilityEvaluator,
};
use super::intake::RequestGuard;
use super::matching::{candidates_for, is_candidate, spotlight};
use super::notification::{
    DispatchConfig, DispatchReport, MailTransport, NotificationDispatcher,
};
use super::repository::{DonorRepository, RepositoryError, RequestRepository};

/// Service composing intake, eligibility, matching and notification over the stores.
pub struct DonationService<D, R, M> {
    donors: Arc<D>,
    requests: Arc<R>,
    guard: Arc<RequestGuard>,
    evaluator: Arc<EligibilityEvaluator>,
    dispatcher: Arc<NotificationDispatcher<D, M>>,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

impl<D, R, M> DonationService<D, R, M>
where
    D: DonorRepository + 'static,
    R: RequestRepository + 'static,
    M: MailTransport + 'static,
{
    pub fn new(
        donors: Arc<D>,
        requests: Arc<R>,
        transport: Arc<M>,
        eligibility: EligibilityConfig,
        dispatch: DispatchConfig,
    ) -> Self {
        Self::with_guard(
            RequestGuard::default(),
            donors,
            requests,
            transport,
            eligibility,
            dispatch,
        )
    }

    pub fn with_guard(
        guard: RequestGuard,
        donors: Arc<D>,
        requests: Arc<R>,
        transport: Arc<M>,
        eligibility: EligibilityConfig,
        dispatch: DispatchConfig,
    ) -> Self {
        let dispatcher = NotificationDispatcher::new(donors.clone(), transport, dispatch);
        Self {
            donors,
            requests,
            guard: Arc::new(guard),
            evaluator: Arc::new(EligibilityEvaluator::new(eligibility)),
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn evaluator(&self) -> &EligibilityEvaluator {
        &self.evaluator
    }

    /// Validate and store a new request. Very Urgent and Emergency requests notify donors; the
    /// request stays stored whatever the notification outcome.
    pub async fn create_request(
        &self,
        submission: RequestSubmission,
        now: DateTime<Utc>,
    ) -> Result<RequestCreated, DonationServiceError> {
        let request = self
            .guard
            .request_from_submission(submission, next_request_id(), now)?;
        let stored = self.requests.insert_request(request)?;
        info!(request_id = %stored.id, status = stored.status.label(), "blood request created");

        let notification = if stored.status.is_urgent() {
            match self.dispatcher.dispatch(&stored).await {
                Ok(report) => NotificationOutcome::Dispatched(report),
                Err(error) => {
                    warn!(request_id = %stored.id, %error, "emergency notification failed");
                    NotificationOutcome::Failed {
                        error: error.to_string(),
                    }
                }
            }
        } else {
            NotificationOutcome::Skipped
        };

        Ok(RequestCreated {
            request: stored,
            notification,
        })
    }

    /// Open requests the donor should currently be shown.
    pub fn candidates(&self, donor_id: &DonorId) -> Result<Vec<BloodRequest>, DonationServiceError> {
        let donor = self.donor(donor_id)?;
        let requests = self.requests.fetch_open_requests()?;
        Ok(candidates_for(&donor, &requests)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Most recent urgent candidate, if any, for the donor's alert view.
    pub fn spotlight(
        &self,
        donor_id: &DonorId,
    ) -> Result<Option<BloodRequest>, DonationServiceError> {
        let donor = self.donor(donor_id)?;
        let requests = self.requests.fetch_open_requests()?;
        Ok(spotlight(&donor, &requests).cloned())
    }

    pub fn donor_status(
        &self,
        donor_id: &DonorId,
        as_of: NaiveDate,
    ) -> Result<DonorStatusView, DonationServiceError> {
        let donor = self.donor(donor_id)?;
        let outcome = self.evaluator.evaluate(&donor, as_of);

        Ok(DonorStatusView {
            donor_id: donor.id.clone(),
            as_of,
            eligible: outcome.eligible,
            next_eligible_date: outcome.next_eligible_date,
            reason: outcome.reason_text(),
            health_profile_complete: health_profile_complete(&donor),
            health_status: outcome.health_status(),
            badge: DonorBadge::for_donations(donor.donation_count()),
            donations: donor.donation_count(),
            last_donation: donor.last_donation(),
        })
    }

    /// Accept a request on behalf of a donor, gated on health completeness and the cool-down.
    pub fn accept(
        &self,
        request_id: &RequestId,
        donor_id: &DonorId,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, DonationServiceError> {
        let donor = self.donor(donor_id)?;
        ensure_health_profile(&donor)?;
        let request = self.request(request_id)?;

        let outcome = self.evaluator.evaluate(&donor, now.date_naive());
        if let Some(reason) = outcome.reason_text() {
            debug!(%donor_id, %request_id, %reason, "acceptance blocked");
            return Err(DonationServiceError::ActionBlocked { reason });
        }

        if request.has_responded(donor_id) {
            return Err(RepositoryError::from(RecordConflict::AlreadyResponded(donor_id.clone())).into());
        }
        if !is_candidate(&donor, &request) {
            return Err(DonationServiceError::NotOffered(request_id.clone()));
        }

        let updated = self.requests.record_acceptance(request_id, donor_id, now)?;
        info!(%donor_id, %request_id, "donor accepted request");
        Ok(updated)
    }

    /// Decline a request. Only the health-profile gate applies; the cool-down does not.
    pub fn reject(
        &self,
        request_id: &RequestId,
        donor_id: &DonorId,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, DonationServiceError> {
        let donor = self.donor(donor_id)?;
        ensure_health_profile(&donor)?;

        let request = self.request(request_id)?;
        if request.has_responded(donor_id) {
            return Err(RepositoryError::from(RecordConflict::AlreadyResponded(donor_id.clone())).into());
        }

        let updated = self.requests.record_rejection(request_id, donor_id, now)?;
        info!(%donor_id, %request_id, "donor rejected request");
        Ok(updated)
    }

    /// Confirm that an accepting donor gave blood on `donated_on`.
    ///
    /// The donor history is written before the acceptance is marked fulfilled, so a failed
    /// history write leaves the request untouched. A retry after a failed fulfilment write
    /// finds the date already recorded and does not append it twice.
    pub fn confirm_donation(
        &self,
        request_id: &RequestId,
        donor_id: &DonorId,
        donated_on: NaiveDate,
        today: NaiveDate,
    ) -> Result<BloodRequest, DonationServiceError> {
        if donated_on > today {
            return Err(ValidationError::DonationInFuture { donated_on, today }.into());
        }

        let donor = self.donor(donor_id)?;
        // Checked on a local copy; the stored request is only touched after the history write.
        let mut preview = self.request(request_id)?;
        preview
            .mark_fulfilled(donor_id)
            .map_err(RepositoryError::from)?;

        if donor.last_donation() != Some(donated_on) {
            match self.donors.append_donation(donor_id, donated_on) {
                Ok(()) => {}
                Err(RepositoryError::Conflict(RecordConflict::DonationOutOfOrder {
                    last,
                    attempted,
                })) => {
                    return Err(DonationServiceError::OutOfOrderDonation { last, attempted });
                }
                Err(error) => return Err(error.into()),
            }
        }

        let updated = self.requests.record_fulfilment(request_id, donor_id)?;
        info!(%donor_id, %request_id, %donated_on, "donation recorded");
        Ok(updated)
    }

    /// Requests raised by one requester, newest first.
    pub fn requests_for_requester(
        &self,
        requester_id: &str,
    ) -> Result<Vec<BloodRequest>, DonationServiceError> {
        let mut requests = self.requests.fetch_requests_by_requester(requester_id)?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    /// Edit an open request. The submission passes the same intake rules as a new request;
    /// the requester, creation time and donor responses of the stored request are kept.
    pub fn update_request(
        &self,
        request_id: &RequestId,
        submission: RequestSubmission,
    ) -> Result<BloodRequest, DonationServiceError> {
        let existing = self.request(request_id)?;
        let revised =
            self.guard
                .request_from_submission(submission, existing.id.clone(), existing.created_at)?;

        let updated = self.requests.record_revision(revised)?;
        info!(%request_id, status = updated.status.label(), "blood request revised");
        Ok(updated)
    }

    pub fn hospital_decision(
        &self,
        request_id: &RequestId,
        decision: HospitalDecision,
    ) -> Result<BloodRequest, DonationServiceError> {
        let updated = self
            .requests
            .record_hospital_decision(request_id, decision.into())?;
        info!(%request_id, ?decision, "hospital decision recorded");
        Ok(updated)
    }

    /// Requester-facing notices, one per fulfilled donation.
    pub fn fulfilment_notices(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<FulfilmentNotice>, DonationServiceError> {
        let request = self.request(request_id)?;
        let mut notices = Vec::new();

        for record in request
            .acceptances
            .iter()
            .filter(|record| record.donation_status == DonationStatus::Fulfilled)
        {
            let donor_name = match self.donors.fetch_donor(&record.donor_id)? {
                Some(donor) => donor.salutation().to_string(),
                None => record.donor_id.0.clone(),
            };
            notices.push(FulfilmentNotice {
                request_id: request.id.clone(),
                donor_id: record.donor_id.clone(),
                accepted_at: record.accepted_at,
                message: format!(
                    "Blood donation for {} has been fulfilled by donor {}.",
                    request.patient_name, donor_name
                ),
            });
        }

        Ok(notices)
    }

    fn donor(&self, donor_id: &DonorId) -> Result<Donor, DonationServiceError> {
        let donor = self
            .donors
            .fetch_donor(donor_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(donor)
    }

    fn request(&self, request_id: &RequestId) -> Result<BloodRequest, DonationServiceError> {
        let request = self
            .requests
            .fetch_request(request_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(request)
    }
}

fn ensure_health_profile(donor: &Donor) -> Result<(), DonationServiceError> {
    if health_profile_complete(donor) {
        Ok(())
    } else {
        debug!(donor_id = %donor.id, "action blocked by incomplete health profile");
        Err(DonationServiceError::IncompleteHealthProfile)
    }
}

/// Hospital-channel verdict on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HospitalDecision {
    Approved,
    Rejected,
}

impl From<HospitalDecision> for HospitalApproval {
    fn from(value: HospitalDecision) -> Self {
        match value {
            HospitalDecision::Approved => HospitalApproval::Approved,
            HospitalDecision::Rejected => HospitalApproval::Rejected,
        }
    }
}

/// What happened to the donor fan-out for a newly created request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Skipped,
    Dispatched(DispatchReport),
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestCreated {
    pub request: BloodRequest,
    pub notification: NotificationOutcome,
}

/// Donor dashboard and hospital listing projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonorStatusView {
    pub donor_id: DonorId,
    pub as_of: NaiveDate,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_eligible_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub health_profile_complete: bool,
    pub health_status: DonorHealthStatus,
    pub badge: DonorBadge,
    pub donations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_donation: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfilmentNotice {
    pub request_id: RequestId,
    pub donor_id: DonorId,
    pub accepted_at: DateTime<Utc>,
    pub message: String,
}

/// Error raised by the donation service.
#[derive(Debug, thiserror::Error)]
pub enum DonationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("Please complete your health information before responding to requests")]
    IncompleteHealthProfile,
    #[error("{reason}")]
    ActionBlocked { reason: String },
    #[error("request {0} is not open to this donor")]
    NotOffered(RequestId),
    #[error("donation on {attempted} precedes the last recorded donation on {last}")]
    OutOfOrderDonation {
        last: NaiveDate,
        attempted: NaiveDate,
    },
}
