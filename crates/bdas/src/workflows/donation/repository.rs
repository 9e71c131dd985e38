use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    BloodRequest, Donor, DonorId, HospitalApproval, RecordConflict, RequestId,
};

/// Selection criteria for donor listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorFilter {
    pub eligibility_flag: Option<bool>,
}

impl DonorFilter {
    pub fn flagged_eligible() -> Self {
        Self {
            eligibility_flag: Some(true),
        }
    }

    pub fn matches(&self, donor: &Donor) -> bool {
        self.eligibility_flag
            .map(|flag| donor.eligibility == flag)
            .unwrap_or(true)
    }
}

/// Donor persistence boundary.
pub trait DonorRepository: Send + Sync {
    fn fetch_donor(&self, id: &DonorId) -> Result<Option<Donor>, RepositoryError>;
    fn fetch_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>, RepositoryError>;
    /// Appends through `Donor::record_donation` under the store's lock, reporting
    /// `RecordConflict::DonationOutOfOrder` for a date earlier than the latest one.
    fn append_donation(&self, id: &DonorId, date: NaiveDate) -> Result<(), RepositoryError>;
}

/// Request persistence boundary. Donor responses are applied by the store, which reports
/// `RepositoryError::Conflict` and leaves the request untouched when a donor already answered.
pub trait RequestRepository: Send + Sync {
    fn insert_request(&self, request: BloodRequest) -> Result<BloodRequest, RepositoryError>;
    fn fetch_request(&self, id: &RequestId) -> Result<Option<BloodRequest>, RepositoryError>;
    fn fetch_open_requests(&self) -> Result<Vec<BloodRequest>, RepositoryError>;
    fn fetch_requests_by_requester(
        &self,
        requester_id: &str,
    ) -> Result<Vec<BloodRequest>, RepositoryError>;
    /// Applies `BloodRequest::revise` to the stored request with the same id.
    fn record_revision(&self, revised: BloodRequest) -> Result<BloodRequest, RepositoryError>;
    fn record_acceptance(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
        at: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError>;
    fn record_rejection(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
        at: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError>;
    fn record_fulfilment(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
    ) -> Result<BloodRequest, RepositoryError>;
    fn record_hospital_decision(
        &self,
        id: &RequestId,
        decision: HospitalApproval,
    ) -> Result<BloodRequest, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Conflict(#[from] RecordConflict),
    #[error("record already exists")]
    Duplicate,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
