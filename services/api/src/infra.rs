use async_trait::async_trait;
use bdas::workflows::donation::{
    BloodRequest, BloodType, Donor, DonorFilter, DonorId, DonorRepository, HospitalApproval,
    MailTransport, OutboundMessage, RepositoryError, RequestId, RequestRepository,
    TransportError,
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local donor and request store backing the HTTP service.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStore {
    donors: Arc<Mutex<HashMap<DonorId, Donor>>>,
    requests: Arc<Mutex<Vec<BloodRequest>>>,
}

impl InMemoryStore {
    pub(crate) fn seeded(donors: Vec<Donor>) -> Self {
        let store = Self::default();
        if let Ok(mut guard) = store.donors.lock() {
            guard.extend(donors.into_iter().map(|donor| (donor.id.clone(), donor)));
        }
        store
    }

    fn donors(&self) -> Result<MutexGuard<'_, HashMap<DonorId, Donor>>, RepositoryError> {
        self.donors
            .lock()
            .map_err(|_| RepositoryError::Unavailable("donor store poisoned".to_string()))
    }

    fn requests(&self) -> Result<MutexGuard<'_, Vec<BloodRequest>>, RepositoryError> {
        self.requests
            .lock()
            .map_err(|_| RepositoryError::Unavailable("request store poisoned".to_string()))
    }

    fn update<F>(&self, id: &RequestId, apply: F) -> Result<BloodRequest, RepositoryError>
    where
        F: FnOnce(&mut BloodRequest) -> Result<(), RepositoryError>,
    {
        let mut guard = self.requests()?;
        let request = guard
            .iter_mut()
            .find(|request| &request.id == id)
            .ok_or(RepositoryError::NotFound)?;
        apply(request)?;
        Ok(request.clone())
    }
}

impl DonorRepository for InMemoryStore {
    fn fetch_donor(&self, id: &DonorId) -> Result<Option<Donor>, RepositoryError> {
        Ok(self.donors()?.get(id).cloned())
    }

    fn fetch_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>, RepositoryError> {
        let mut donors: Vec<Donor> = self
            .donors()?
            .values()
            .filter(|donor| filter.matches(donor))
            .cloned()
            .collect();
        donors.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(donors)
    }

    fn append_donation(&self, id: &DonorId, date: NaiveDate) -> Result<(), RepositoryError> {
        let mut guard = self.donors()?;
        let donor = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(donor.record_donation(date)?)
    }
}

impl RequestRepository for InMemoryStore {
    fn insert_request(&self, request: BloodRequest) -> Result<BloodRequest, RepositoryError> {
        let mut guard = self.requests()?;
        if guard.iter().any(|existing| existing.id == request.id) {
            return Err(RepositoryError::Duplicate);
        }
        guard.push(request.clone());
        Ok(request)
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<BloodRequest>, RepositoryError> {
        Ok(self
            .requests()?
            .iter()
            .find(|request| &request.id == id)
            .cloned())
    }

    fn fetch_open_requests(&self) -> Result<Vec<BloodRequest>, RepositoryError> {
        Ok(self
            .requests()?
            .iter()
            .filter(|request| !request.status.is_terminal())
            .cloned()
            .collect())
    }

    fn fetch_requests_by_requester(
        &self,
        requester_id: &str,
    ) -> Result<Vec<BloodRequest>, RepositoryError> {
        Ok(self
            .requests()?
            .iter()
            .filter(|request| request.requester_id == requester_id)
            .cloned()
            .collect())
    }

    fn record_revision(&self, revised: BloodRequest) -> Result<BloodRequest, RepositoryError> {
        let id = revised.id.clone();
        self.update(&id, |request| Ok(request.revise(revised)?))
    }

    fn record_acceptance(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
        at: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        self.update(id, |request| Ok(request.apply_acceptance(donor_id, at)?))
    }

    fn record_rejection(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
        at: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        self.update(id, |request| Ok(request.apply_rejection(donor_id, at)?))
    }

    fn record_fulfilment(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
    ) -> Result<BloodRequest, RepositoryError> {
        self.update(id, |request| Ok(request.mark_fulfilled(donor_id)?))
    }

    fn record_hospital_decision(
        &self,
        id: &RequestId,
        decision: HospitalApproval,
    ) -> Result<BloodRequest, RepositoryError> {
        self.update(id, |request| {
            request.hospital_approval = decision;
            Ok(())
        })
    }
}

/// Mail transport that writes each outbound message to the log instead of a relay.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingMailTransport;

#[async_trait]
impl MailTransport for LoggingMailTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        info!(
            donor_id = %message.donor_id,
            to = %message.to,
            subject = %message.subject,
            "notification queued"
        );
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_blood_type(raw: &str) -> Result<BloodType, String> {
    raw.parse::<BloodType>().map_err(|err| err.to_string())
}
