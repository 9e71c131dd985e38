use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::donation::domain::{
    BloodRequest, Donor, DonorApproval, DonorId, Gender, HospitalApproval, RequestId,
    RequestSubmission, UrgencyStatus,
};
use crate::workflows::donation::notification::{MailTransport, OutboundMessage, TransportError};
use crate::workflows::donation::repository::{
    DonorFilter, DonorRepository, RepositoryError, RequestRepository,
};
use crate::workflows::donation::{
    BloodType, DispatchConfig, DonationService, EligibilityConfig,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn donor(id: &str, gender: Gender, blood_type: BloodType) -> Donor {
    Donor {
        id: DonorId(id.to_string()),
        full_name: format!("Donor {id}"),
        email: format!("{id}@donors.example"),
        date_of_birth: date(1992, 6, 14),
        gender,
        blood_type,
        pregnancy_or_breastfeeding: false,
        donation_history: Vec::new(),
        surgical_history: vec!["None".to_string()],
        medicines: vec!["None".to_string()],
        vaccinations_taken: vec!["Hepatitis B".to_string()],
        eligibility: true,
    }
}

pub(super) fn donor_with_history(id: &str, gender: Gender, history: &[NaiveDate]) -> Donor {
    let mut donor = donor(id, gender, BloodType::APositive);
    donor.donation_history = history.to_vec();
    donor
}

pub(super) fn request(id: &str, blood_type: &str, status: UrgencyStatus) -> BloodRequest {
    BloodRequest {
        id: RequestId(id.to_string()),
        requester_id: "user-7".to_string(),
        patient_name: "Lakshmi Pillai".to_string(),
        doctor_name: "Anil Kumar".to_string(),
        specialization: "Cardiology".to_string(),
        contact_number: "9847012345".to_string(),
        blood_type: blood_type.to_string(),
        units_required: 1,
        status,
        needed_on: date(2024, 3, 20),
        needed_at: "14:30".to_string(),
        address: "General Hospital, MG Road, Ernakulam".to_string(),
        created_at: at(2024, 3, 10),
        acceptances: Vec::new(),
        rejections: Vec::new(),
        hospital_approval: HospitalApproval::Pending,
        donor_approval: DonorApproval::Pending,
    }
}

pub(super) fn submission(status: &str, blood_type: &str) -> RequestSubmission {
    RequestSubmission {
        requester_id: "user-7".to_string(),
        patient_name: "Lakshmi Pillai".to_string(),
        doctor_name: "Anil Kumar".to_string(),
        specialization: "Cardiology".to_string(),
        contact_number: "9847012345".to_string(),
        blood_type: blood_type.to_string(),
        units_required: 1,
        status: status.to_string(),
        needed_on: date(2024, 3, 20),
        needed_at: "14:30".to_string(),
        address: "General Hospital, MG Road, Ernakulam".to_string(),
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    donors: Mutex<HashMap<DonorId, Donor>>,
    requests: Mutex<Vec<BloodRequest>>,
}

impl MemoryStore {
    pub(super) fn with_donors(donors: Vec<Donor>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.donors.lock().expect("donor mutex poisoned");
            for donor in donors {
                guard.insert(donor.id.clone(), donor);
            }
        }
        store
    }

    pub(super) fn put_request(&self, request: BloodRequest) {
        self.requests
            .lock()
            .expect("request mutex poisoned")
            .push(request);
    }

    pub(super) fn put_donor(&self, donor: Donor) {
        self.donors
            .lock()
            .expect("donor mutex poisoned")
            .insert(donor.id.clone(), donor);
    }

    pub(super) fn request_snapshot(&self, id: &str) -> Option<BloodRequest> {
        self.requests
            .lock()
            .expect("request mutex poisoned")
            .iter()
            .find(|request| request.id.0 == id)
            .cloned()
    }

    fn update_request<F>(&self, id: &RequestId, apply: F) -> Result<BloodRequest, RepositoryError>
    where
        F: FnOnce(&mut BloodRequest) -> Result<(), RepositoryError>,
    {
        let mut guard = self.requests.lock().expect("request mutex poisoned");
        let request = guard
            .iter_mut()
            .find(|request| &request.id == id)
            .ok_or(RepositoryError::NotFound)?;
        apply(request)?;
        Ok(request.clone())
    }
}

impl DonorRepository for MemoryStore {
    fn fetch_donor(&self, id: &DonorId) -> Result<Option<Donor>, RepositoryError> {
        Ok(self
            .donors
            .lock()
            .expect("donor mutex poisoned")
            .get(id)
            .cloned())
    }

    fn fetch_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>, RepositoryError> {
        let guard = self.donors.lock().expect("donor mutex poisoned");
        let mut donors: Vec<Donor> = guard
            .values()
            .filter(|donor| filter.matches(donor))
            .cloned()
            .collect();
        donors.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(donors)
    }

    fn append_donation(&self, id: &DonorId, date: NaiveDate) -> Result<(), RepositoryError> {
        let mut guard = self.donors.lock().expect("donor mutex poisoned");
        let donor = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(donor.record_donation(date)?)
    }
}

impl RequestRepository for MemoryStore {
    fn insert_request(&self, request: BloodRequest) -> Result<BloodRequest, RepositoryError> {
        let mut guard = self.requests.lock().expect("request mutex poisoned");
        if guard.iter().any(|existing| existing.id == request.id) {
            return Err(RepositoryError::Duplicate);
        }
        guard.push(request.clone());
        Ok(request)
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<BloodRequest>, RepositoryError> {
        Ok(self.request_snapshot(&id.0))
    }

    fn fetch_open_requests(&self) -> Result<Vec<BloodRequest>, RepositoryError> {
        Ok(self
            .requests
            .lock()
            .expect("request mutex poisoned")
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
            .requests
            .lock()
            .expect("request mutex poisoned")
            .iter()
            .filter(|request| request.requester_id == requester_id)
            .cloned()
            .collect())
    }

    fn record_revision(&self, revised: BloodRequest) -> Result<BloodRequest, RepositoryError> {
        let id = revised.id.clone();
        self.update_request(&id, |request| Ok(request.revise(revised)?))
    }

    fn record_acceptance(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
        at: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        self.update_request(id, |request| Ok(request.apply_acceptance(donor_id, at)?))
    }

    fn record_rejection(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
        at: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        self.update_request(id, |request| Ok(request.apply_rejection(donor_id, at)?))
    }

    fn record_fulfilment(
        &self,
        id: &RequestId,
        donor_id: &DonorId,
    ) -> Result<BloodRequest, RepositoryError> {
        self.update_request(id, |request| Ok(request.mark_fulfilled(donor_id)?))
    }

    fn record_hospital_decision(
        &self,
        id: &RequestId,
        decision: HospitalApproval,
    ) -> Result<BloodRequest, RepositoryError> {
        self.update_request(id, |request| {
            request.hospital_approval = decision;
            Ok(())
        })
    }
}

/// Donor store whose first `failures` history writes fail before delegating to `inner`.
pub(super) struct FlakyDonorStore {
    inner: Arc<MemoryStore>,
    failures: Mutex<usize>,
}

impl FlakyDonorStore {
    pub(super) fn new(inner: Arc<MemoryStore>, failures: usize) -> Self {
        Self {
            inner,
            failures: Mutex::new(failures),
        }
    }
}

impl DonorRepository for FlakyDonorStore {
    fn fetch_donor(&self, id: &DonorId) -> Result<Option<Donor>, RepositoryError> {
        self.inner.fetch_donor(id)
    }

    fn fetch_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>, RepositoryError> {
        self.inner.fetch_donors(filter)
    }

    fn append_donation(&self, id: &DonorId, date: NaiveDate) -> Result<(), RepositoryError> {
        let mut remaining = self.failures.lock().expect("failure mutex poisoned");
        if *remaining > 0 {
            *remaining -= 1;
            return Err(RepositoryError::Unavailable("donor store offline".to_string()));
        }
        self.inner.append_donation(id, date)
    }
}

/// Records every message; refuses addresses listed in `refuse`.
#[derive(Default)]
pub(super) struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    refuse: HashSet<String>,
    probes: Mutex<usize>,
}

impl RecordingTransport {
    pub(super) fn refusing(addresses: &[&str]) -> Self {
        Self {
            refuse: addresses.iter().map(|value| value.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(super) fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("transport mutex poisoned").clone()
    }

    pub(super) fn probes(&self) -> usize {
        *self.probes.lock().expect("transport mutex poisoned")
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn probe(&self) -> Result<(), TransportError> {
        *self.probes.lock().expect("transport mutex poisoned") += 1;
        Ok(())
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        if self.refuse.contains(&message.to) {
            return Err(TransportError::Rejected {
                address: message.to,
                reason: "mailbox unavailable".to_string(),
            });
        }
        self.sent
            .lock()
            .expect("transport mutex poisoned")
            .push(message);
        Ok(())
    }
}

pub(super) struct UnreachableTransport;

#[async_trait]
impl MailTransport for UnreachableTransport {
    async fn probe(&self) -> Result<(), TransportError> {
        Err(TransportError::Unavailable("connection refused".to_string()))
    }

    async fn send(&self, _message: OutboundMessage) -> Result<(), TransportError> {
        Err(TransportError::Unavailable("connection refused".to_string()))
    }
}

pub(super) type TestService = DonationService<MemoryStore, MemoryStore, RecordingTransport>;

pub(super) fn build_service(donors: Vec<Donor>) -> (TestService, Arc<MemoryStore>, Arc<RecordingTransport>) {
    build_service_with_transport(donors, RecordingTransport::default())
}

pub(super) fn build_service_with_transport<M>(
    donors: Vec<Donor>,
    transport: M,
) -> (
    DonationService<MemoryStore, MemoryStore, M>,
    Arc<MemoryStore>,
    Arc<M>,
)
where
    M: MailTransport + 'static,
{
    let store = Arc::new(MemoryStore::with_donors(donors));
    let transport = Arc::new(transport);
    let service = DonationService::new(
        store.clone(),
        store.clone(),
        transport.clone(),
        EligibilityConfig::default(),
        DispatchConfig {
            max_concurrency: 2,
            ..DispatchConfig::default()
        },
    );
    (service, store, transport)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
