use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::blood_type::BloodType;

/// Identifier wrapper for registered donors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DonorId(pub String);

impl fmt::Display for DonorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for blood requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Malformed donor or request data rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("blood type is required")]
    MissingBloodType,
    #[error("unrecognised blood type '{0}'")]
    UnknownBloodType(String),
    #[error("unrecognised gender '{0}'")]
    UnknownGender(String),
    #[error("unrecognised request status '{0}'")]
    UnknownStatus(String),
    #[error("status '{0}' cannot be used when creating a request")]
    StatusNotAllowedAtCreation(&'static str),
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} may only contain letters and spaces")]
    InvalidName { field: &'static str },
    #[error("contact number must be exactly 10 digits")]
    InvalidContactNumber,
    #[error("units required must be greater than 0")]
    InvalidUnits,
    #[error("address should be at least {min} characters")]
    AddressTooShort { min: usize },
    #[error("donation date {donated_on} is later than today ({today})")]
    DonationInFuture {
        donated_on: NaiveDate,
        today: NaiveDate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[serde(alias = "third gender", alias = "Third Gender")]
    Other,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "third gender" => Ok(Gender::Other),
            _ => Err(ValidationError::UnknownGender(raw.trim().to_string())),
        }
    }
}

fn default_eligibility_flag() -> bool {
    true
}

/// Identity and medical profile of a registered donor.
///
/// `donation_history` is chronological and append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub blood_type: BloodType,
    #[serde(default)]
    pub pregnancy_or_breastfeeding: bool,
    #[serde(default)]
    pub donation_history: Vec<NaiveDate>,
    #[serde(default)]
    pub surgical_history: Vec<String>,
    #[serde(default)]
    pub medicines: Vec<String>,
    #[serde(default)]
    pub vaccinations_taken: Vec<String>,
    /// Stored availability flag consulted by the notification path only.
    #[serde(default = "default_eligibility_flag")]
    pub eligibility: bool,
}

impl Donor {
    pub fn last_donation(&self) -> Option<NaiveDate> {
        self.donation_history.iter().copied().max()
    }

    pub fn donation_count(&self) -> usize {
        self.donation_history.len()
    }

    /// Append a donation date, refusing one that precedes the latest recorded donation.
    pub fn record_donation(&mut self, date: NaiveDate) -> Result<(), RecordConflict> {
        if let Some(last) = self.last_donation() {
            if date < last {
                return Err(RecordConflict::DonationOutOfOrder {
                    last,
                    attempted: date,
                });
            }
        }
        self.donation_history.push(date);
        Ok(())
    }

    pub fn salutation(&self) -> &str {
        if self.full_name.trim().is_empty() {
            "Valued Donor"
        } else {
            self.full_name.trim()
        }
    }
}

/// Urgency status carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyStatus {
    Planned,
    #[serde(rename = "Very Urgent")]
    VeryUrgent,
    Emergency,
    Fulfilled,
    Approved,
    Rejected,
}

impl UrgencyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            UrgencyStatus::Planned => "Planned",
            UrgencyStatus::VeryUrgent => "Very Urgent",
            UrgencyStatus::Emergency => "Emergency",
            UrgencyStatus::Fulfilled => "Fulfilled",
            UrgencyStatus::Approved => "Approved",
            UrgencyStatus::Rejected => "Rejected",
        }
    }

    /// Statuses that trigger donor notification and spotlight alerts.
    pub const fn is_urgent(self) -> bool {
        matches!(self, UrgencyStatus::VeryUrgent | UrgencyStatus::Emergency)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, UrgencyStatus::Fulfilled | UrgencyStatus::Rejected)
    }
}

impl FromStr for UrgencyStatus {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cleaned = raw.replace('"', "");
        match cleaned.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(UrgencyStatus::Planned),
            "very urgent" | "very_urgent" => Ok(UrgencyStatus::VeryUrgent),
            "emergency" => Ok(UrgencyStatus::Emergency),
            "fulfilled" => Ok(UrgencyStatus::Fulfilled),
            "approved" => Ok(UrgencyStatus::Approved),
            "rejected" => Ok(UrgencyStatus::Rejected),
            _ => Err(ValidationError::UnknownStatus(raw.trim().to_string())),
        }
    }
}

/// Decision taken through the hospital channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HospitalApproval {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Aggregate donor-side state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonorApproval {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    #[default]
    Pending,
    Fulfilled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceRecord {
    pub donor_id: DonorId,
    pub accepted_at: DateTime<Utc>,
    #[serde(default)]
    pub donation_status: DonationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionRecord {
    pub donor_id: DonorId,
    pub rejected_at: DateTime<Utc>,
}

/// Bookkeeping conflicts raised when a donor response cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordConflict {
    #[error("donor {0} already responded to this request")]
    AlreadyResponded(DonorId),
    #[error("request {0} is no longer open to donors")]
    RequestClosed(RequestId),
    #[error("donor {0} has not accepted this request")]
    NoAcceptance(DonorId),
    #[error("donation by donor {0} is already fulfilled")]
    AlreadyFulfilled(DonorId),
    #[error("donation on {attempted} precedes the last recorded donation on {last}")]
    DonationOutOfOrder {
        last: NaiveDate,
        attempted: NaiveDate,
    },
}

/// A hospital's or patient's solicitation for blood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: RequestId,
    pub requester_id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub specialization: String,
    pub contact_number: String,
    /// Free-text label as supplied; compare through `normalize_blood_type`.
    pub blood_type: String,
    pub units_required: u32,
    pub status: UrgencyStatus,
    pub needed_on: NaiveDate,
    pub needed_at: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub acceptances: Vec<AcceptanceRecord>,
    #[serde(default)]
    pub rejections: Vec<RejectionRecord>,
    #[serde(default)]
    pub hospital_approval: HospitalApproval,
    #[serde(default)]
    pub donor_approval: DonorApproval,
}

impl BloodRequest {
    pub fn accepted_by(&self, donor_id: &DonorId) -> bool {
        self.acceptances
            .iter()
            .any(|record| &record.donor_id == donor_id)
    }

    pub fn rejected_by(&self, donor_id: &DonorId) -> bool {
        self.rejections
            .iter()
            .any(|record| &record.donor_id == donor_id)
    }

    pub fn has_responded(&self, donor_id: &DonorId) -> bool {
        self.accepted_by(donor_id) || self.rejected_by(donor_id)
    }

    pub fn fulfilled_units(&self) -> usize {
        self.acceptances
            .iter()
            .filter(|record| record.donation_status == DonationStatus::Fulfilled)
            .count()
    }

    fn units_met(&self, count: usize) -> bool {
        count >= self.units_required as usize
    }

    /// Record an acceptance. Each acceptance pledges one unit; once every unit is pledged the
    /// request closes to further donors.
    pub fn apply_acceptance(
        &mut self,
        donor_id: &DonorId,
        at: DateTime<Utc>,
    ) -> Result<(), RecordConflict> {
        if self.has_responded(donor_id) {
            return Err(RecordConflict::AlreadyResponded(donor_id.clone()));
        }
        if self.donor_approval != DonorApproval::Pending || self.status.is_terminal() {
            return Err(RecordConflict::RequestClosed(self.id.clone()));
        }

        self.acceptances.push(AcceptanceRecord {
            donor_id: donor_id.clone(),
            accepted_at: at,
            donation_status: DonationStatus::Pending,
        });
        if self.units_met(self.acceptances.len()) {
            self.donor_approval = DonorApproval::Accepted;
        }
        Ok(())
    }

    pub fn apply_rejection(
        &mut self,
        donor_id: &DonorId,
        at: DateTime<Utc>,
    ) -> Result<(), RecordConflict> {
        if self.has_responded(donor_id) {
            return Err(RecordConflict::AlreadyResponded(donor_id.clone()));
        }

        self.rejections.push(RejectionRecord {
            donor_id: donor_id.clone(),
            rejected_at: at,
        });
        Ok(())
    }

    pub fn mark_fulfilled(&mut self, donor_id: &DonorId) -> Result<(), RecordConflict> {
        let record = self
            .acceptances
            .iter_mut()
            .find(|record| &record.donor_id == donor_id)
            .ok_or_else(|| RecordConflict::NoAcceptance(donor_id.clone()))?;

        if record.donation_status == DonationStatus::Fulfilled {
            return Err(RecordConflict::AlreadyFulfilled(donor_id.clone()));
        }
        record.donation_status = DonationStatus::Fulfilled;

        if self.units_met(self.fulfilled_units()) {
            self.status = UrgencyStatus::Fulfilled;
        }
        Ok(())
    }

    /// Replace the requester-editable details with those of `revised`, keeping identity,
    /// creation time, donor responses and the hospital decision. Closed requests are frozen.
    pub fn revise(&mut self, revised: BloodRequest) -> Result<(), RecordConflict> {
        if self.status.is_terminal() {
            return Err(RecordConflict::RequestClosed(self.id.clone()));
        }

        self.patient_name = revised.patient_name;
        self.doctor_name = revised.doctor_name;
        self.specialization = revised.specialization;
        self.contact_number = revised.contact_number;
        self.blood_type = revised.blood_type;
        self.units_required = revised.units_required;
        self.status = revised.status;
        self.needed_on = revised.needed_on;
        self.needed_at = revised.needed_at;
        self.address = revised.address;

        self.donor_approval = if self.units_met(self.acceptances.len()) {
            DonorApproval::Accepted
        } else {
            DonorApproval::Pending
        };
        if self.units_met(self.fulfilled_units()) {
            self.status = UrgencyStatus::Fulfilled;
        }
        Ok(())
    }
}

/// Raw request form as submitted by a requester, prior to validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSubmission {
    pub requester_id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub specialization: String,
    pub contact_number: String,
    pub blood_type: String,
    pub units_required: u32,
    pub status: String,
    pub needed_on: NaiveDate,
    pub needed_at: String,
    pub address: String,
}
