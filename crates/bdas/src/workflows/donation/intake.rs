use chrono::{DateTime, Utc};

use super::blood_type::BloodType;
use super::domain::{
    BloodRequest, DonorApproval, HospitalApproval, RequestId, RequestSubmission, UrgencyStatus,
    ValidationError,
};

const DEFAULT_MIN_ADDRESS_LEN: usize = 10;
const DEFAULT_CONTACT_DIGITS: usize = 10;

/// Form rules applied to incoming request submissions.
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    min_address_len: usize,
    contact_digits: usize,
}

impl IntakePolicy {
    pub fn new(min_address_len: usize, contact_digits: usize) -> Self {
        Self {
            min_address_len,
            contact_digits: if contact_digits == 0 {
                DEFAULT_CONTACT_DIGITS
            } else {
                contact_digits
            },
        }
    }
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ADDRESS_LEN, DEFAULT_CONTACT_DIGITS)
    }
}

/// Guard responsible for turning submissions into storable `BloodRequest`s.
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    policy: IntakePolicy,
}

impl RequestGuard {
    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn request_from_submission(
        &self,
        submission: RequestSubmission,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, ValidationError> {
        require(&submission.requester_id, "requester id")?;
        validate_name(&submission.patient_name, "patient name")?;
        validate_name(&submission.doctor_name, "doctor name")?;
        require(&submission.specialization, "specialization")?;
        require(&submission.needed_at, "time needed")?;

        let contact = submission.contact_number.trim();
        require(contact, "contact number")?;
        if contact.len() != self.policy.contact_digits
            || !contact.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidContactNumber);
        }

        if submission.units_required == 0 {
            return Err(ValidationError::InvalidUnits);
        }

        let address = submission.address.trim();
        require(address, "address")?;
        if address.chars().count() < self.policy.min_address_len {
            return Err(ValidationError::AddressTooShort {
                min: self.policy.min_address_len,
            });
        }

        let blood_type: BloodType = submission.blood_type.parse()?;

        let status: UrgencyStatus = submission.status.parse()?;
        if !matches!(
            status,
            UrgencyStatus::Planned | UrgencyStatus::VeryUrgent | UrgencyStatus::Emergency
        ) {
            return Err(ValidationError::StatusNotAllowedAtCreation(status.label()));
        }

        Ok(BloodRequest {
            id,
            requester_id: submission.requester_id.trim().to_string(),
            patient_name: submission.patient_name.trim().to_string(),
            doctor_name: submission.doctor_name.trim().to_string(),
            specialization: submission.specialization.trim().to_string(),
            contact_number: contact.to_string(),
            blood_type: blood_type.label().to_string(),
            units_required: submission.units_required,
            status,
            needed_on: submission.needed_on,
            needed_at: submission.needed_at.trim().to_string(),
            address: address.to_string(),
            created_at: now,
            acceptances: Vec::new(),
            rejections: Vec::new(),
            hospital_approval: HospitalApproval::Pending,
            donor_approval: DonorApproval::Pending,
        })
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

fn validate_name(value: &str, field: &'static str) -> Result<(), ValidationError> {
    require(value, field)?;
    if value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        Ok(())
    } else {
        Err(ValidationError::InvalidName { field })
    }
}
