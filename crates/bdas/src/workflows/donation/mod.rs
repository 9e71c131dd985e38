//! Blood request eligibility, donor matching, and urgent-request notification.
//!
//! Records are fetched from the stores as snapshots; every state transition (responses,
//! fulfilment, donation history) is requested back through the repository traits.

pub mod blood_type;
pub mod domain;
pub mod eligibility;
pub mod intake;
pub mod matching;
pub mod notification;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use blood_type::{normalize_blood_type, BloodType};
pub use domain::{
    AcceptanceRecord, BloodRequest, DonationStatus, Donor, DonorApproval, DonorId, Gender,
    HospitalApproval, RecordConflict, RejectionRecord, RequestId, RequestSubmission,
    UrgencyStatus, ValidationError,
};
pub use eligibility::{
    format_display_date, health_profile_complete, DonorBadge, DonorHealthStatus, EligibilityConfig,
    EligibilityEvaluator, EligibilityOutcome, IneligibilityReason,
};
pub use intake::{IntakePolicy, RequestGuard};
pub use matching::{candidates_for, is_candidate, spotlight};
pub use notification::{
    DeliveryFailure, DispatchConfig, DispatchError, DispatchReport, MailTransport,
    NotificationDispatcher, OutboundMessage, TransportError,
};
pub use repository::{DonorFilter, DonorRepository, RepositoryError, RequestRepository};
pub use roster::{load_roster, parse_roster, RosterError};
pub use router::donation_router;
pub use service::{
    DonationService, DonationServiceError, DonorStatusView, FulfilmentNotice, HospitalDecision,
    NotificationOutcome, RequestCreated,
};
