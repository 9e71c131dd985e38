mod config;
mod policy;
mod rules;

pub use config::EligibilityConfig;
pub use policy::{format_display_date, DonorBadge, DonorHealthStatus, IneligibilityReason};
pub use rules::health_profile_complete;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Donor, DonorId};

/// Pure, date-based eligibility check. Identical `(donor, as_of)` inputs always produce
/// identical outcomes.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEvaluator {
    config: EligibilityConfig,
}

impl EligibilityEvaluator {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn evaluate(&self, donor: &Donor, as_of: NaiveDate) -> EligibilityOutcome {
        if donor.pregnancy_or_breastfeeding {
            return EligibilityOutcome::blocked(
                donor,
                as_of,
                None,
                IneligibilityReason::PregnantOrBreastfeeding,
            );
        }

        match rules::cool_down(donor, as_of, &self.config) {
            Some(signal) => EligibilityOutcome::blocked(
                donor,
                as_of,
                Some(signal.next_eligible),
                IneligibilityReason::CoolDown {
                    gap: signal.gap_label,
                    next_eligible: signal.next_eligible,
                },
            ),
            None => EligibilityOutcome {
                donor_id: donor.id.clone(),
                as_of,
                eligible: true,
                next_eligible_date: None,
                reason: None,
            },
        }
    }
}

/// Result of an eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub donor_id: DonorId,
    pub as_of: NaiveDate,
    pub eligible: bool,
    pub next_eligible_date: Option<NaiveDate>,
    pub reason: Option<IneligibilityReason>,
}

impl EligibilityOutcome {
    fn blocked(
        donor: &Donor,
        as_of: NaiveDate,
        next_eligible_date: Option<NaiveDate>,
        reason: IneligibilityReason,
    ) -> Self {
        Self {
            donor_id: donor.id.clone(),
            as_of,
            eligible: false,
            next_eligible_date,
            reason: Some(reason),
        }
    }

    pub fn reason_text(&self) -> Option<String> {
        self.reason.as_ref().map(IneligibilityReason::summary)
    }

    pub fn health_status(&self) -> DonorHealthStatus {
        match &self.reason {
            None => DonorHealthStatus::Healthy,
            Some(IneligibilityReason::CoolDown { .. }) => DonorHealthStatus::RecentDonor,
            Some(IneligibilityReason::PregnantOrBreastfeeding) => DonorHealthStatus::NotEligible,
        }
    }
}
