use chrono::{Duration, NaiveDate};

use super::super::domain::Donor;
use super::config::EligibilityConfig;

/// Outstanding cool-down derived from the most recent donation.
pub(crate) struct CoolDownSignal {
    pub gap_label: String,
    pub next_eligible: NaiveDate,
}

pub(crate) fn cool_down(
    donor: &Donor,
    as_of: NaiveDate,
    config: &EligibilityConfig,
) -> Option<CoolDownSignal> {
    let last_donation = donor.last_donation()?;
    let required_gap = i64::from(config.required_gap_days(donor.gender));
    let days_since = as_of.signed_duration_since(last_donation).num_days();

    if days_since >= required_gap {
        return None;
    }

    Some(CoolDownSignal {
        gap_label: config.gap_label(donor.gender),
        // Saturates at the calendar's upper bound.
        next_eligible: last_donation
            .checked_add_signed(Duration::days(required_gap))
            .unwrap_or(NaiveDate::MAX),
    })
}

/// Surgical history, medicines and vaccinations must all be recorded before a donor may act on
/// any request.
pub fn health_profile_complete(donor: &Donor) -> bool {
    !donor.surgical_history.is_empty()
        && !donor.medicines.is_empty()
        && !donor.vaccinations_taken.is_empty()
}
