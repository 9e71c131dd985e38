use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a donor may not donate on the evaluated date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IneligibilityReason {
    PregnantOrBreastfeeding,
    CoolDown {
        gap: String,
        next_eligible: NaiveDate,
    },
}

impl IneligibilityReason {
    /// Message surfaced verbatim to a donor whose action was refused.
    pub fn summary(&self) -> String {
        match self {
            IneligibilityReason::PregnantOrBreastfeeding => {
                "Pregnant or breastfeeding donors cannot donate blood for safety reasons."
                    .to_string()
            }
            IneligibilityReason::CoolDown { gap, next_eligible } => format!(
                "You can only donate blood once every {gap}. Your next eligible donation date is {}.",
                format_display_date(*next_eligible)
            ),
        }
    }
}

pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Listing label shown to hospitals browsing willing donors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonorHealthStatus {
    Healthy,
    RecentDonor,
    NotEligible,
}

impl DonorHealthStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DonorHealthStatus::Healthy => "Healthy",
            DonorHealthStatus::RecentDonor => "Recent Donor",
            DonorHealthStatus::NotEligible => "Not Eligible",
        }
    }
}

/// Recognition tier earned through completed donations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonorBadge {
    Bronze,
    Silver,
    Gold,
}

impl DonorBadge {
    pub const fn for_donations(count: usize) -> Self {
        if count >= 20 {
            DonorBadge::Gold
        } else if count >= 10 {
            DonorBadge::Silver
        } else {
            DonorBadge::Bronze
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DonorBadge::Bronze => "Bronze Level",
            DonorBadge::Silver => "Silver Level",
            DonorBadge::Gold => "Gold Level",
        }
    }
}
