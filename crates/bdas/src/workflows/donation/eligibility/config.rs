use serde::{Deserialize, Serialize};

use super::super::domain::Gender;

/// Cool-down windows between consecutive donations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub female_gap_days: u32,
    pub default_gap_days: u32,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            female_gap_days: 120,
            default_gap_days: 90,
        }
    }
}

impl EligibilityConfig {
    pub fn required_gap_days(&self, gender: Gender) -> u32 {
        match gender {
            Gender::Female => self.female_gap_days,
            Gender::Male | Gender::Other => self.default_gap_days,
        }
    }

    /// Human readable form of the gap, e.g. "4 months" for 120 days.
    pub fn gap_label(&self, gender: Gender) -> String {
        let days = self.required_gap_days(gender);
        if days % 30 == 0 {
            let months = days / 30;
            if months == 1 {
                "1 month".to_string()
            } else {
                format!("{months} months")
            }
        } else {
            format!("{days} days")
        }
    }
}
