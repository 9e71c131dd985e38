use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::domain::ValidationError;

fn blood_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\(?((?:AB|A|B|O)[+-])\)?").expect("blood type pattern compiles")
    })
}

/// Reduce free-text blood type labels such as `"A Positive (A+)"` to their canonical form.
///
/// The first ABO/Rh token wins; inputs without one fall back to the trimmed, uppercased text.
pub fn normalize_blood_type(raw: &str) -> String {
    match blood_type_pattern()
        .captures(raw)
        .and_then(|captures| captures.get(1))
    {
        Some(token) => token.as_str().to_ascii_uppercase(),
        None => raw.trim().to_uppercase(),
    }
}

/// The eight ABO/Rh combinations accepted for donors and requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    /// Exact-match compatibility against a request's free-text blood type.
    pub fn matches_label(self, raw: &str) -> bool {
        normalize_blood_type(raw) == self.label()
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BloodType {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(ValidationError::MissingBloodType);
        }

        let normalized = normalize_blood_type(raw);
        BloodType::ALL
            .into_iter()
            .find(|candidate| candidate.label() == normalized)
            .ok_or_else(|| ValidationError::UnknownBloodType(raw.trim().to_string()))
    }
}
