//! CSV donor roster import used to seed stores and drive offline eligibility reports.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::blood_type::BloodType;
use super::domain::{Donor, DonorId, Gender, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read donor roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid donor roster CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: ValidationError,
    },
    #[error("roster line {line}: '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { line: usize, value: String },
}

pub fn load_roster(path: impl AsRef<Path>) -> Result<Vec<Donor>, RosterError> {
    let file = File::open(path)?;
    parse_roster(file)
}

pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<Donor>, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut donors = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        // header occupies line 1
        let line = index + 2;
        let row = record?;
        donors.push(row.into_donor(line)?);
    }

    Ok(donors)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: String,
    full_name: String,
    #[serde(default)]
    email: String,
    date_of_birth: String,
    gender: String,
    blood_type: String,
    #[serde(default, deserialize_with = "flag")]
    pregnancy_or_breastfeeding: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    eligibility: Option<bool>,
    #[serde(default)]
    donation_history: String,
    #[serde(default)]
    surgical_history: String,
    #[serde(default)]
    medicines: String,
    #[serde(default)]
    vaccinations: String,
}

impl RosterRow {
    fn into_donor(self, line: usize) -> Result<Donor, RosterError> {
        let invalid = |source| RosterError::Invalid { line, source };

        let gender: Gender = self.gender.parse().map_err(invalid)?;
        let blood_type: BloodType = self.blood_type.parse().map_err(invalid)?;
        let date_of_birth = parse_date(&self.date_of_birth, line)?;

        let mut donation_history = split_list(&self.donation_history)
            .iter()
            .map(|value| parse_date(value, line))
            .collect::<Result<Vec<_>, _>>()?;
        donation_history.sort();

        Ok(Donor {
            id: DonorId(self.id),
            full_name: self.full_name,
            email: self.email,
            date_of_birth,
            gender,
            blood_type,
            pregnancy_or_breastfeeding: self.pregnancy_or_breastfeeding.unwrap_or(false),
            donation_history,
            surgical_history: split_list(&self.surgical_history),
            medicines: split_list(&self.medicines),
            vaccinations_taken: split_list(&self.vaccinations),
            eligibility: self.eligibility.unwrap_or(true),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_date(value: &str, line: usize) -> Result<NaiveDate, RosterError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| RosterError::InvalidDate {
        line,
        value: value.trim().to_string(),
    })
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "yes" | "y" | "true" | "1" => Some(true),
            _ => Some(false),
        }
    }))
}
