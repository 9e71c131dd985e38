use crate::infra::{parse_blood_type, parse_date};
use bdas::error::AppError;
use bdas::workflows::donation::{
    format_display_date, health_profile_complete, load_roster, BloodType, Donor, DonorBadge,
    EligibilityEvaluator,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EligibilityArgs {
    /// Donor roster CSV (see fixtures/donor_roster.csv for the expected columns)
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Only list donors of this blood type, e.g. "O+" or "O Positive (O+)"
    #[arg(long, value_parser = parse_blood_type)]
    pub(crate) blood_type: Option<BloodType>,
}

/// One printed line of the eligibility report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EligibilityRow {
    pub(crate) donor_id: String,
    pub(crate) name: String,
    pub(crate) blood_type: BloodType,
    pub(crate) eligible: bool,
    pub(crate) next_eligible_date: Option<NaiveDate>,
    pub(crate) health_status: &'static str,
    pub(crate) badge: DonorBadge,
    pub(crate) profile_complete: bool,
    pub(crate) reason: Option<String>,
}

pub(crate) fn run_eligibility_report(args: EligibilityArgs) -> Result<(), AppError> {
    let EligibilityArgs {
        roster,
        as_of,
        blood_type,
    } = args;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let donors = load_roster(&roster)?;
    let rows = eligibility_rows(&donors, as_of, blood_type, &EligibilityEvaluator::default());

    render_report(&rows, as_of, &roster);
    Ok(())
}

pub(crate) fn eligibility_rows(
    donors: &[Donor],
    as_of: NaiveDate,
    blood_type: Option<BloodType>,
    evaluator: &EligibilityEvaluator,
) -> Vec<EligibilityRow> {
    donors
        .iter()
        .filter(|donor| blood_type.map_or(true, |wanted| donor.blood_type == wanted))
        .map(|donor| {
            let outcome = evaluator.evaluate(donor, as_of);
            EligibilityRow {
                donor_id: donor.id.0.clone(),
                name: donor.salutation().to_string(),
                blood_type: donor.blood_type,
                eligible: outcome.eligible,
                next_eligible_date: outcome.next_eligible_date,
                health_status: outcome.health_status().label(),
                badge: DonorBadge::for_donations(donor.donation_count()),
                profile_complete: health_profile_complete(donor),
                reason: outcome.reason_text(),
            }
        })
        .collect()
}

fn render_report(rows: &[EligibilityRow], as_of: NaiveDate, roster: &std::path::Path) {
    let eligible = rows.iter().filter(|row| row.eligible).count();

    println!("Donor eligibility report");
    println!("  Roster: {}", roster.display());
    println!("  As of: {}", format_display_date(as_of));
    println!("  Donors: {} ({} eligible)", rows.len(), eligible);

    if rows.is_empty() {
        println!("\nNo donors matched the requested filters.");
        return;
    }

    println!();
    for row in rows {
        let verdict = if row.eligible { "ELIGIBLE" } else { "WAIT" };
        println!(
            "- {} {} [{}] {} | {} | {}",
            row.donor_id,
            row.name,
            row.blood_type,
            verdict,
            row.health_status,
            row.badge.label()
        );
        if let Some(next) = row.next_eligible_date {
            println!("    next eligible: {}", format_display_date(next));
        }
        if let Some(reason) = &row.reason {
            println!("    {reason}");
        }
        if !row.profile_complete {
            println!("    health profile incomplete; responses are blocked until it is filled in");
        }
    }
}
