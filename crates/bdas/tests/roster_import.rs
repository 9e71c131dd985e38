use bdas::workflows::donation::{
    parse_roster, BloodType, EligibilityEvaluator, Gender, IneligibilityReason, RosterError,
};
use chrono::NaiveDate;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid as-of date")
}

#[test]
fn fixture_roster_loads_every_donor() {
    let data = include_bytes!("../fixtures/donor_roster.csv");

    let donors = parse_roster(&data[..]).expect("fixture roster parses");

    assert_eq!(donors.len(), 6);
    let sanjay = donors
        .iter()
        .find(|donor| donor.id.0 == "d-005")
        .expect("d-005 present");
    assert_eq!(sanjay.gender, Gender::Other);
    assert_eq!(sanjay.blood_type, BloodType::AbNegative);
    assert!(sanjay.email.is_empty());
    assert!(sanjay.vaccinations_taken.is_empty());
    assert_eq!(sanjay.donation_count(), 3);
}

#[test]
fn fixture_roster_evaluates_against_cool_down_rules() {
    let data = include_bytes!("../fixtures/donor_roster.csv");
    let donors = parse_roster(&data[..]).expect("fixture roster parses");
    let evaluator = EligibilityEvaluator::default();

    let verdicts: Vec<(String, bool)> = donors
        .iter()
        .map(|donor| (donor.id.0.clone(), evaluator.evaluate(donor, as_of()).eligible))
        .collect();

    assert_eq!(
        verdicts,
        vec![
            ("d-001".to_string(), false),
            ("d-002".to_string(), true),
            ("d-003".to_string(), true),
            ("d-004".to_string(), false),
            ("d-005".to_string(), true),
            ("d-006".to_string(), false),
        ]
    );

    let fathima = evaluator.evaluate(&donors[3], as_of());
    assert_eq!(fathima.reason, Some(IneligibilityReason::PregnantOrBreastfeeding));
    assert_eq!(fathima.next_eligible_date, None);

    let divya = evaluator.evaluate(&donors[5], as_of());
    assert_eq!(
        divya.next_eligible_date,
        NaiveDate::from_ymd_opt(2024, 6, 29)
    );
}

#[test]
fn unknown_gender_reports_its_line() {
    let csv = "id,full_name,email,date_of_birth,gender,blood_type\n\
d-1,Arun Das,arun@example.com,1988-07-01,Male,O+\n\
d-2,Nila Varma,nila@example.com,1991-04-18,Unknown,O+\n";

    match parse_roster(csv.as_bytes()) {
        Err(RosterError::Invalid { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected invalid row, got {other:?}"),
    }
}
