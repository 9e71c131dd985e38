use super::common::*;
use crate::workflows::donation::domain::Gender;
use crate::workflows::donation::{
    health_profile_complete, DonorBadge, DonorHealthStatus, EligibilityConfig,
    EligibilityEvaluator, IneligibilityReason,
};
use chrono::Duration;

#[test]
fn donor_without_history_is_eligible() {
    let evaluator = EligibilityEvaluator::default();

    for gender in [Gender::Male, Gender::Female, Gender::Other] {
        let donor = donor_with_history("d-1", gender, &[]);
        let outcome = evaluator.evaluate(&donor, date(2024, 3, 15));

        assert!(outcome.eligible, "{gender:?} with no donations");
        assert_eq!(outcome.next_eligible_date, None);
        assert_eq!(outcome.reason, None);
        assert_eq!(outcome.health_status(), DonorHealthStatus::Healthy);
    }
}

#[test]
fn male_donor_inside_cool_down_gets_next_date_and_reason() {
    let evaluator = EligibilityEvaluator::default();
    let donor = donor_with_history("d-1", Gender::Male, &[date(2024, 1, 1)]);

    let outcome = evaluator.evaluate(&donor, date(2024, 3, 15));

    assert!(!outcome.eligible);
    assert_eq!(outcome.next_eligible_date, Some(date(2024, 3, 31)));
    assert_eq!(
        outcome.reason_text().as_deref(),
        Some(
            "You can only donate blood once every 3 months. Your next eligible donation date is March 31, 2024."
        )
    );
    assert_eq!(outcome.health_status(), DonorHealthStatus::RecentDonor);
}

#[test]
fn male_donor_after_cool_down_is_eligible() {
    let evaluator = EligibilityEvaluator::default();
    let donor = donor_with_history("d-1", Gender::Male, &[date(2024, 1, 1)]);

    assert!(evaluator.evaluate(&donor, date(2024, 4, 1)).eligible);
    assert!(
        evaluator.evaluate(&donor, date(2024, 3, 31)).eligible,
        "gap boundary day is already eligible"
    );
}

#[test]
fn female_donor_waits_four_months() {
    let evaluator = EligibilityEvaluator::default();
    let donor = donor_with_history("d-2", Gender::Female, &[date(2024, 1, 1)]);

    let outcome = evaluator.evaluate(&donor, date(2024, 4, 29));

    assert!(!outcome.eligible);
    assert_eq!(outcome.next_eligible_date, Some(date(2024, 4, 30)));
    match outcome.reason {
        Some(IneligibilityReason::CoolDown { ref gap, .. }) => assert_eq!(gap, "4 months"),
        ref other => panic!("expected cool-down, got {other:?}"),
    }
    assert!(evaluator.evaluate(&donor, date(2024, 4, 30)).eligible);
}

#[test]
fn cool_down_holds_exactly_until_the_gap_elapses() {
    let evaluator = EligibilityEvaluator::default();
    let config = EligibilityConfig::default();
    let last = date(2023, 11, 20);

    for gender in [Gender::Male, Gender::Female, Gender::Other] {
        let donor = donor_with_history("d-3", gender, &[date(2023, 2, 1), last]);
        let gap = i64::from(config.required_gap_days(gender));

        for offset in 0..200 {
            let as_of = last + Duration::days(offset);
            let outcome = evaluator.evaluate(&donor, as_of);

            assert_eq!(outcome.eligible, offset >= gap, "{gender:?} at +{offset}d");
            if outcome.eligible {
                assert_eq!(outcome.next_eligible_date, None);
            } else {
                assert_eq!(outcome.next_eligible_date, Some(last + Duration::days(gap)));
            }
        }
    }
}

#[test]
fn most_recent_donation_drives_the_cool_down() {
    let evaluator = EligibilityEvaluator::default();
    let donor = donor_with_history(
        "d-4",
        Gender::Male,
        &[date(2024, 1, 1), date(2023, 6, 1)],
    );

    let outcome = evaluator.evaluate(&donor, date(2024, 2, 1));

    assert_eq!(outcome.next_eligible_date, Some(date(2024, 3, 31)));
}

#[test]
fn pregnancy_blocks_without_a_next_date() {
    let evaluator = EligibilityEvaluator::default();
    let mut donor = donor_with_history("d-5", Gender::Female, &[date(2024, 1, 1)]);
    donor.pregnancy_or_breastfeeding = true;

    let outcome = evaluator.evaluate(&donor, date(2024, 9, 1));

    assert!(!outcome.eligible);
    assert_eq!(outcome.next_eligible_date, None);
    assert_eq!(outcome.reason, Some(IneligibilityReason::PregnantOrBreastfeeding));
    assert_eq!(outcome.health_status(), DonorHealthStatus::NotEligible);
    assert_eq!(outcome.health_status().label(), "Not Eligible");
}

#[test]
fn donation_at_calendar_limit_saturates_next_date() {
    let evaluator = EligibilityEvaluator::default();
    let donor = donor_with_history("d-7", Gender::Male, &[chrono::NaiveDate::MAX]);

    let outcome = evaluator.evaluate(&donor, date(2024, 3, 15));

    assert!(!outcome.eligible);
    assert_eq!(outcome.next_eligible_date, Some(chrono::NaiveDate::MAX));
    assert!(outcome.reason_text().is_some());
}

#[test]
fn evaluation_is_repeatable() {
    let evaluator = EligibilityEvaluator::default();
    let donor = donor_with_history("d-6", Gender::Other, &[date(2024, 2, 10)]);

    let first = evaluator.evaluate(&donor, date(2024, 3, 1));
    let second = evaluator.evaluate(&donor, date(2024, 3, 1));

    assert_eq!(first, second);
}

#[test]
fn custom_gaps_are_respected() {
    let evaluator = EligibilityEvaluator::new(EligibilityConfig {
        female_gap_days: 30,
        default_gap_days: 10,
    });
    let donor = donor_with_history("d-7", Gender::Male, &[date(2024, 1, 1)]);

    assert!(!evaluator.evaluate(&donor, date(2024, 1, 10)).eligible);
    assert!(evaluator.evaluate(&donor, date(2024, 1, 11)).eligible);
}

#[test]
fn badge_tiers_follow_completed_donations() {
    assert_eq!(DonorBadge::for_donations(0), DonorBadge::Bronze);
    assert_eq!(DonorBadge::for_donations(9), DonorBadge::Bronze);
    assert_eq!(DonorBadge::for_donations(10), DonorBadge::Silver);
    assert_eq!(DonorBadge::for_donations(19), DonorBadge::Silver);
    assert_eq!(DonorBadge::for_donations(20), DonorBadge::Gold);
    assert_eq!(DonorBadge::Gold.label(), "Gold Level");
}

#[test]
fn health_profile_requires_every_section() {
    let complete = donor_with_history("d-8", Gender::Male, &[]);
    assert!(health_profile_complete(&complete));

    let mut missing_medicines = complete.clone();
    missing_medicines.medicines.clear();
    assert!(!health_profile_complete(&missing_medicines));

    let mut missing_vaccinations = complete.clone();
    missing_vaccinations.vaccinations_taken.clear();
    assert!(!health_profile_complete(&missing_vaccinations));

    let mut missing_surgery = complete;
    missing_surgery.surgical_history.clear();
    assert!(!health_profile_complete(&missing_surgery));
}
