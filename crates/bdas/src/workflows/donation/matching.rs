use super::domain::{BloodRequest, Donor, DonorApproval, HospitalApproval};

/// Whether `request` should be offered to `donor`.
///
/// Requests already claimed through the hospital channel, requests of another blood type,
/// requests the donor already answered, and requests no longer pending donor approval are
/// withheld.
pub fn is_candidate(donor: &Donor, request: &BloodRequest) -> bool {
    request.hospital_approval != HospitalApproval::Approved
        && donor.blood_type.matches_label(&request.blood_type)
        && !request.rejected_by(&donor.id)
        && !request.accepted_by(&donor.id)
        && request.donor_approval == DonorApproval::Pending
}

/// Requests to show the donor, in the order they were supplied. Computed fresh per call.
pub fn candidates_for<'a>(donor: &Donor, requests: &'a [BloodRequest]) -> Vec<&'a BloodRequest> {
    requests
        .iter()
        .filter(|request| is_candidate(donor, request))
        .collect()
}

/// Most recently created urgent candidate for the donor's alert view.
///
/// Candidates sharing a creation timestamp keep their supplied order.
pub fn spotlight<'a>(donor: &Donor, requests: &'a [BloodRequest]) -> Option<&'a BloodRequest> {
    let mut urgent: Vec<&BloodRequest> = candidates_for(donor, requests)
        .into_iter()
        .filter(|request| request.status.is_urgent())
        .collect();
    urgent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    urgent.into_iter().next()
}
