use std::fmt::Write as _;

use super::super::domain::{BloodRequest, Donor};
use super::super::eligibility::format_display_date;
use super::transport::OutboundMessage;

pub(crate) fn subject_for(request: &BloodRequest) -> String {
    format!(
        "URGENT: Blood Donation Request - {} Needed",
        request.blood_type
    )
}

pub(crate) fn build_message(request: &BloodRequest, donor: &Donor, sender: &str) -> OutboundMessage {
    let mut body = String::new();
    let _ = writeln!(body, "Dear {},", donor.salutation());
    let _ = writeln!(body);
    let _ = writeln!(body, "URGENT BLOOD DONATION REQUEST");
    let _ = writeln!(body, "Patient Name: {}", request.patient_name);
    let _ = writeln!(body, "Blood Type Needed: {}", request.blood_type);
    let _ = writeln!(body, "Units Required: {}", request.units_required);
    let _ = writeln!(body, "Status: {}", request.status.label());
    let _ = writeln!(body, "Doctor: {}", request.doctor_name);
    let _ = writeln!(body, "Specialization: {}", request.specialization);
    let _ = writeln!(body, "Date Needed: {}", format_display_date(request.needed_on));
    let _ = writeln!(body, "Time: {}", request.needed_at);
    let _ = writeln!(body, "Location: {}", request.address);
    let _ = writeln!(body, "Contact Number: {}", request.contact_number);
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "This is an urgent request. If you're able to help, please respond immediately."
    );
    let _ = write!(body, "Your donation can save a life!");

    OutboundMessage {
        donor_id: donor.id.clone(),
        from: sender.to_string(),
        to: donor.email.trim().to_string(),
        subject: subject_for(request),
        body,
    }
}
