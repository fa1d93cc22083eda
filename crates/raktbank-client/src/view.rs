//! Read-side text for rendering session state.

use crate::prediction::{PredictionOutcome, PredictionState};
use crate::records::{Appointment, Donor, Inventory};
use crate::store::CollectionStore;

pub const NO_DONORS: &str = "No donors yet";
pub const NO_APPOINTMENTS: &str = "No appointments";

/// Confidence in [0, 1] as a rounded whole percentage
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

pub fn donor_line(donor: &Donor) -> String {
    format!("{} - {}", donor.name(), donor.blood_group())
}

pub fn appointment_line(appointment: &Appointment) -> String {
    let date = appointment.date().format("%Y-%m-%d");
    match appointment.time() {
        Some(time) => format!("{} - {} {}", appointment.donor_name(), date, time.format("%H:%M")),
        None => format!("{} - {}", appointment.donor_name(), date),
    }
}

/// Recent donors, newest first
pub fn donor_lines(store: &CollectionStore) -> Vec<String> {
    if store.donors().is_empty() {
        return vec![NO_DONORS.to_string()];
    }
    store.donors().iter().map(donor_line).collect()
}

pub fn appointment_lines(store: &CollectionStore) -> Vec<String> {
    if store.appointments().is_empty() {
        return vec![NO_APPOINTMENTS.to_string()];
    }
    store.appointments().iter().map(appointment_line).collect()
}

/// Inventory table with a header row
pub fn inventory_lines(inventory: &Inventory) -> Vec<String> {
    std::iter::once(format!("{:<12} {:>5}", "Blood Group", "Units"))
        .chain(
            inventory
                .items()
                .iter()
                .map(|item| format!("{:<12} {:>5}", item.group.as_str(), item.units)),
        )
        .collect()
}

/// Nothing while idle, a progress line while pending
pub fn prediction_lines(state: &PredictionState) -> Vec<String> {
    match state {
        PredictionState::Idle => Vec::new(),
        PredictionState::Pending(_) => vec!["Predicting...".to_string()],
        PredictionState::Settled(PredictionOutcome::Success(result)) => vec![
            format!("Prediction: {}", result.label),
            format!("Confidence: {}%", confidence_percent(result.confidence)),
        ],
        PredictionState::Settled(PredictionOutcome::Failed { error }) => vec![error.clone()],
    }
}
