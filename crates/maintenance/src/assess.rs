//! Status Assessment

use storage::{MaintenanceStatus, Part};
use tracing::debug;

/// Decide a part's status from the vehicle's current and predicted mileage.
///
/// Without a prediction the current mileage stands in for it. Without any
/// readings the part cannot be due or overdue.
pub fn assess_part(part: &Part, current: Option<i64>, predicted: Option<i64>) -> MaintenanceStatus {
    let threshold = part.replacement_mileage();
    let predicted = predicted.or(current);

    let status = match (current, predicted) {
        (Some(current), _) if current >= threshold => MaintenanceStatus::MaintenanceOverdue,
        (_, Some(predicted)) if predicted >= threshold => MaintenanceStatus::MaintenanceDue,
        _ if part.status == MaintenanceStatus::Maintained => MaintenanceStatus::Maintained,
        _ => MaintenanceStatus::Good,
    };

    debug!(
        "Part {} assessed {} (threshold {}, current {:?}, predicted {:?})",
        part.id, status, threshold, current, predicted
    );
    status
}

/// Roll part statuses up into a vehicle status: the most severe wins
pub fn vehicle_status<I>(statuses: I) -> MaintenanceStatus
where
    I: IntoIterator<Item = MaintenanceStatus>,
{
    statuses
        .into_iter()
        .max_by_key(|s| s.severity())
        .filter(|s| s.needs_attention())
        .unwrap_or(MaintenanceStatus::Good)
}
