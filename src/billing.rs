//! Insurance arithmetic for payment recording.

/// Split an amount between insurer and patient.
///
/// `coverage_percentage` is the insurer's share in [0, 100]; a patient
/// with no insurance passes `None` and pays the full amount.
pub fn split_amount(amount: f64, coverage_percentage: Option<f64>) -> (f64, f64) {
    let insurance_coverage = match coverage_percentage {
        Some(pct) => amount * (pct / 100.0),
        None => 0.0,
    };
    (insurance_coverage, amount - insurance_coverage)
}
