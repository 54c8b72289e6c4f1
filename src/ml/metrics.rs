//! Regression goodness-of-fit metrics.

/// Coefficient of determination.
///
/// `None` when fewer than two labels are given, since the score is not
/// defined there. With constant labels the score is 1.0 for an exact fit and
/// 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.len() < 2 {
        return None;
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();

    if ss_tot == 0.0 {
        return Some(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Some(1.0 - ss_res / ss_tot)
}

/// Root mean squared error. `None` for empty input.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return None;
    }
    let mse = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>()
        / y_true.len() as f64;
    Some(mse.sqrt())
}
