//! Mean squared error
//!
//! Loss between predicted and target vectors of equal width, reduced to a
//! scalar over the whole minibatch. The gradient kernel mirrors the loss so
//! the two stay consistent.

/// Mean of the squared differences over all `batch_size * width` elements.
///
/// Returns exactly 0.0 when predictions equal targets.
///
/// # Panics
///
/// Panics if either slice is shorter than `batch_size * width`.
pub fn mean_squared_error(
    predictions: &[f32],
    targets: &[f32],
    batch_size: usize,
    width: usize,
) -> f32 {
    let len = batch_size * width;
    assert!(predictions.len() >= len && targets.len() >= len);

    let mut total = 0.0f32;
    for (p, t) in predictions[..len].iter().zip(&targets[..len]) {
        let diff = p - t;
        total += diff * diff;
    }
    total / len as f32
}

/// Gradient of [`mean_squared_error`] with respect to the predictions:
/// `2 * (prediction - target) / (batch_size * width)`, written into `grad`.
pub fn mean_squared_error_gradient(
    predictions: &[f32],
    targets: &[f32],
    batch_size: usize,
    width: usize,
    grad: &mut [f32],
) {
    let len = batch_size * width;
    assert!(predictions.len() >= len && targets.len() >= len && grad.len() >= len);

    let scale = 2.0 / len as f32;
    for i in 0..len {
        grad[i] = scale * (predictions[i] - targets[i]);
    }
}
