//! Tests for the mean squared error loss and its gradient

use approx::assert_relative_eq;
use multichannel_trainer::loss::{mean_squared_error, mean_squared_error_gradient};

#[test]
fn test_loss_is_exactly_zero_on_equal_inputs() {
    let values = [0.0f32, 1.5, -2.25, 100.0, 0.001, -0.001];
    assert_eq!(mean_squared_error(&values, &values, 2, 3), 0.0);
    assert_eq!(mean_squared_error(&values, &values, 3, 2), 0.0);
}

#[test]
fn test_loss_known_value() {
    let predictions = [3.0f32, 0.0, -1.0, 2.0];
    let targets = [1.0f32, 0.0, 1.0, 2.0];
    // (4 + 0 + 4 + 0) / 4
    assert_relative_eq!(
        mean_squared_error(&predictions, &targets, 2, 2),
        2.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_loss_is_symmetric() {
    let a = [1.0f32, -2.0, 0.5];
    let b = [0.0f32, 2.0, 0.75];
    assert_relative_eq!(
        mean_squared_error(&a, &b, 1, 3),
        mean_squared_error(&b, &a, 1, 3),
        epsilon = 1e-7
    );
}

#[test]
fn test_gradient_is_zero_at_minimum() {
    let values = [0.5f32, -0.5];
    let mut grad = [1.0f32; 2];
    mean_squared_error_gradient(&values, &values, 1, 2, &mut grad);
    assert_eq!(grad, [0.0, 0.0]);
}

#[test]
fn test_gradient_scale() {
    let predictions = [2.0f32, 0.0, 0.0, 0.0];
    let targets = [0.0f32; 4];
    let mut grad = [0.0f32; 4];
    mean_squared_error_gradient(&predictions, &targets, 2, 2, &mut grad);

    // 2 * (2 - 0) / 4
    assert_relative_eq!(grad[0], 1.0, epsilon = 1e-6);
    assert!(grad[1..].iter().all(|&g| g == 0.0));
}

#[test]
fn test_gradient_descends_the_loss() {
    // Stepping against the gradient must reduce the loss.
    let mut predictions = [2.0f32, -1.0];
    let targets = [0.5f32, 0.5];
    let before = mean_squared_error(&predictions, &targets, 1, 2);

    let mut grad = [0.0f32; 2];
    mean_squared_error_gradient(&predictions, &targets, 1, 2, &mut grad);
    for (p, g) in predictions.iter_mut().zip(&grad) {
        *p -= 0.1 * g;
    }

    let after = mean_squared_error(&predictions, &targets, 1, 2);
    assert!(after < before);
}
