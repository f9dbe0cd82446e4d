//! Stochastic Gradient Descent (SGD) optimizer
//!
//! Vanilla gradient descent without momentum or adaptive rates:
//! `parameter = parameter - learning_rate * gradient`.

use crate::optimizers::Optimizer;

/// Stochastic gradient descent with a fixed learning rate.
///
/// # Example
///
/// ```
/// use multichannel_trainer::optimizers::{Optimizer, Sgd};
///
/// let mut optimizer = Sgd::new(0.1);
/// let mut params = vec![1.0, 2.0];
/// let grads = vec![0.1, 0.2];
/// optimizer.update(&mut params, &grads);
/// assert!((params[0] - 0.99).abs() < 1e-6);
/// assert!((params[1] - 1.98).abs() < 1e-6);
/// ```
pub struct Sgd {
    learning_rate: f32,
}

impl Sgd {
    /// Create an SGD optimizer with the given step size.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn update(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        assert_eq!(
            parameters.len(),
            gradients.len(),
            "Parameters and gradients must have the same length"
        );

        for (param, grad) in parameters.iter_mut().zip(gradients.iter()) {
            *param -= self.learning_rate * grad;
        }
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_applies_rule() {
        let mut optimizer = Sgd::new(0.5);
        let mut params = vec![1.0f32, -1.0];
        let grads = vec![2.0f32, -2.0];

        optimizer.update(&mut params, &grads);

        assert_eq!(params, vec![0.0, 0.0]);
        assert_eq!(optimizer.learning_rate(), 0.5);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_length_mismatch_panics() {
        let mut optimizer = Sgd::new(0.1);
        let mut params = vec![1.0f32];
        let grads = vec![0.1f32, 0.2];
        optimizer.update(&mut params, &grads);
    }
}
