//! Optimizer abstractions for parameter updates
//!
//! Optimizers define how gradients update model parameters. The trainer only
//! sees the trait, so the update rule can be swapped without touching the
//! training loop.

pub mod sgd;

pub use sgd::Sgd;

/// Core trait for optimizers.
///
/// # Example
///
/// ```ignore
/// let mut optimizer = Sgd::new(0.001);
/// for (parameters, gradients) in model.parameters_and_gradients() {
///     optimizer.update(parameters, gradients);
/// }
/// ```
pub trait Optimizer {
    /// Update parameters in-place using gradients.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `parameters` and `gradients` have
    /// different lengths.
    fn update(&mut self, parameters: &mut [f32], gradients: &[f32]);

    /// Base learning rate of this optimizer.
    fn learning_rate(&self) -> f32;
}
