//! Trainer and training loop
//!
//! One training step binds a minibatch's channel tensors and targets to the
//! model's named inputs, runs forward, loss, backward, and one optimizer
//! update. The loop itself is a single linear state machine: keep requesting
//! minibatches until the source reports exhaustion, counting sweeps as their
//! end flags go by.

use crate::loss::{mean_squared_error, mean_squared_error_gradient};
use crate::model::LinearModel;
use crate::optimizers::Optimizer;
use crate::source::{Minibatch, MinibatchSource};
use std::error::Error;

fn invalid_data(message: String) -> Box<dyn Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}

/// Outcome of a completed training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingSummary {
    /// Full passes over the data observed via sweep-end flags
    pub sweeps: u32,

    /// Total minibatches trained on
    pub minibatches: u64,
}

/// Owns the model and optimizer for the duration of a run, plus reusable
/// per-batch buffers.
///
/// `channel_names` fixes the binding order; every minibatch must supply a
/// tensor for each name plus the target tensor, and a missing one is a fatal
/// configuration error, not a recoverable condition.
pub struct Trainer {
    model: LinearModel,
    optimizer: Box<dyn Optimizer>,
    channel_names: Vec<String>,
    features: Vec<f32>,
    outputs: Vec<f32>,
    grad_outputs: Vec<f32>,
    last_loss: f32,
}

impl Trainer {
    pub fn new(model: LinearModel, optimizer: Box<dyn Optimizer>, channel_names: Vec<String>) -> Self {
        Self {
            model,
            optimizer,
            channel_names,
            features: Vec::new(),
            outputs: Vec::new(),
            grad_outputs: Vec::new(),
            last_loss: 0.0,
        }
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Average loss of the most recent minibatch (0.0 before the first step).
    pub fn previous_minibatch_loss_average(&self) -> f32 {
        self.last_loss
    }

    /// Train on one minibatch and return its average loss.
    ///
    /// Binds each configured channel's tensor and the target tensor, then
    /// performs splice + normalize, forward, MSE, backward, and one
    /// optimizer step.
    pub fn train_minibatch(&mut self, batch: &Minibatch) -> Result<f32, Box<dyn Error>> {
        if batch.count == 0 {
            return Err(invalid_data("minibatch holds no examples".to_string()));
        }

        let (height, width, _) = self.model.spliced_shape();
        let plane = height * width;
        let output_size = self.model.output_size();

        let mut bound = Vec::with_capacity(self.channel_names.len());
        for name in &self.channel_names {
            let tensor = batch
                .channels
                .get(name)
                .ok_or_else(|| invalid_data(format!("minibatch is missing channel '{}'", name)))?;
            if tensor.len() < batch.count * plane {
                return Err(invalid_data(format!(
                    "channel '{}' tensor holds {} values, expected {}",
                    name,
                    tensor.len(),
                    batch.count * plane
                )));
            }
            bound.push(tensor.as_slice());
        }
        if batch.targets.len() < batch.count * output_size {
            return Err(invalid_data(format!(
                "target tensor holds {} values, expected {}",
                batch.targets.len(),
                batch.count * output_size
            )));
        }

        let feature_len = batch.count * self.model.feature_count();
        self.features.resize(feature_len, 0.0);
        self.outputs.resize(batch.count * output_size, 0.0);
        self.grad_outputs.resize(batch.count * output_size, 0.0);

        self.model
            .splice_normalize(&bound, batch.count, &mut self.features);
        self.model
            .forward(&self.features, &mut self.outputs, batch.count);

        let loss = mean_squared_error(&self.outputs, &batch.targets, batch.count, output_size);
        mean_squared_error_gradient(
            &self.outputs,
            &batch.targets,
            batch.count,
            output_size,
            &mut self.grad_outputs,
        );
        self.model
            .backward(&self.features, &self.grad_outputs, batch.count);

        for (parameters, gradients) in self.model.parameters_and_gradients() {
            self.optimizer.update(parameters, gradients);
        }

        self.last_loss = loss;
        Ok(loss)
    }

    /// Run the training loop until the source is exhausted.
    ///
    /// Each iteration requests one minibatch of `minibatch_size` examples.
    /// An empty source ends the run; a sweep-end batch bumps the sweep
    /// counter, logging the running loss every `log_interval` sweeps. Any
    /// error from the source or from a training step propagates out
    /// unrecovered.
    pub fn run(
        &mut self,
        source: &mut dyn MinibatchSource,
        minibatch_size: usize,
        log_interval: u32,
    ) -> Result<TrainingSummary, Box<dyn Error>> {
        let mut sweeps = 0u32;
        let mut minibatches = 0u64;

        loop {
            let batch = match source.next_minibatch(minibatch_size)? {
                Some(batch) => batch,
                None => {
                    println!("Completed all {} sweeps", sweeps);
                    break;
                }
            };

            self.train_minibatch(&batch)?;
            minibatches += 1;

            if batch.sweep_end {
                if log_interval > 0 && sweeps % log_interval == 0 {
                    println!(
                        "Current sweep: {}. Loss: {}",
                        sweeps,
                        self.previous_minibatch_loss_average()
                    );
                }
                sweeps += 1;
            }
        }

        Ok(TrainingSummary {
            sweeps,
            minibatches,
        })
    }
}
