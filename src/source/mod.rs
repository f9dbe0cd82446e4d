//! Minibatch sources
//!
//! A minibatch source hands out fixed-size batches of (channel tensors,
//! target tensor) pairs until it is exhausted. The concrete
//! [`CompositeSource`] reads one map file per channel plus a CTF target file;
//! the training loop only depends on the [`MinibatchSource`] trait, so tests
//! (or another backend) can substitute their own source.

mod composite;
mod ctf;
mod map_file;

pub use composite::CompositeSource;

use std::collections::HashMap;
use std::error::Error;

/// One batch of training data.
///
/// Channel tensors hold raw pixel values (0..255) of length
/// `count * height * width`; normalization is the model's job. `targets`
/// holds `count * output_size` values. `sweep_end` marks the batch that
/// completes a full pass over the data.
#[derive(Debug, Clone)]
pub struct Minibatch {
    /// Channel name to raw pixel tensor
    pub channels: HashMap<String, Vec<f32>>,

    /// Flattened target vectors, `count * output_size` values
    pub targets: Vec<f32>,

    /// Number of examples in this batch
    pub count: usize,

    /// True when this batch contains the last example of a sweep
    pub sweep_end: bool,
}

/// Produces minibatches on demand.
///
/// `Ok(None)` signals exhaustion; the training loop treats it as the
/// terminal condition. Errors are fatal, never retried.
pub trait MinibatchSource {
    fn next_minibatch(&mut self, size: usize) -> Result<Option<Minibatch>, Box<dyn Error>>;
}

pub(crate) fn invalid_data(message: String) -> Box<dyn Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}
