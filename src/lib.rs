//! Multi-channel image regression trainer
//!
//! This library trains a linear regression model on multi-channel grayscale
//! image data with minibatch SGD. Per-channel image lists come from map files
//! (one `path<TAB>label` line per example) and numeric regression targets come
//! from a CTF-style text file.
//!
//! # Modules
//!
//! - `config`: Training configuration (channels, shapes, hyperparameters)
//! - `model`: Linear model (splice channels, normalize, flatten, dense)
//! - `loss`: Mean squared error and its gradient
//! - `source`: Minibatch source built from map files and a CTF target file
//! - `optimizers`: Optimizer trait and SGD implementation
//! - `trainer`: Trainer and the sweep-tracking training loop
//! - `utils`: Shared utilities (RNG)

extern crate blas_src;

pub mod config;
pub mod loss;
pub mod model;
pub mod optimizers;
pub mod source;
pub mod trainer;
pub mod utils;
