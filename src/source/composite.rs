//! Composite minibatch source
//!
//! Composes one map-file image deserializer per channel with one CTF target
//! deserializer into a single source that yields aligned minibatches. All
//! data is loaded eagerly at construction; every alignment problem (channel
//! example counts, target count, empty dataset) is fatal there rather than
//! surfacing mid-training.

use crate::config::TrainingConfig;
use crate::source::{ctf, invalid_data, map_file, Minibatch, MinibatchSource};
use std::collections::HashMap;
use std::error::Error;

/// Name of the CTF stream holding the regression targets.
pub const TARGETS_STREAM_NAME: &str = "targets";

/// Minibatch source backed by per-channel map files and a CTF target file.
///
/// Examples are delivered in file order with a fixed batch size; the final
/// batch of a sweep may be short. The batch containing the last example
/// carries `sweep_end = true` and the cursor wraps, so with an unset sweep
/// limit the source never exhausts (the original program's configuration).
pub struct CompositeSource {
    channel_names: Vec<String>,
    channel_pixels: Vec<Vec<f32>>,
    plane: usize,
    targets: Vec<f32>,
    output_size: usize,
    example_count: usize,
    position: usize,
    sweeps_completed: u32,
    max_sweeps: Option<u32>,
}

impl CompositeSource {
    /// Build a source from named map files plus a CTF target file.
    ///
    /// `channels` pairs each channel name with its map-file path. Fails if
    /// any file is missing or malformed, if the channels disagree on example
    /// count, if the target count differs, or if the dataset is empty.
    pub fn new(
        channels: &[(String, String)],
        target_file: &str,
        height: usize,
        width: usize,
        output_size: usize,
        max_sweeps: Option<u32>,
    ) -> Result<Self, Box<dyn Error>> {
        if channels.is_empty() {
            return Err(invalid_data(
                "minibatch source needs at least one channel".to_string(),
            ));
        }

        let mut channel_names = Vec::with_capacity(channels.len());
        let mut channel_pixels = Vec::with_capacity(channels.len());
        let mut example_count = None;

        for (name, map_path) in channels {
            let (pixels, examples) = map_file::load_channel_images(map_path, height, width)?;
            match example_count {
                None => example_count = Some(examples),
                Some(expected) if expected != examples => {
                    return Err(invalid_data(format!(
                        "channel '{}' lists {} examples, other channels list {}",
                        name, examples, expected
                    )));
                }
                Some(_) => {}
            }
            channel_names.push(name.clone());
            channel_pixels.push(pixels);
        }

        let example_count = example_count.unwrap_or(0);
        if example_count == 0 {
            return Err(invalid_data("minibatch source holds no examples".to_string()));
        }

        let (targets, target_count) =
            ctf::load_targets(target_file, TARGETS_STREAM_NAME, output_size)?;
        if target_count != example_count {
            return Err(invalid_data(format!(
                "target file {} lists {} examples, channels list {}",
                target_file, target_count, example_count
            )));
        }

        Ok(Self {
            channel_names,
            channel_pixels,
            plane: height * width,
            targets,
            output_size,
            example_count,
            position: 0,
            sweeps_completed: 0,
            max_sweeps,
        })
    }

    /// Build a source straight from a validated [`TrainingConfig`].
    pub fn from_config(config: &TrainingConfig) -> Result<Self, Box<dyn Error>> {
        let channels: Vec<(String, String)> = config
            .channels
            .iter()
            .map(|channel| (channel.name.clone(), channel.map_file.clone()))
            .collect();
        Self::new(
            &channels,
            &config.target_file,
            config.channel_height,
            config.channel_width,
            config.output_size,
            config.max_sweeps,
        )
    }

    /// Total number of examples per sweep.
    pub fn example_count(&self) -> usize {
        self.example_count
    }

    /// Number of full passes completed so far.
    pub fn sweeps_completed(&self) -> u32 {
        self.sweeps_completed
    }
}

impl MinibatchSource for CompositeSource {
    fn next_minibatch(&mut self, size: usize) -> Result<Option<Minibatch>, Box<dyn Error>> {
        if size == 0 {
            return Err(invalid_data("minibatch size must be positive".to_string()));
        }
        if let Some(max_sweeps) = self.max_sweeps {
            if self.sweeps_completed >= max_sweeps {
                return Ok(None);
            }
        }

        let remaining = self.example_count - self.position;
        let count = size.min(remaining);
        let start = self.position;

        let mut channels = HashMap::with_capacity(self.channel_names.len());
        for (name, pixels) in self.channel_names.iter().zip(&self.channel_pixels) {
            let slice = &pixels[start * self.plane..(start + count) * self.plane];
            channels.insert(name.clone(), slice.to_vec());
        }
        let targets =
            self.targets[start * self.output_size..(start + count) * self.output_size].to_vec();

        self.position += count;
        let sweep_end = self.position == self.example_count;
        if sweep_end {
            self.position = 0;
            self.sweeps_completed += 1;
        }

        Ok(Some(Minibatch {
            channels,
            targets,
            count,
            sweep_end,
        }))
    }
}
