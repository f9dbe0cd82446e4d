//! Configuration structures for training
//!
//! This module provides the configuration consumed by the training entry
//! point: which channels to read, where the target file lives, the channel
//! image shape, and the SGD hyperparameters.

use serde::Deserialize;
use std::error::Error;
use std::fs;

/// One input channel: a name and the map file listing its images.
///
/// The name doubles as the identifier a minibatch binds the channel's tensor
/// data to, so it must be unique within a configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Channel name, e.g. "Channel1"
    pub name: String,

    /// Path to the channel's map file (one `image-path<TAB>label` line per example)
    pub map_file: String,
}

/// Full configuration for a training run.
///
/// Parsed from JSON. Every channel shares the same spatial shape
/// (`channel_height` × `channel_width`, depth 1); the spliced model input is
/// `channel_height` × `channel_width` × number of channels.
///
/// # Example
///
/// ```json
/// {
///   "channels": [
///     { "name": "Channel1", "map_file": "mapfiles/TrainChannel1.map" }
///   ],
///   "target_file": "mapfiles/TrainTargets.ctf",
///   "channel_height": 28,
///   "channel_width": 28,
///   "output_size": 3,
///   "minibatch_size": 32,
///   "max_sweeps": null,
///   "learning_rate": 0.001,
///   "log_interval_sweeps": 100
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Input channels, in binding order
    pub channels: Vec<ChannelConfig>,

    /// Path to the CTF file holding the regression targets
    pub target_file: String,

    /// Image height of every channel
    pub channel_height: usize,

    /// Image width of every channel
    pub channel_width: usize,

    /// Width of the target vector and of the model output
    pub output_size: usize,

    /// Number of examples requested per minibatch
    pub minibatch_size: usize,

    /// Number of full passes over the data before the source reports
    /// exhaustion; `None` trains until the process is stopped
    pub max_sweeps: Option<u32>,

    /// SGD learning rate
    pub learning_rate: f32,

    /// Log the running loss every this many completed sweeps
    #[serde(default = "default_log_interval")]
    pub log_interval_sweeps: u32,
}

fn default_log_interval() -> u32 {
    100
}

impl TrainingConfig {
    /// Number of features the model sees after splicing and flattening.
    pub fn feature_count(&self) -> usize {
        self.channel_height * self.channel_width * self.channels.len()
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it, and validates it.
///
/// # Returns
///
/// `Ok(TrainingConfig)` on success, or an error if the file cannot be read,
/// the JSON is invalid, or the configuration fails validation.
pub fn load_config(path: &str) -> Result<TrainingConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

fn invalid(message: String) -> Box<dyn Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}

/// Validates a configuration, whether parsed from JSON or built in code.
pub fn validate_config(config: &TrainingConfig) -> Result<(), Box<dyn Error>> {
    if config.channels.is_empty() {
        return Err(invalid("at least one channel is required".to_string()));
    }

    for (i, channel) in config.channels.iter().enumerate() {
        if channel.name.is_empty() {
            return Err(invalid(format!("channel {} has an empty name", i)));
        }
        if channel.map_file.is_empty() {
            return Err(invalid(format!(
                "channel '{}' has an empty map_file path",
                channel.name
            )));
        }
    }

    for (i, channel) in config.channels.iter().enumerate() {
        let duplicate = config.channels[..i]
            .iter()
            .any(|earlier| earlier.name == channel.name);
        if duplicate {
            return Err(invalid(format!(
                "duplicate channel name '{}'",
                channel.name
            )));
        }
    }

    if config.target_file.is_empty() {
        return Err(invalid("target_file path must not be empty".to_string()));
    }

    if config.channel_height == 0 || config.channel_width == 0 {
        return Err(invalid(format!(
            "channel shape {}x{} must be non-zero",
            config.channel_height, config.channel_width
        )));
    }

    if config.output_size == 0 {
        return Err(invalid("output_size must be positive".to_string()));
    }

    if config.minibatch_size == 0 {
        return Err(invalid("minibatch_size must be positive".to_string()));
    }

    if let Some(max_sweeps) = config.max_sweeps {
        if max_sweeps == 0 {
            return Err(invalid(
                "max_sweeps must be positive when set".to_string(),
            ));
        }
    }

    if !(config.learning_rate > 0.0) {
        return Err(invalid("learning_rate must be positive".to_string()));
    }

    if config.log_interval_sweeps == 0 {
        return Err(invalid(
            "log_interval_sweeps must be positive".to_string(),
        ));
    }

    Ok(())
}
