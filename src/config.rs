//! Training configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings for [`crate::train::Trainer`].
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Input width followed by the width of each layer.
    pub layers: Vec<usize>,
    pub learning_rate: f64,
    pub max_epochs: usize,
    /// Training stops once the loss falls below this.
    pub loss_threshold: f64,
    /// Fixed seed for weight initialisation; fresh entropy when absent.
    pub seed: Option<u64>,
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            layers: vec![3, 4, 4, 1],
            learning_rate: 0.05,
            max_epochs: 1000,
            loss_threshold: 1e-4,
            seed: None,
            log_every: 100,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.layers.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "layers needs an input size and at least one layer, got {:?}",
                self.layers
            )));
        }
        if self.layers.contains(&0) {
            return Err(Error::InvalidConfig(format!(
                "layer sizes must be non-zero, got {:?}",
                self.layers
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_epochs == 0 {
            return Err(Error::InvalidConfig("max_epochs must be at least 1".into()));
        }
        if !self.loss_threshold.is_finite() || self.loss_threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "loss_threshold must be non-negative, got {}",
                self.loss_threshold
            )));
        }
        if self.log_every == 0 {
            return Err(Error::InvalidConfig("log_every must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: TrainConfig =
            serde_json::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
