use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SAMPLE_COUNT: usize = 100_000;
pub const SAMPLE_FREQ_HZ: u32 = 10_000; // 10kHz sample rate
pub const BATCH_CAPACITY: usize = 64; // 64 x 4-byte results = 256 byte frame
pub const FRAMES_COUNT: usize = 32; // 8KB driver store
pub const STACK_SIZE: usize = 8192;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be non-zero")]
    Zero(&'static str),
}

/// Sampler settings - compile time defaults which can be overridden from NVS at boot
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct SamplerConfig {
    /// Samples per measurement window
    pub sample_count: usize,
    /// Requested ADC conversion rate
    pub sample_freq_hz: u32,
    /// Measurements read per poll (also the driver frame size)
    pub batch_capacity: usize,
    /// Frames held in the driver ring store
    pub frames_count: usize,
    /// Sampler thread stack
    pub stack_size: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_count: SAMPLE_COUNT,
            sample_freq_hz: SAMPLE_FREQ_HZ,
            batch_capacity: BATCH_CAPACITY,
            frames_count: FRAMES_COUNT,
            stack_size: STACK_SIZE,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::Zero("sample_count"));
        }
        if self.sample_freq_hz == 0 {
            return Err(ConfigError::Zero("sample_freq_hz"));
        }
        if self.batch_capacity == 0 {
            return Err(ConfigError::Zero("batch_capacity"));
        }
        if self.frames_count == 0 {
            return Err(ConfigError::Zero("frames_count"));
        }
        Ok(())
    }

    pub fn expected_seconds(&self) -> f64 {
        self.sample_count as f64 / self.sample_freq_hz as f64
    }

    /// Parse a JSON override, falling back to defaults for missing fields
    pub fn from_json(data: &[u8]) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }
}
