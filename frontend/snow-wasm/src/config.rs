//! Snowfall configuration

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnowConfig {
    pub particle_count: usize,
    pub max_accumulation: f32,
    pub segment_width: f32,
    pub turbulence_radius: f32,
    pub seed: u64,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            max_accumulation: DEFAULT_MAX_ACCUMULATION,
            segment_width: DEFAULT_SEGMENT_WIDTH,
            turbulence_radius: DEFAULT_TURBULENCE_RADIUS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SnowConfig {
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn from_json(value: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(value)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.particle_count == 0 {
            return Err(EngineError::EmptyParticleStore);
        }
        Ok(())
    }
}
