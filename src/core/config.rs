//! Harvester bot configuration with documented defaults
//!
//! Fixed when the bot is created. Loaded from TOML the same way AI
//! personalities are, with every field optional.

use std::fs;
use std::path::Path;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{BotError, Result};

/// Configuration for one harvester bot instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvesterBotConfig {
    // === UNIT TYPES ===
    /// Mobile unit types that can deploy into a processing structure
    ///
    /// The first type the production queue can build is the one requested
    /// when deployed structures run low.
    pub deployable_types: Vec<String>,

    /// Terrain types a harvester is allowed to deploy on
    pub eligible_terrain: AHashSet<String>,

    /// Structure types counted as deployed (processing) structures
    pub deployed_types: AHashSet<String>,

    /// Below this many deployed structures a replacement harvester is requested
    pub minimum_deployed: usize,

    // === SCHEDULING ===
    /// Ticks between evaluation passes
    ///
    /// Also the exclusive upper bound of the random initial countdown.
    pub scan_delay: u32,

    /// Ticks to wait after a patch search fails. Must be >= `scan_delay`.
    pub failure_delay: u32,

    // === SAFETY ===
    /// Radius (world units, one cell = 1.0) within which hostile units
    /// penalise a candidate cell
    pub avoidance_radius: f32,

    // === PRODUCTION ===
    /// Name of the production queue that builds harvesters
    pub production_queue: String,
}

impl Default for HarvesterBotConfig {
    fn default() -> Self {
        Self {
            deployable_types: vec!["mcv".to_string()],
            eligible_terrain: ["resources".to_string()].into_iter().collect(),
            deployed_types: ["refinery".to_string()].into_iter().collect(),
            minimum_deployed: 1,

            // ~2s at 25 ticks/s, backoff ~40s
            scan_delay: 45,
            failure_delay: 1000,

            avoidance_radius: 3.0,

            production_queue: "vehicle".to_string(),
        }
    }
}

impl HarvesterBotConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: HarvesterBotConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Is this unit type one of the deployable harvester types?
    pub fn is_deployable(&self, unit_type: &str) -> bool {
        self.deployable_types.iter().any(|t| t == unit_type)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.deployable_types.is_empty() {
            return Err(BotError::InvalidConfig(
                "deployable_types must not be empty".into(),
            ));
        }

        if self.eligible_terrain.is_empty() {
            return Err(BotError::InvalidConfig(
                "eligible_terrain must not be empty".into(),
            ));
        }

        if self.deployed_types.is_empty() {
            return Err(BotError::InvalidConfig(
                "deployed_types must not be empty".into(),
            ));
        }

        if self.scan_delay == 0 {
            return Err(BotError::InvalidConfig("scan_delay must be positive".into()));
        }

        if self.failure_delay < self.scan_delay {
            return Err(BotError::InvalidConfig(format!(
                "failure_delay ({}) should be >= scan_delay ({})",
                self.failure_delay, self.scan_delay
            )));
        }

        if !self.avoidance_radius.is_finite() || self.avoidance_radius < 0.0 {
            return Err(BotError::InvalidConfig(format!(
                "avoidance_radius ({}) must be a non-negative number",
                self.avoidance_radius
            )));
        }

        if self.production_queue.is_empty() {
            return Err(BotError::InvalidConfig(
                "production_queue must not be empty".into(),
            ));
        }

        Ok(())
    }
}
