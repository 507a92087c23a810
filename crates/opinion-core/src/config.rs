//! Configuration System
//!
//! Loads simulation parameters from a TOML file. Every section has defaults,
//! so a partial file (or none at all) is valid.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::components::Neighborhood;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "opinion_sim.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the shared random stream
    pub seed: u64,
    /// Steps the CLI runs when none are given on the command line
    pub steps: u64,
    pub world: WorldConfig,
    pub population: PopulationConfig,
    pub dynamics: DynamicsConfig,
    pub tuning: Tuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 100,
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            dynamics: DynamicsConfig::default(),
            tuning: Tuning::default(),
        }
    }
}

/// Grid dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
        }
    }
}

/// Population seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub num_agents: usize,
    /// Fraction of placed agents pinned at integrity 1.0
    pub high_integrity_ratio: f64,
    /// Friends each agent adds while the social graph is built
    pub friend_cap: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            num_agents: 1000,
            high_integrity_ratio: 0.05,
            friend_cap: 8,
        }
    }
}

/// How agents pick their next cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementModel {
    /// One random axis-aligned step per tick, blocked steps are lost
    #[default]
    RandomWalk,
    /// Try the four neighbours in random order until one is free
    PersistentWalk,
    /// Follow the daily home / work-or-school / leisure routine
    Scheduled,
}

/// How two agents influence each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionModel {
    /// Coin-flip adoption, no integrity
    Plain,
    /// Integrity-weighted adoption with evolving integrity
    #[default]
    Integrity,
    /// Directed influence from persuasiveness and openness
    Persuasion,
}

/// Which rules run each tick
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub movement: MovementModel,
    pub interaction: InteractionModel,
    /// Run the friend interaction pass between movement and spatial passes
    pub social_pass: bool,
    pub neighborhood: Neighborhood,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            movement: MovementModel::RandomWalk,
            interaction: InteractionModel::Integrity,
            social_pass: true,
            neighborhood: Neighborhood::Moore,
        }
    }
}

/// Numeric constants of the interaction and movement rules
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Base integrity update strength
    pub integrity_strength: f64,
    /// Probability that an interaction is positive
    pub positive_probability: f64,
    /// Multiplier applied to every effect of a friend interaction
    pub friend_dampening: f64,
    /// Scale of the integrity-weighted adoption probability
    pub adoption_scale: f64,
    /// Adoption probability of the plain model
    pub plain_adoption: f64,
    /// Largest spatial reach of a full-integrity agent
    pub max_radius: u32,
    /// Spatial reach for agents without integrity
    pub fixed_radius: u32,
    /// Upper bound on friends sampled per agent per tick
    pub max_sampled_friends: usize,
    pub initial_integrity_min: f64,
    pub initial_integrity_max: f64,
    pub influence_min: f64,
    pub influence_max: f64,
    pub openness_min: f64,
    pub openness_max: f64,
    /// Probability that a scheduled agent is a student
    pub student_probability: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            integrity_strength: 0.1,
            positive_probability: 0.7,
            friend_dampening: 1.0 / 16.0,
            adoption_scale: 0.5,
            plain_adoption: 0.5,
            max_radius: 3,
            fixed_radius: 1,
            max_sampled_friends: 3,
            initial_integrity_min: 0.3,
            initial_integrity_max: 0.7,
            influence_min: 0.5,
            influence_max: 1.0,
            openness_min: 0.1,
            openness_max: 0.9,
            student_probability: 0.5,
        }
    }
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load from the default path, falling back to defaults if absent.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.width < 1 || self.world.height < 1 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must be within [0, 1], got {}", name, v)))
            }
        };
        unit("population.high_integrity_ratio", self.population.high_integrity_ratio)?;

        let t = &self.tuning;
        unit("tuning.integrity_strength", t.integrity_strength)?;
        unit("tuning.positive_probability", t.positive_probability)?;
        unit("tuning.friend_dampening", t.friend_dampening)?;
        unit("tuning.adoption_scale", t.adoption_scale)?;
        unit("tuning.plain_adoption", t.plain_adoption)?;
        unit("tuning.student_probability", t.student_probability)?;
        for (name, lo, hi) in [
            ("initial_integrity", t.initial_integrity_min, t.initial_integrity_max),
            ("influence", t.influence_min, t.influence_max),
            ("openness", t.openness_min, t.openness_max),
        ] {
            unit(name, lo)?;
            unit(name, hi)?;
            if lo > hi {
                return Err(ConfigError::Invalid(format!(
                    "tuning.{}_min ({}) exceeds tuning.{}_max ({})",
                    name, lo, name, hi
                )));
            }
        }
        if t.max_sampled_friends == 0 {
            return Err(ConfigError::Invalid(
                "tuning.max_sampled_friends must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
