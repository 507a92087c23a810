//! Opinion Diffusion Simulation Engine Library
//!
//! Mobile agents on a grid exchange opinions with their neighbours and
//! friends. How easily an agent is swayed depends on its integrity, which in
//! turn hardens or erodes with every contact.

pub mod components;
pub mod config;
pub mod environment;
pub mod output;
pub mod rng;
pub mod setup;
pub mod systems;

pub use components::*;
pub use config::{
    ConfigError, DynamicsConfig, InteractionModel, MovementModel, PopulationConfig, SimConfig,
    Tuning, WorldConfig,
};
pub use environment::{AgentSpec, AgentView, Environment};
pub use output::{OpinionDistribution, OpinionHistory, OutputError};
pub use rng::SimRng;
pub use setup::{populate, PopulationSummary};
