//! ECS Components
//!
//! Agent components plus the grid, structure layout and social graph resources.

pub mod agent;
pub mod grid;
pub mod population;
pub mod social;
pub mod structure;

pub use agent::*;
pub use grid::*;
pub use population::*;
pub use social::*;
pub use structure::*;
