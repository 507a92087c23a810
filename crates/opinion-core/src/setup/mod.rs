//! World Setup
//!
//! Population seeding and friendship construction.

pub mod friends;
pub mod population;

pub use friends::*;
pub use population::*;
