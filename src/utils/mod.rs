//! Utility modules

pub mod memory_sources;
pub mod validation;

pub use memory_sources::*;
pub use validation::*;
