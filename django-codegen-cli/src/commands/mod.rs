//! CLI command implementations

pub mod kinds;
pub mod model;
