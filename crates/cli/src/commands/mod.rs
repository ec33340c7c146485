//! Subcommand implementations

pub mod predict;
pub mod preview;
pub mod schema;
