//! CLI library components for role-sift.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod reporter;
pub mod summary;
pub mod types;
