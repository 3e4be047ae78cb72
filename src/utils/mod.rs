// Utility functions module
pub mod config;
pub mod fonts;
pub mod formatters;
