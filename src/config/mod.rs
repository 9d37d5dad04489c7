/// Database configuration and connection management
pub mod database;

/// Planner settings loaded from config.toml
pub mod settings;
