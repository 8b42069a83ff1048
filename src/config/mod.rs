/// Database configuration and connection management
pub mod database;

/// Portal configuration loading from config.toml
pub mod portal;

pub use portal::{Catalog, PortalConfig, SeedConfig, load_config, load_default_config};
