//! bota-config
//!
//! Deployment settings for the booking dashboard: pot policy, forecast defaults,
//! server address and shell session behaviour, plus disk persistence with backups.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{ColorMode, Config, ForecastDefaults, PotSettings, SessionSettings, HOME_ENV};
