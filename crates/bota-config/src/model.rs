use chrono::NaiveDate;
use serde::{de::Deserializer, Deserialize, Serialize};
use std::{fmt, path::PathBuf};

use crate::ConfigError;

pub const HOME_ENV: &str = "BOTA_HOME";

/// Deployment settings shared by the shell and the HTTP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub pot: PotSettings,
    #[serde(default)]
    pub forecast: ForecastDefaults,
    #[serde(default = "Config::default_server_addr")]
    pub server_addr: String,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub color: ColorMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the record tables. Defaults to `<home>/data`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "ca-ES".into(),
            currency: "EUR".into(),
            pot: PotSettings::default(),
            forecast: ForecastDefaults::default(),
            server_addr: Self::default_server_addr(),
            session: SessionSettings::default(),
            color: ColorMode::default(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_server_addr() -> String {
        "127.0.0.1:8080".into()
    }

    /// `$BOTA_HOME`, else `~/.bota`, else `./.bota`.
    pub fn home_dir() -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bota")
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => Self::home_dir().join("data"),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.pot.base_balance.is_finite() {
            return Err(ConfigError::Invalid("pot.base_balance must be finite".into()));
        }
        if !self.forecast.reserve_min.is_finite() || self.forecast.reserve_min < 0.0 {
            return Err(ConfigError::Invalid(
                "forecast.reserve_min must be a non-negative amount".into(),
            ));
        }
        if self.session.idle_timeout_minutes == 0 {
            return Err(ConfigError::Invalid(
                "session.idle_timeout_minutes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Starting balance and cutoff for every pot computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotSettings {
    #[serde(default)]
    pub base_balance: f64,
    #[serde(default = "PotSettings::default_cutoff")]
    pub cutoff_date: Option<NaiveDate>,
}

impl PotSettings {
    pub fn default_cutoff() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 1, 1)
    }
}

impl Default for PotSettings {
    fn default() -> Self {
        Self {
            base_balance: 0.0,
            cutoff_date: Self::default_cutoff(),
        }
    }
}

/// Used until the settings table holds its own record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastDefaults {
    #[serde(default = "ForecastDefaults::default_reserve_min")]
    pub reserve_min: f64,
    #[serde(default = "ForecastDefaults::default_horizon_days")]
    pub horizon_days: u32,
}

impl ForecastDefaults {
    pub fn default_reserve_min() -> f64 {
        500.0
    }

    pub fn default_horizon_days() -> u32 {
        90
    }
}

impl Default for ForecastDefaults {
    fn default() -> Self {
        Self {
            reserve_min: Self::default_reserve_min(),
            horizon_days: Self::default_horizon_days(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "SessionSettings::default_idle_timeout")]
    pub idle_timeout_minutes: u32,
    /// Start the shell with amounts hidden.
    #[serde(default)]
    pub privacy_mask: bool,
}

impl SessionSettings {
    pub fn default_idle_timeout() -> u32 {
        30
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: Self::default_idle_timeout(),
            privacy_mask: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "always" | "on" => ColorMode::Always,
            "never" | "off" | "plain" => ColorMode::Never,
            _ => ColorMode::Auto,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColorMode::Auto => "auto",
            ColorMode::Always => "always",
            ColorMode::Never => "never",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for ColorMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|v| ColorMode::from_str(&v))
            .unwrap_or_default())
    }
}
