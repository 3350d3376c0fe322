//! Planned future expenses/investments and the forecast settings record.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, error::DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ForecastKind {
    #[default]
    #[serde(alias = "despesa")]
    Expense,
    #[serde(alias = "inversio", alias = "inversió")]
    Investment,
}

impl FromStr for ForecastKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "expense" | "despesa" => Ok(ForecastKind::Expense),
            "investment" | "inversio" | "inversió" => Ok(ForecastKind::Investment),
            _ => Err(DomainError::UnknownForecastKind(value.trim().to_string())),
        }
    }
}

impl fmt::Display for ForecastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ForecastKind::Expense => "expense",
            ForecastKind::Investment => "investment",
        };
        f.write_str(label)
    }
}

/// A planned outflow counted by projections while active and inside the horizon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: ForecastKind,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default = "ForecastItem::default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ForecastItem {
    pub fn new(name: impl Into<String>, kind: ForecastKind, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            amount,
            date: None,
            is_active: true,
            notes: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    fn default_active() -> bool {
        true
    }
}

impl Identifiable for ForecastItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Dated for ForecastItem {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// Horizon presets offered by the forecast page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum ForecastHorizon {
    Days30,
    Days60,
    #[default]
    Days90,
    Days180,
    Days365,
}

impl ForecastHorizon {
    pub const ALL: [ForecastHorizon; 5] = [
        ForecastHorizon::Days30,
        ForecastHorizon::Days60,
        ForecastHorizon::Days90,
        ForecastHorizon::Days180,
        ForecastHorizon::Days365,
    ];

    pub fn days(self) -> u32 {
        match self {
            ForecastHorizon::Days30 => 30,
            ForecastHorizon::Days60 => 60,
            ForecastHorizon::Days90 => 90,
            ForecastHorizon::Days180 => 180,
            ForecastHorizon::Days365 => 365,
        }
    }
}

impl TryFrom<u32> for ForecastHorizon {
    type Error = DomainError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        ForecastHorizon::ALL
            .into_iter()
            .find(|preset| preset.days() == days)
            .ok_or(DomainError::UnsupportedHorizon(days))
    }
}

impl From<ForecastHorizon> for u32 {
    fn from(horizon: ForecastHorizon) -> Self {
        horizon.days()
    }
}

impl fmt::Display for ForecastHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dies", self.days())
    }
}

/// User-editable forecast preferences. Created with defaults on first write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastSettings {
    #[serde(default = "ForecastSettings::default_reserve_min")]
    pub reserve_min: f64,
    #[serde(default)]
    pub default_horizon: ForecastHorizon,
}

impl ForecastSettings {
    pub const DEFAULT_RESERVE_MIN: f64 = 500.0;

    pub fn default_reserve_min() -> f64 {
        Self::DEFAULT_RESERVE_MIN
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            reserve_min: Self::DEFAULT_RESERVE_MIN,
            default_horizon: ForecastHorizon::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_round_trips_through_days() {
        let parsed: ForecastHorizon = serde_json::from_str("180").unwrap();
        assert_eq!(parsed, ForecastHorizon::Days180);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "180");
        assert!(serde_json::from_str::<ForecastHorizon>("45").is_err());
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: ForecastSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ForecastSettings::default());
    }

    #[test]
    fn items_default_to_active() {
        let json = format!(
            r#"{{"id":"{}","name":"Furgoneta","amount":1200.0}}"#,
            Uuid::new_v4()
        );
        let item: ForecastItem = serde_json::from_str(&json).unwrap();
        assert!(item.is_active);
        assert_eq!(item.kind, ForecastKind::Expense);
    }
}
