//! Query strings and request bodies accepted by the endpoints.

use bota_core::{CompareAxis, CoreError, RawStatsFilter, StatsFilter, StatsOptions};
use bota_domain::ForecastHorizon;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsParams {
    #[serde(flatten)]
    pub filter: RawStatsFilter,
    pub timeline: Option<String>,
    pub debug: Option<String>,
}

impl StatsParams {
    pub fn filter(&self) -> Result<StatsFilter, CoreError> {
        StatsFilter::try_from(self.filter.clone())
    }

    pub fn options(&self) -> StatsOptions {
        StatsOptions {
            timeline: flag(self.timeline.as_deref()),
            debug: flag(self.debug.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareParams {
    pub axis: Option<String>,
    pub a: Option<String>,
    pub b: Option<String>,
    #[serde(flatten)]
    pub filter: RawStatsFilter,
}

impl CompareParams {
    /// Axis plus both values. All three are required.
    pub fn selection(&self) -> Result<(CompareAxis, &str, &str), CoreError> {
        let axis = required("axis", self.axis.as_deref())?.parse::<CompareAxis>()?;
        let a = required("a", self.a.as_deref())?;
        let b = required("b", self.b.as_deref())?;
        Ok((axis, a, b))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastParams {
    pub horizon: Option<String>,
}

impl ForecastParams {
    /// Requested horizon, `None` when the stored default applies.
    pub fn horizon(&self) -> Result<Option<ForecastHorizon>, CoreError> {
        let Some(raw) = self.horizon.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        let days = raw
            .parse::<u32>()
            .map_err(|_| CoreError::Validation(format!("horizon `{raw}` is not a number of days")))?;
        Ok(Some(ForecastHorizon::try_from(days)?))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsBody {
    #[serde(alias = "reserve_min")]
    pub reserve_min: Option<f64>,
    #[serde(alias = "default_horizon")]
    pub default_horizon: Option<u32>,
}

fn flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::InvalidFilter(format!("missing `{name}` parameter")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_truthy_values() {
        assert!(flag(Some("1")));
        assert!(flag(Some("True")));
        assert!(!flag(Some("0")));
        assert!(!flag(None));
    }

    #[test]
    fn compare_requires_every_selector() {
        let params = CompareParams {
            axis: Some("year".into()),
            a: Some("2024".into()),
            ..Default::default()
        };
        assert!(matches!(params.selection(), Err(CoreError::InvalidFilter(_))));
    }

    #[test]
    fn horizon_must_be_a_preset() {
        let params = ForecastParams {
            horizon: Some("45".into()),
        };
        assert!(params.horizon().is_err());
        let params = ForecastParams {
            horizon: Some("180".into()),
        };
        assert_eq!(params.horizon().unwrap(), Some(ForecastHorizon::Days180));
        assert_eq!(ForecastParams::default().horizon().unwrap(), None);
    }
}
