//! Filters applied to the gig list before statistics are aggregated.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use bota_domain::{GigRecord, IncomeType, StatusGroup};

use crate::CoreError;

/// Filter parameters exactly as they arrive from a query string or the shell.
///
/// Lists are comma separated; empty values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatsFilter {
    pub years: Option<String>,
    pub towns: Option<String>,
    pub types: Option<String>,
    pub payment_type: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl RawStatsFilter {
    /// Builds the raw filter from `key=value` pairs, accepting both camel and snake case keys.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut raw = RawStatsFilter::default();
        for pair in pairs {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| CoreError::InvalidFilter(format!("expected key=value, got `{pair}`")))?;
            let slot = match key.trim() {
                "years" | "year" => &mut raw.years,
                "towns" | "town" => &mut raw.towns,
                "types" | "type" => &mut raw.types,
                "paymentType" | "payment_type" | "payment" => &mut raw.payment_type,
                "status" => &mut raw.status,
                "minPrice" | "min_price" => &mut raw.min_price,
                "maxPrice" | "max_price" => &mut raw.max_price,
                other => {
                    return Err(CoreError::InvalidFilter(format!("unknown filter `{other}`")))
                }
            };
            *slot = Some(value.to_string());
        }
        Ok(raw)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsFilter {
    pub years: Vec<i32>,
    pub towns: Vec<String>,
    pub types: Vec<String>,
    pub payment_type: Option<IncomeType>,
    pub status: Option<StatusGroup>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl TryFrom<RawStatsFilter> for StatsFilter {
    type Error = CoreError;

    fn try_from(raw: RawStatsFilter) -> Result<Self, Self::Error> {
        let years = split_list(raw.years.as_deref())
            .map(|value| parse_number::<i32>("years", value))
            .collect::<Result<Vec<_>, _>>()?;
        let payment_type = non_blank(raw.payment_type.as_deref())
            .map(|value| {
                value
                    .parse::<IncomeType>()
                    .map_err(|err| CoreError::InvalidFilter(err.to_string()))
            })
            .transpose()?;
        let status = non_blank(raw.status.as_deref())
            .map(|value| {
                StatusGroup::parse(value)
                    .ok_or_else(|| CoreError::InvalidFilter(format!("unknown status group `{value}`")))
            })
            .transpose()?;

        Ok(StatsFilter {
            years,
            towns: split_list(raw.towns.as_deref()).map(str::to_string).collect(),
            types: split_list(raw.types.as_deref()).map(str::to_string).collect(),
            payment_type,
            status,
            min_price: non_blank(raw.min_price.as_deref())
                .map(|value| parse_number::<f64>("minPrice", value))
                .transpose()?,
            max_price: non_blank(raw.max_price.as_deref())
                .map(|value| parse_number::<f64>("maxPrice", value))
                .transpose()?,
        })
    }
}

impl StatsFilter {
    pub fn is_empty(&self) -> bool {
        *self == StatsFilter::default()
    }

    pub fn matches(&self, gig: &GigRecord) -> bool {
        if !self.years.is_empty() {
            match gig.date {
                Some(date) if self.years.contains(&date.year()) => {}
                _ => return false,
            }
        }
        if !self.towns.is_empty() && !contains_folded(&self.towns, &gig.town) {
            return false;
        }
        if !self.types.is_empty() {
            match gig.gig_type.as_deref() {
                Some(kind) if contains_folded(&self.types, kind) => {}
                _ => return false,
            }
        }
        if self.payment_type.is_some_and(|kind| kind != gig.income_type) {
            return false;
        }
        if self.status.is_some_and(|group| group != gig.status.group()) {
            return false;
        }
        if self.min_price.is_some_and(|min| gig.income_total < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| gig.income_total > max) {
            return false;
        }
        true
    }

    pub fn apply(&self, gigs: &[GigRecord]) -> Vec<GigRecord> {
        gigs.iter().filter(|gig| self.matches(gig)).cloned().collect()
    }

    /// Narrows this filter to a single value on `axis`, replacing whatever that axis held.
    pub fn with_axis(&self, axis: CompareAxis, value: &str) -> Result<StatsFilter, CoreError> {
        let mut narrowed = self.clone();
        let value = value.trim();
        if value.is_empty() {
            return Err(CoreError::InvalidFilter(format!("empty {axis} value")));
        }
        match axis {
            CompareAxis::Year => narrowed.years = vec![parse_number::<i32>("year", value)?],
            CompareAxis::Town => narrowed.towns = vec![value.to_string()],
            CompareAxis::Type => narrowed.types = vec![value.to_string()],
            CompareAxis::Payment => {
                narrowed.payment_type = Some(
                    value
                        .parse::<IncomeType>()
                        .map_err(|err| CoreError::InvalidFilter(err.to_string()))?,
                )
            }
        }
        Ok(narrowed)
    }
}

/// Dimension along which two subsets are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareAxis {
    Year,
    Town,
    Type,
    Payment,
}

impl FromStr for CompareAxis {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "year" | "any" => Ok(CompareAxis::Year),
            "town" | "poblacio" => Ok(CompareAxis::Town),
            "type" | "tipus" => Ok(CompareAxis::Type),
            "payment" | "paymenttype" | "pagament" => Ok(CompareAxis::Payment),
            other => Err(CoreError::InvalidFilter(format!("unknown compare axis `{other}`"))),
        }
    }
}

impl fmt::Display for CompareAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CompareAxis::Year => "year",
            CompareAxis::Town => "town",
            CompareAxis::Type => "type",
            CompareAxis::Payment => "payment",
        };
        f.write_str(label)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> Result<T, CoreError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| CoreError::InvalidFilter(format!("{field}: `{value}` is not a number")))
}

fn contains_folded(candidates: &[String], value: &str) -> bool {
    let value = fold(value);
    candidates.iter().any(|candidate| fold(candidate) == value)
}

fn fold(value: &str) -> String {
    bota_domain::normalize_town(value).to_lowercase()
}
