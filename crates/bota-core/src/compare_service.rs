//! Side-by-side statistics for two subsets picked along one axis.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::debug;

use bota_domain::GigRecord;

use crate::{
    stats_filter::{CompareAxis, StatsFilter},
    stats_service::{GigStats, Kpis, StatsService},
    CoreError,
};

/// Change from subset `a` to subset `b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiDelta {
    pub diff: f64,
    /// Percentage change relative to `a`. Infinite when `a` is zero and `b` is not.
    #[serde(serialize_with = "serialize_pct")]
    pub pct: f64,
}

impl KpiDelta {
    pub fn between(a: f64, b: f64) -> KpiDelta {
        let diff = b - a;
        let pct = if a == 0.0 {
            if b > 0.0 {
                f64::INFINITY
            } else if b < 0.0 {
                f64::NEG_INFINITY
            } else {
                0.0
            }
        } else {
            diff / a * 100.0
        };
        KpiDelta { diff, pct }
    }
}

/// JSON has no infinity, so those are written as `"Infinity"` / `"-Infinity"`.
fn serialize_pct<S: Serializer>(pct: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if pct.is_infinite() {
        let label = if pct.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        };
        serializer.serialize_str(label)
    } else {
        serializer.serialize_f64(*pct)
    }
}

/// KPIs compared between subsets, in output order.
fn compared_kpis(k: &Kpis) -> [(&'static str, f64); 9] {
    [
        ("totalIncome", k.total_income),
        ("cashIncome", k.cash_income),
        ("invoiceIncome", k.invoice_income),
        ("totalMusicianCost", k.total_musician_cost),
        ("netProfit", k.net_profit),
        ("medianPrice", k.median_price),
        ("averagePrice", k.average_price),
        ("acceptanceRate", k.acceptance_rate),
        ("confirmedCount", k.confirmed_count),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSide {
    pub label: String,
    pub stats: GigStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub axis: CompareAxis,
    pub a: ComparisonSide,
    pub b: ComparisonSide,
    pub deltas: BTreeMap<&'static str, KpiDelta>,
}

pub struct CompareService;

impl CompareService {
    pub fn compare(
        gigs: &[GigRecord],
        base: &StatsFilter,
        axis: CompareAxis,
        a: &str,
        b: &str,
    ) -> Result<ComparisonReport, CoreError> {
        let side = |value: &str| -> Result<ComparisonSide, CoreError> {
            let filter = base.with_axis(axis, value)?;
            Ok(ComparisonSide {
                label: value.trim().to_string(),
                stats: StatsService::aggregate(&filter.apply(gigs)),
            })
        };
        let a = side(a)?;
        let b = side(b)?;
        let deltas = Self::deltas(&a.stats.kpis, &b.stats.kpis);
        debug!(%axis, a = %a.label, b = %b.label, "compared gig subsets");
        Ok(ComparisonReport { axis, a, b, deltas })
    }

    pub fn deltas(a: &Kpis, b: &Kpis) -> BTreeMap<&'static str, KpiDelta> {
        compared_kpis(a)
            .into_iter()
            .zip(compared_kpis(b))
            .map(|((name, a), (_, b))| (name, KpiDelta::between(a, b)))
            .collect()
    }
}
