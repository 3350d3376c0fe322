//! KPIs and chart buckets over a gig collection.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use bota_domain::{month_key, GigRecord, GigStatus, IncomeType, StatusGroup};

use crate::stats_filter::StatsFilter;

const TOP_TOWNS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub confirmed: usize,
    pub rejected: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_income: f64,
    pub cash_income: f64,
    pub invoice_income: f64,
    pub total_musician_cost: f64,
    pub net_profit: f64,
    pub median_price: f64,
    pub average_price: f64,
    pub acceptance_rate: f64,
    pub confirmed_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: String,
    pub income: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TownBucket {
    pub town: String,
    pub income: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBucket {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeTypeBucket {
    pub income_type: IncomeType,
    pub income: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GigStats {
    pub counts: StatusCounts,
    pub kpis: Kpis,
    pub monthly: Vec<MonthBucket>,
    pub top_towns: Vec<TownBucket>,
    pub price_buckets: Vec<PriceBucket>,
    pub income_types: Vec<IncomeTypeBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub town: String,
    pub status: GigStatus,
    pub income: f64,
}

/// Echo of how a request was interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDebug {
    pub filter: StatsFilter,
    pub before_filter: usize,
    pub after_filter: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    #[serde(flatten)]
    pub stats: GigStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<TimelineEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<StatsDebug>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatsOptions {
    pub timeline: bool,
    pub debug: bool,
}

/// Lower bounds are inclusive: 300 lands in `300-600`, 1000 in `>1000`.
const PRICE_BUCKETS: [(&str, f64, f64); 4] = [
    ("<300", f64::NEG_INFINITY, 300.0),
    ("300-600", 300.0, 600.0),
    ("600-1000", 600.0, 1000.0),
    (">1000", 1000.0, f64::INFINITY),
];

pub struct StatsService;

impl StatsService {
    pub fn aggregate(gigs: &[GigRecord]) -> GigStats {
        let mut counts = StatusCounts {
            total: gigs.len(),
            ..StatusCounts::default()
        };
        let mut confirmed: Vec<&GigRecord> = Vec::new();
        for gig in gigs {
            match gig.status.group() {
                StatusGroup::Confirmed => {
                    counts.confirmed += 1;
                    confirmed.push(gig);
                }
                StatusGroup::Rejected => counts.rejected += 1,
                StatusGroup::Pending => counts.pending += 1,
            }
        }

        let stats = GigStats {
            counts,
            kpis: kpis(&confirmed, counts),
            monthly: monthly(&confirmed),
            top_towns: top_towns(&confirmed),
            price_buckets: price_buckets(&confirmed),
            income_types: income_types(&confirmed),
        };
        debug!(
            total = counts.total,
            confirmed = counts.confirmed,
            "aggregated gig statistics"
        );
        stats
    }

    /// Filters, aggregates and attaches the optional timeline and debug echo.
    pub fn report(gigs: &[GigRecord], filter: &StatsFilter, options: StatsOptions) -> StatsReport {
        let filtered = filter.apply(gigs);
        StatsReport {
            stats: Self::aggregate(&filtered),
            timeline: options.timeline.then(|| Self::timeline(&filtered)),
            debug: options.debug.then(|| StatsDebug {
                filter: filter.clone(),
                before_filter: gigs.len(),
                after_filter: filtered.len(),
            }),
        }
    }

    /// Date-ascending list of gigs, undated first.
    pub fn timeline(gigs: &[GigRecord]) -> Vec<TimelineEntry> {
        let mut entries: Vec<TimelineEntry> = gigs
            .iter()
            .map(|gig| TimelineEntry {
                id: gig.id,
                date: gig.date,
                town: gig.town.clone(),
                status: gig.status,
                income: gig.income_total,
            })
            .collect();
        entries.sort_by_key(|entry| entry.date);
        entries
    }
}

/// Upper-middle element of the ascending prices; 0 for an empty list.
pub fn median_price(prices: &[f64]) -> f64 {
    if prices.is_empty() {
        return 0.0;
    }
    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[sorted.len() / 2]
}

fn kpis(confirmed: &[&GigRecord], counts: StatusCounts) -> Kpis {
    let prices: Vec<f64> = confirmed.iter().map(|gig| gig.income_total).collect();
    let total_income: f64 = prices.iter().sum();
    let income_of = |kind: IncomeType| -> f64 {
        confirmed
            .iter()
            .filter(|gig| gig.income_type == kind)
            .map(|gig| gig.income_total)
            .sum()
    };

    Kpis {
        total_income,
        cash_income: income_of(IncomeType::Cash),
        invoice_income: income_of(IncomeType::Invoice),
        total_musician_cost: confirmed.iter().map(|gig| gig.musician_cost_total).sum(),
        net_profit: confirmed.iter().map(|gig| gig.pot_delta).sum(),
        median_price: median_price(&prices),
        average_price: if prices.is_empty() {
            0.0
        } else {
            total_income / prices.len() as f64
        },
        acceptance_rate: if counts.total == 0 {
            0.0
        } else {
            counts.confirmed as f64 / counts.total as f64 * 100.0
        },
        confirmed_count: counts.confirmed as f64,
    }
}

fn monthly(confirmed: &[&GigRecord]) -> Vec<MonthBucket> {
    let mut months: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for gig in confirmed {
        let Some(date) = gig.date else { continue };
        let slot = months.entry(month_key(date)).or_default();
        slot.0 += gig.income_total;
        slot.1 += 1;
    }
    months
        .into_iter()
        .map(|(month, (income, count))| MonthBucket {
            month,
            income,
            count,
        })
        .collect()
}

fn top_towns(confirmed: &[&GigRecord]) -> Vec<TownBucket> {
    let mut towns: HashMap<&str, (f64, usize)> = HashMap::new();
    for gig in confirmed {
        let slot = towns.entry(gig.town.as_str()).or_default();
        slot.0 += gig.income_total;
        slot.1 += 1;
    }
    let mut ranked: Vec<TownBucket> = towns
        .into_iter()
        .map(|(town, (income, count))| TownBucket {
            town: town.to_string(),
            income,
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.income.total_cmp(&a.income).then_with(|| a.town.cmp(&b.town)));
    ranked.truncate(TOP_TOWNS);
    ranked
}

fn price_buckets(confirmed: &[&GigRecord]) -> Vec<PriceBucket> {
    PRICE_BUCKETS
        .iter()
        .map(|&(label, low, high)| PriceBucket {
            label,
            count: confirmed
                .iter()
                .filter(|gig| gig.income_total >= low && gig.income_total < high)
                .count(),
        })
        .collect()
}

fn income_types(confirmed: &[&GigRecord]) -> Vec<IncomeTypeBucket> {
    [IncomeType::Invoice, IncomeType::Cash]
        .into_iter()
        .map(|kind| {
            let matching = confirmed.iter().filter(|gig| gig.income_type == kind);
            IncomeTypeBucket {
                income_type: kind,
                income: matching.clone().map(|gig| gig.income_total).sum(),
                count: matching.count(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed(date: Option<NaiveDate>, town: &str, income: f64, kind: IncomeType) -> GigRecord {
        GigRecord::new(date, town)
            .with_status(GigStatus::Confirmed)
            .with_income(income, kind)
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn one_gig_per_price_bucket() {
        let gigs: Vec<GigRecord> = [100.0, 300.0, 700.0, 1200.0]
            .into_iter()
            .map(|price| confirmed(day(2025, 3, 1), "Vic", price, IncomeType::Invoice))
            .collect();
        let stats = StatsService::aggregate(&gigs);
        let counts: Vec<(&str, usize)> = stats
            .price_buckets
            .iter()
            .map(|bucket| (bucket.label, bucket.count))
            .collect();
        assert_eq!(
            counts,
            vec![("<300", 1), ("300-600", 1), ("600-1000", 1), (">1000", 1)]
        );
    }

    #[test]
    fn bucket_boundaries_go_up() {
        let gigs = vec![
            confirmed(None, "Vic", 600.0, IncomeType::Cash),
            confirmed(None, "Vic", 1000.0, IncomeType::Cash),
        ];
        let stats = StatsService::aggregate(&gigs);
        assert_eq!(stats.price_buckets[2].count, 1);
        assert_eq!(stats.price_buckets[3].count, 1);
    }

    #[test]
    fn median_takes_upper_middle() {
        assert_eq!(median_price(&[]), 0.0);
        assert_eq!(median_price(&[100.0]), 100.0);
        assert_eq!(median_price(&[300.0, 100.0]), 300.0);
        assert_eq!(median_price(&[5.0, 1.0, 3.0]), 3.0);
    }

    #[test]
    fn partition_counts_add_up() {
        let statuses = [
            GigStatus::New,
            GigStatus::AwaitingConfirmation,
            GigStatus::Confirmed,
            GigStatus::AwaitingCollection,
            GigStatus::AwaitingPayment,
            GigStatus::Closed,
            GigStatus::Cancelled,
            GigStatus::Rejected,
        ];
        let gigs: Vec<GigRecord> = statuses
            .iter()
            .map(|status| GigRecord::new(None, "Olot").with_status(*status))
            .collect();
        let counts = StatsService::aggregate(&gigs).counts;
        assert_eq!(counts.confirmed + counts.rejected + counts.pending, counts.total);
        assert_eq!(counts.confirmed, 4);
        assert_eq!(counts.rejected, 2);
        assert_eq!(counts.pending, 2);
    }

    #[test]
    fn kpis_only_count_confirmed_gigs() {
        let gigs = vec![
            confirmed(day(2025, 1, 5), "Vic", 400.0, IncomeType::Cash).with_musician_cost(100.0),
            confirmed(day(2025, 2, 5), "Vic", 600.0, IncomeType::Invoice).with_musician_cost(200.0),
            GigRecord::new(day(2025, 2, 6), "Vic")
                .with_status(GigStatus::Rejected)
                .with_income(9999.0, IncomeType::Cash),
        ];
        let kpis = StatsService::aggregate(&gigs).kpis;
        assert_eq!(kpis.total_income, 1000.0);
        assert_eq!(kpis.cash_income, 400.0);
        assert_eq!(kpis.invoice_income, 600.0);
        assert_eq!(kpis.total_musician_cost, 300.0);
        assert_eq!(kpis.net_profit, 700.0);
        assert_eq!(kpis.average_price, 500.0);
        assert!((kpis.acceptance_rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_collection_yields_zeroes() {
        let stats = StatsService::aggregate(&[]);
        assert_eq!(stats.kpis, Kpis::default());
        assert!(stats.monthly.is_empty());
        assert_eq!(stats.income_types.len(), 2);
    }

    #[test]
    fn monthly_skips_undated_and_sorts_by_key() {
        let gigs = vec![
            confirmed(day(2025, 11, 2), "Vic", 100.0, IncomeType::Cash),
            confirmed(None, "Vic", 100.0, IncomeType::Cash),
            confirmed(day(2025, 2, 2), "Vic", 100.0, IncomeType::Cash),
            confirmed(day(2025, 2, 20), "Vic", 50.0, IncomeType::Cash),
        ];
        let monthly = StatsService::aggregate(&gigs).monthly;
        let keys: Vec<&str> = monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2025-02", "2025-11"]);
        assert_eq!(monthly[0].income, 150.0);
        assert_eq!(monthly[0].count, 2);
    }

    #[test]
    fn towns_rank_by_income_then_name() {
        let mut gigs = vec![
            confirmed(None, "Berga", 500.0, IncomeType::Cash),
            confirmed(None, "Alella", 500.0, IncomeType::Cash),
            confirmed(None, "Cardona", 900.0, IncomeType::Cash),
        ];
        for n in 0..10 {
            gigs.push(confirmed(None, &format!("Poble {n:02}"), 10.0, IncomeType::Cash));
        }
        let towns = StatsService::aggregate(&gigs).top_towns;
        assert_eq!(towns.len(), 10);
        assert_eq!(towns[0].town, "Cardona");
        assert_eq!(towns[1].town, "Alella");
        assert_eq!(towns[2].town, "Berga");
    }

    #[test]
    fn report_attaches_timeline_and_debug_on_request() {
        let gigs = vec![
            confirmed(day(2025, 5, 1), "Vic", 100.0, IncomeType::Cash),
            confirmed(day(2024, 5, 1), "Vic", 100.0, IncomeType::Cash),
        ];
        let filter = StatsFilter {
            years: vec![2025],
            ..Default::default()
        };
        let plain = StatsService::report(&gigs, &filter, StatsOptions::default());
        assert!(plain.timeline.is_none() && plain.debug.is_none());

        let full = StatsService::report(
            &gigs,
            &filter,
            StatsOptions {
                timeline: true,
                debug: true,
            },
        );
        assert_eq!(full.timeline.as_ref().map(Vec::len), Some(1));
        let debug = full.debug.unwrap();
        assert_eq!((debug.before_filter, debug.after_filter), (2, 1));
    }
}
