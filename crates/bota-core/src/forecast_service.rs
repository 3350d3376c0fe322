//! Projects the pot balance forward to a horizon.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use bota_domain::{ForecastItem, ForecastKind, GigRecord};

use crate::{
    ledger_service::{LedgerService, PotPolicy},
    snapshot::Snapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Red,
    Yellow,
    Green,
}

impl TrafficLight {
    pub fn classify(projected: f64, reserve_min: f64) -> TrafficLight {
        if projected < 0.0 {
            TrafficLight::Red
        } else if projected < reserve_min {
            TrafficLight::Yellow
        } else {
            TrafficLight::Green
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedGig {
    pub gig_id: Uuid,
    pub date: Option<NaiveDate>,
    pub town: String,
    pub margin: f64,
    /// `false` for gigs beyond the horizon or undated; still listed, dimmed.
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedItem {
    pub item_id: Uuid,
    pub name: String,
    pub kind: ForecastKind,
    pub date: Option<NaiveDate>,
    pub amount: f64,
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastProjection {
    pub today: NaiveDate,
    pub horizon_days: u32,
    pub horizon_date: NaiveDate,
    pub current_pot: f64,
    pub gigs: Vec<ProjectedGig>,
    pub items: Vec<ProjectedItem>,
    pub gig_margin_total: f64,
    pub expense_total: f64,
    pub investment_total: f64,
    pub projected: f64,
    pub reserve_min: f64,
    pub light: TrafficLight,
}

pub struct ForecastService;

impl ForecastService {
    /// Confirmed gigs whose income or musician payment is still outstanding.
    pub fn open_gigs(gigs: &[GigRecord]) -> Vec<&GigRecord> {
        gigs.iter()
            .filter(|gig| gig.status.is_confirmed() && !gig.is_closed())
            .collect()
    }

    /// `projected = current_pot + Σ gig margins − Σ expenses − Σ investments`, counting
    /// only dated records strictly before `today + horizon_days` and undated active items.
    pub fn project(
        current_pot: f64,
        open_gigs: &[&GigRecord],
        items: &[ForecastItem],
        horizon_days: u32,
        reserve_min: f64,
        today: NaiveDate,
    ) -> ForecastProjection {
        let horizon_date = today + Duration::days(i64::from(horizon_days));
        let before_horizon = |date: NaiveDate| date < horizon_date;

        let gigs: Vec<ProjectedGig> = open_gigs
            .iter()
            .map(|gig| ProjectedGig {
                gig_id: gig.id,
                date: gig.date,
                town: gig.town.clone(),
                margin: gig.margin(),
                included: gig.date.is_some_and(before_horizon),
            })
            .collect();

        let items: Vec<ProjectedItem> = items
            .iter()
            .map(|item| ProjectedItem {
                item_id: item.id,
                name: item.name.clone(),
                kind: item.kind,
                date: item.date,
                amount: item.amount,
                included: item.is_active && item.date.map_or(true, before_horizon),
            })
            .collect();

        let gig_margin_total: f64 = gigs.iter().filter(|g| g.included).map(|g| g.margin).sum();
        let kind_total = |kind: ForecastKind| -> f64 {
            items
                .iter()
                .filter(|item| item.included && item.kind == kind)
                .map(|item| item.amount)
                .sum()
        };
        let expense_total = kind_total(ForecastKind::Expense);
        let investment_total = kind_total(ForecastKind::Investment);

        let projected = current_pot + gig_margin_total - expense_total - investment_total;
        let light = TrafficLight::classify(projected, reserve_min);
        debug!(horizon_days, projected, ?light, "projected pot balance");

        ForecastProjection {
            today,
            horizon_days,
            horizon_date,
            current_pot,
            gigs,
            items,
            gig_margin_total,
            expense_total,
            investment_total,
            projected,
            reserve_min,
            light,
        }
    }

    /// Full forecast page: realized pot from the ledger plus the projection.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        policy: PotPolicy,
        horizon_days: u32,
        today: NaiveDate,
    ) -> ForecastProjection {
        let pot = LedgerService::compute_ledger(
            &snapshot.movements,
            &snapshot.gigs,
            &snapshot.advances,
            policy,
        );
        let open = Self::open_gigs(&snapshot.gigs);
        Self::project(
            pot.pot_real,
            &open,
            &snapshot.forecast_items,
            horizon_days,
            snapshot.settings.reserve_min,
            today,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bota_domain::{GigStatus, IncomeType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn open_gig(days_ahead: i64, income: f64, cost: f64) -> GigRecord {
        GigRecord::new(Some(today() + Duration::days(days_ahead)), "Sitges")
            .with_status(GigStatus::Confirmed)
            .with_income(income, IncomeType::Invoice)
            .with_musician_cost(cost)
    }

    #[test]
    fn sums_margins_and_items_inside_horizon() {
        let near = open_gig(10, 800.0, 500.0);
        let far = open_gig(120, 2000.0, 1000.0);
        let items = vec![
            ForecastItem::new("Assaig", ForecastKind::Expense, 100.0)
                .with_date(today() + Duration::days(20)),
            ForecastItem::new("Bombo nou", ForecastKind::Investment, 250.0),
            ForecastItem::new("Viatge", ForecastKind::Expense, 900.0)
                .with_date(today() + Duration::days(200)),
        ];

        let projection =
            ForecastService::project(1000.0, &[&near, &far], &items, 90, 500.0, today());

        assert_eq!(projection.gig_margin_total, 300.0);
        assert_eq!(projection.expense_total, 100.0);
        assert_eq!(projection.investment_total, 250.0);
        assert_eq!(projection.projected, 950.0);
        assert_eq!(projection.light, TrafficLight::Green);
        assert_eq!(projection.gigs.len(), 2);
        assert!(!projection.gigs[1].included);
    }

    #[test]
    fn inactive_items_never_count() {
        let mut item = ForecastItem::new("Samarretes", ForecastKind::Expense, 300.0);
        item.is_active = false;
        let projection = ForecastService::project(100.0, &[], &[item], 365, 50.0, today());
        assert_eq!(projection.projected, 100.0);
    }

    #[test]
    fn zero_horizon_keeps_only_undated_and_past_items() {
        let gig_today = open_gig(0, 500.0, 0.0);
        let items = vec![
            ForecastItem::new("Avui", ForecastKind::Expense, 10.0).with_date(today()),
            ForecastItem::new("Demà", ForecastKind::Expense, 20.0)
                .with_date(today() + Duration::days(1)),
            ForecastItem::new("Sense data", ForecastKind::Expense, 40.0),
        ];
        let projection = ForecastService::project(0.0, &[&gig_today], &items, 0, 0.0, today());

        assert_eq!(projection.gig_margin_total, 0.0);
        assert_eq!(projection.expense_total, 40.0);
        let included: Vec<&str> = projection
            .items
            .iter()
            .filter(|item| item.included)
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(included, vec!["Sense data"]);
    }

    #[test]
    fn traffic_light_thresholds() {
        assert_eq!(TrafficLight::classify(-0.01, 500.0), TrafficLight::Red);
        assert_eq!(TrafficLight::classify(0.0, 500.0), TrafficLight::Yellow);
        assert_eq!(TrafficLight::classify(499.99, 500.0), TrafficLight::Yellow);
        assert_eq!(TrafficLight::classify(500.0, 500.0), TrafficLight::Green);
    }

    #[test]
    fn open_gigs_skip_closed_and_pending() {
        let mut closed = open_gig(5, 100.0, 0.0);
        closed.collected = true;
        closed.musicians_paid = true;
        let pending = open_gig(5, 100.0, 0.0).with_status(GigStatus::New);
        let open = open_gig(5, 100.0, 0.0);
        let gigs = vec![closed, pending, open.clone()];

        let result = ForecastService::open_gigs(&gigs);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, open.id);
    }
}
