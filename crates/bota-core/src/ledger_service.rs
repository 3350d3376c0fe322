//! Pot (cash-box) reconciliation: point-in-time totals and the running ledger.
//!
//! `pot_real = base + Σ movements + Σ pot_delta(closed gigs) − Σ advances(open gigs)`,
//! with movements and gigs restricted to the policy cutoff. Every page that shows a pot
//! balance goes through [`LedgerService::compute_ledger`] with the same [`PotPolicy`].

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use bota_domain::{AdvancePayment, Dated, GigRecord, LedgerMovement};

/// Base balance and cutoff date shared by every pot computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PotPolicy {
    pub base_balance: f64,
    /// Movements and gigs dated before this day are excluded. `None` keeps everything.
    pub cutoff: Option<NaiveDate>,
}

impl PotPolicy {
    pub fn new(base_balance: f64, cutoff: Option<NaiveDate>) -> Self {
        Self {
            base_balance,
            cutoff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEntrySource {
    Manual {
        movement_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
    Gig {
        gig_id: Uuid,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub source: LedgerEntrySource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerReport {
    pub policy: PotPolicy,
    /// Ascending by date, undated entries first.
    pub entries: Vec<LedgerEntry>,
    pub manual_total: f64,
    pub closed_gig_total: f64,
    pub outstanding_advances: f64,
    pub pot_real: f64,
    /// Optimistic figure counting collected gigs even when musicians are unpaid.
    pub diners_disposicio: f64,
}

impl LedgerReport {
    /// Newest first, for display.
    pub fn display_entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().rev()
    }

    /// Balance after the last entry, equal to base plus every included amount.
    pub fn closing_balance(&self) -> f64 {
        self.entries
            .last()
            .map(|entry| entry.balance_after)
            .unwrap_or(self.policy.base_balance)
    }
}

pub struct LedgerService;

impl LedgerService {
    pub fn compute_ledger(
        movements: &[LedgerMovement],
        gigs: &[GigRecord],
        advances: &[AdvancePayment],
        policy: PotPolicy,
    ) -> LedgerReport {
        let included_movements: Vec<&LedgerMovement> = movements
            .iter()
            .filter(|movement| movement.on_or_after(policy.cutoff))
            .collect();
        let included_gigs: Vec<&GigRecord> = gigs
            .iter()
            .filter(|gig| gig.on_or_after(policy.cutoff))
            .collect();

        let manual_total: f64 = included_movements.iter().map(|m| m.amount).sum();
        let closed_gig_total: f64 = included_gigs
            .iter()
            .filter(|gig| gig.is_closed())
            .map(|gig| gig.pot_delta)
            .sum();
        let collected_gig_total: f64 = included_gigs
            .iter()
            .filter(|gig| gig.collected)
            .map(|gig| gig.pot_delta)
            .sum();

        let by_id: HashMap<Uuid, &GigRecord> = gigs.iter().map(|gig| (gig.id, gig)).collect();
        let outstanding_advances =
            sum_advances(advances, &by_id, |gig| gig.map_or(true, |g| !g.is_closed()));
        let uncollected_advances =
            sum_advances(advances, &by_id, |gig| gig.map_or(true, |g| !g.collected));

        let pot_real =
            policy.base_balance + manual_total + closed_gig_total - outstanding_advances;
        let diners_disposicio =
            policy.base_balance + manual_total + collected_gig_total - uncollected_advances;

        let entries = build_entries(&included_movements, &included_gigs, policy.base_balance);
        debug!(
            entries = entries.len(),
            pot_real, diners_disposicio, "computed pot ledger"
        );

        LedgerReport {
            policy,
            entries,
            manual_total,
            closed_gig_total,
            outstanding_advances,
            pot_real,
            diners_disposicio,
        }
    }
}

/// Sums advances whose gig is still open. Advances pointing at unknown gigs count as open.
fn sum_advances(
    advances: &[AdvancePayment],
    by_id: &HashMap<Uuid, &GigRecord>,
    still_open: impl Fn(Option<&GigRecord>) -> bool,
) -> f64 {
    advances
        .iter()
        .filter(|advance| still_open(by_id.get(&advance.gig_id).copied()))
        .map(|advance| advance.amount)
        .sum()
}

fn build_entries(
    movements: &[&LedgerMovement],
    gigs: &[&GigRecord],
    base_balance: f64,
) -> Vec<LedgerEntry> {
    let mut rows: Vec<(Option<NaiveDate>, String, f64, LedgerEntrySource)> = movements
        .iter()
        .map(|movement| {
            (
                movement.date,
                movement.description.clone(),
                movement.amount,
                LedgerEntrySource::Manual {
                    movement_id: movement.id,
                    category: movement.category.clone(),
                },
            )
        })
        .collect();
    rows.extend(gigs.iter().filter(|gig| gig.is_closed()).map(|gig| {
        (
            gig.date,
            format!("Bolo {}", gig.town),
            gig.pot_delta,
            LedgerEntrySource::Gig { gig_id: gig.id },
        )
    }));
    // Stable: same-day entries keep manual-before-gig input order.
    rows.sort_by_key(|(date, ..)| *date);

    let mut balance = base_balance;
    rows.into_iter()
        .map(|(date, description, amount, source)| {
            let balance_before = balance;
            balance += amount;
            LedgerEntry {
                date,
                description,
                amount,
                balance_before,
                balance_after: balance,
                source,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bota_domain::{GigStatus, IncomeType};

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn closed_gig(on: Option<NaiveDate>, delta: f64) -> GigRecord {
        let mut gig = GigRecord::new(on, "Igualada")
            .with_status(GigStatus::Closed)
            .with_income(delta, IncomeType::Cash);
        gig.collected = true;
        gig.musicians_paid = true;
        gig
    }

    #[test]
    fn pot_real_matches_reference_scenario() {
        let movements = vec![LedgerMovement::new(date(2025, 2, 1), 200.0, "Quota")];
        let closed = closed_gig(date(2025, 3, 1), 150.0);
        let open = GigRecord::new(date(2025, 1, 15), "Terrassa")
            .with_status(GigStatus::Confirmed)
            .with_income(400.0, IncomeType::Invoice);
        let advances = vec![AdvancePayment::new(open.id, 50.0, date(2025, 1, 10))];

        let report = LedgerService::compute_ledger(
            &movements,
            &[closed, open],
            &advances,
            PotPolicy::new(500.0, date(2025, 1, 1)),
        );

        assert_eq!(report.pot_real, 800.0);
        assert_eq!(report.outstanding_advances, 50.0);
        assert_eq!(report.entries.len(), 2);
    }

    #[test]
    fn running_balance_ends_at_base_plus_included_amounts() {
        let movements = vec![
            LedgerMovement::new(date(2025, 4, 2), -80.0, "Cordes"),
            LedgerMovement::new(date(2024, 12, 31), 999.0, "Abans del tall"),
            LedgerMovement::new(None, 25.0, "Sense data"),
        ];
        let gigs = vec![closed_gig(date(2025, 3, 1), 300.0)];
        let report = LedgerService::compute_ledger(
            &movements,
            &gigs,
            &[],
            PotPolicy::new(100.0, date(2025, 1, 1)),
        );

        let amounts: Vec<f64> = report.entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![25.0, 300.0, -80.0]);
        assert_eq!(report.entries[0].date, None);
        assert_eq!(report.closing_balance(), 100.0 + 25.0 + 300.0 - 80.0);
        for pair in report.entries.windows(2) {
            assert_eq!(pair[0].balance_after, pair[1].balance_before);
        }
        assert_eq!(report.closing_balance(), report.pot_real);
    }

    #[test]
    fn available_cash_counts_collected_but_unpaid_gigs() {
        let mut gig = GigRecord::new(date(2025, 5, 5), "Girona")
            .with_status(GigStatus::Confirmed)
            .with_income(700.0, IncomeType::Invoice)
            .with_musician_cost(400.0);
        gig.mark_collected().unwrap();
        let advances = vec![AdvancePayment::new(gig.id, 100.0, None)];

        let report =
            LedgerService::compute_ledger(&[], &[gig], &advances, PotPolicy::new(0.0, None));

        assert_eq!(report.pot_real, -100.0);
        assert_eq!(report.diners_disposicio, 300.0);
        assert!(report.entries.is_empty());
    }

    #[test]
    fn advances_for_closed_gigs_are_not_subtracted() {
        let gig = closed_gig(date(2025, 2, 2), 200.0);
        let advances = vec![AdvancePayment::new(gig.id, 75.0, None)];
        let report =
            LedgerService::compute_ledger(&[], &[gig], &advances, PotPolicy::new(10.0, None));
        assert_eq!(report.pot_real, 210.0);
        assert_eq!(report.outstanding_advances, 0.0);
    }

    #[test]
    fn display_order_is_newest_first() {
        let movements = vec![
            LedgerMovement::new(date(2025, 1, 5), 10.0, "a"),
            LedgerMovement::new(date(2025, 1, 9), 20.0, "b"),
        ];
        let report =
            LedgerService::compute_ledger(&movements, &[], &[], PotPolicy::new(0.0, None));
        let first = report.display_entries().next().unwrap();
        assert_eq!(first.description, "b");
        assert_eq!(first.balance_after, 30.0);
    }
}
