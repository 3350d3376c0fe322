#![allow(dead_code)]

use std::sync::Arc;

use bota::AppContext;
use bota_config::Config;
use bota_core::{FixedClock, GigService, InMemoryStore, MovementService, RecordStore};
use bota_domain::{AdvancePayment, GigRecord, GigStatus, IncomeType, LedgerMovement};
use chrono::NaiveDate;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct Seeded {
    pub store: Arc<InMemoryStore>,
    pub closed: GigRecord,
    pub open: GigRecord,
}

/// Base 500, a +200 movement, a closed gig worth 150 and an open gig with a 50 advance.
pub fn seeded() -> Seeded {
    let store = Arc::new(InMemoryStore::new());
    MovementService::record_movement(
        store.as_ref(),
        LedgerMovement::new(Some(day(2025, 2, 1)), 200.0, "Quota socis"),
    )
    .unwrap();

    let closed = GigRecord::new(Some(day(2025, 3, 15)), "Manresa")
        .with_status(GigStatus::Confirmed)
        .with_income(450.0, IncomeType::Cash)
        .with_musician_cost(300.0);
    GigService::add(store.as_ref(), closed.clone()).unwrap();
    GigService::mark_collected(store.as_ref(), closed.id).unwrap();
    let closed = GigService::mark_musicians_paid(store.as_ref(), closed.id).unwrap();

    let open = GigRecord::new(Some(day(2025, 7, 20)), "Solsona")
        .with_status(GigStatus::Confirmed)
        .with_income(900.0, IncomeType::Invoice)
        .with_musician_cost(600.0);
    GigService::add(store.as_ref(), open.clone()).unwrap();
    MovementService::record_advance(
        store.as_ref(),
        AdvancePayment::new(open.id, 50.0, Some(day(2025, 6, 1))),
    )
    .unwrap();

    Seeded {
        store,
        closed,
        open,
    }
}

pub fn config() -> Config {
    let mut config = Config::default();
    config.pot.base_balance = 500.0;
    config.pot.cutoff_date = Some(day(2025, 1, 1));
    config
}

pub fn context(store: Arc<InMemoryStore>, today: NaiveDate) -> AppContext {
    let store: Arc<dyn RecordStore> = store;
    AppContext::with_store(config(), store, Arc::new(FixedClock::on(today)))
}
