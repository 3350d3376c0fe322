use std::fs;

use bota_core::{
    CoreError, ForecastItemService, GigService, LedgerService, PotPolicy, RecordStore,
    SettingsService, Snapshot,
};
use bota_domain::{
    AdvancePayment, ForecastItem, ForecastKind, GigRecord, GigStatus, IncomeType, LedgerMovement,
};
use bota_storage_json::{JsonRecordStore, MonthExport, StoragePaths, Table};
use chrono::NaiveDate;
use tempfile::tempdir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn empty_directory_reads_as_empty_tables() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(StoragePaths::new(dir.path())).expect("store");

    assert!(store.gigs().expect("gigs").is_empty());
    assert!(store.forecast_items().expect("items").is_empty());
    assert!(store.settings().expect("settings").is_none());
}

#[test]
fn rows_survive_a_reopen() {
    let dir = tempdir().expect("tempdir");
    let gig = GigRecord::new(Some(day(2025, 4, 12)), "Cardona")
        .with_status(GigStatus::Confirmed)
        .with_income(700.0, IncomeType::Invoice);
    {
        let store = JsonRecordStore::new(StoragePaths::new(dir.path())).expect("store");
        GigService::add(&store, gig.clone()).expect("add gig");
        SettingsService::set_reserve_min(&store, 650.0).expect("settings");
    }

    let reopened = JsonRecordStore::new(StoragePaths::new(dir.path())).expect("store");
    assert_eq!(reopened.gigs().expect("gigs"), vec![gig.clone()]);
    assert_eq!(reopened.settings().expect("settings").map(|s| s.reserve_min), Some(650.0));
    assert!(reopened.table_path(Table::Gigs).exists());
    assert!(!reopened
        .table_path(Table::Gigs)
        .with_extension("json.tmp")
        .exists());
}

#[test]
fn saving_twice_updates_in_place() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(StoragePaths::new(dir.path())).expect("store");
    let mut item = ForecastItem::new("Lloguer local", ForecastKind::Expense, 120.0);
    store.save_forecast_item(&item).expect("save");
    item.amount = 150.0;
    store.save_forecast_item(&item).expect("save");

    let items = store.forecast_items().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].amount, 150.0);

    ForecastItemService::delete(&store, item.id).expect("delete");
    assert!(matches!(
        store.delete_forecast_item(item.id),
        Err(CoreError::ForecastItemNotFound(_))
    ));
}

#[test]
fn corrupt_table_is_a_serde_error_and_snapshot_degrades() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(StoragePaths::new(dir.path())).expect("store");
    store
        .save_movement(&LedgerMovement::new(Some(day(2025, 2, 1)), 200.0, "Quota"))
        .expect("movement");
    fs::write(store.table_path(Table::Gigs), "[{ broken").expect("corrupt");

    assert!(matches!(store.gigs(), Err(CoreError::Serde(_))));
    let snapshot = Snapshot::load(&store);
    assert!(snapshot.gigs.is_empty());
    assert_eq!(snapshot.movements.len(), 1);

    let report = LedgerService::compute_ledger(
        &snapshot.movements,
        &snapshot.gigs,
        &snapshot.advances,
        PotPolicy::new(500.0, None),
    );
    assert_eq!(report.pot_real, 700.0);
}

#[test]
fn backups_restore_previous_tables() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(StoragePaths::new(dir.path())).expect("store");
    let first = LedgerMovement::new(None, 10.0, "Primer");
    store.save_movement(&first).expect("save");

    let name = store.backup(Some("abans de netejar")).expect("backup");
    assert!(name.ends_with("_abans-de-netejar"));
    store.delete_movement(first.id).expect("delete");
    assert!(store.movements().expect("movements").is_empty());

    store.restore_backup(&name).expect("restore");
    assert_eq!(store.movements().expect("movements"), vec![first]);
    assert_eq!(store.list_backups().expect("list"), vec![name]);
    assert!(store.restore_backup("19990101_0000").is_err());
}

#[test]
fn deleting_unknown_rows_reports_not_found() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(StoragePaths::new(dir.path())).expect("store");
    let kept = LedgerMovement::new(None, 25.0, "Quota");
    store.save_movement(&kept).expect("save");
    let missing = uuid::Uuid::new_v4();

    assert!(matches!(
        store.delete_movement(missing),
        Err(CoreError::MovementNotFound(id)) if id == missing
    ));
    assert!(matches!(
        store.delete_advance(missing),
        Err(CoreError::AdvanceNotFound(_))
    ));
    assert!(matches!(
        store.delete_assignment(missing),
        Err(CoreError::AssignmentNotFound(_))
    ));
    assert_eq!(store.movements().expect("movements"), vec![kept]);
}

#[test]
fn export_month_bundles_only_that_month() {
    let dir = tempdir().expect("tempdir");
    let store = JsonRecordStore::new(StoragePaths::new(dir.path())).expect("store");

    let mut march = GigRecord::new(Some(day(2025, 3, 8)), "Ripoll")
        .with_status(GigStatus::Confirmed)
        .with_income(800.0, IncomeType::Cash)
        .with_musician_cost(500.0);
    march.mark_collected().expect("collect");
    march.mark_musicians_paid().expect("pay");
    let april = GigRecord::new(Some(day(2025, 4, 1)), "Ripoll");
    store.save_gig(&march).expect("save");
    store.save_gig(&april).expect("save");
    store
        .save_movement(&LedgerMovement::new(Some(day(2025, 3, 20)), -40.0, "Cordes"))
        .expect("movement");
    store
        .save_advance(&AdvancePayment::new(april.id, 50.0, Some(day(2025, 3, 30))))
        .expect("advance");

    let path = store.export_month(2025, 3).expect("export");
    assert!(path.ends_with("exports/bota_2025-03.json"));

    let bundle: MonthExport =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
    assert_eq!(bundle.gigs.len(), 1);
    assert_eq!(bundle.gigs[0].id, march.id);
    assert_eq!(bundle.movements.len(), 1);
    assert_eq!(bundle.advances.len(), 1);
    assert_eq!(bundle.income_total, 800.0);
    assert_eq!(bundle.pot_delta_total, 300.0);
    assert_eq!(bundle.movement_total, -40.0);

    assert!(matches!(store.export_month(2025, 13), Err(CoreError::Validation(_))));
}
