mod common;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bota::api::{
    self,
    query::{CompareParams, ForecastParams, SettingsBody, StatsParams},
    ApiError, AppState,
};
use bota_core::{
    ForecastItemPatch, ForecastItemService, RawStatsFilter, RecordStore, TrafficLight,
};
use bota_domain::{ForecastHorizon, ForecastItem, ForecastKind};

use common::{context, day, seeded};

fn state() -> (AppState, common::Seeded) {
    let seeded = seeded();
    let ctx = context(seeded.store.clone(), day(2025, 6, 1));
    (AppState::from(&ctx), seeded)
}

#[tokio::test]
async fn pot_endpoint_reports_the_reconciled_balance() {
    let (state, seeded) = state();
    let Json(page) = api::pot::pot(State(state)).await.unwrap();
    assert_eq!(page.ledger.pot_real, 800.0);
    assert!(page.warnings.is_empty());
    assert_eq!(page.ledger.entries[0].date, seeded.closed.date);
}

#[tokio::test]
async fn forecast_uses_the_same_pot_and_the_requested_horizon() {
    let (state, seeded) = state();
    ForecastItemService::add(
        seeded.store.as_ref(),
        ForecastItem::new("Furgoneta", ForecastKind::Investment, 600.0).with_date(day(2025, 6, 20)),
    )
    .unwrap();

    let Json(page) = api::forecast::forecast(
        State(state.clone()),
        Query(ForecastParams {
            horizon: Some("90".into()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(page.projection.current_pot, 800.0);
    assert_eq!(page.projection.projected, 800.0 + 300.0 - 600.0);
    assert_eq!(page.projection.light, TrafficLight::Green);
    assert_eq!(page.settings.reserve_min, 500.0);

    let Json(short) = api::forecast::forecast(
        State(state),
        Query(ForecastParams {
            horizon: Some("30".into()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(short.projection.gig_margin_total, 0.0);
    assert_eq!(short.projection.projected, 800.0 - 600.0);
}

#[tokio::test]
async fn unsupported_horizon_is_a_bad_request() {
    let (state, _) = state();
    let err = api::forecast::forecast(
        State(state),
        Query(ForecastParams {
            horizon: Some("45".into()),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_are_created_on_first_write() {
    let (state, seeded) = state();
    assert!(seeded.store.settings().unwrap().is_none());

    let Json(settings) = api::forecast::update_settings(
        State(state),
        Json(SettingsBody {
            reserve_min: Some(1_200.0),
            default_horizon: Some(180),
        }),
    )
    .await
    .unwrap();
    assert_eq!(settings.reserve_min, 1_200.0);
    assert_eq!(settings.default_horizon, ForecastHorizon::Days180);
    assert_eq!(seeded.store.settings().unwrap(), Some(settings));
}

#[tokio::test]
async fn forecast_items_can_be_patched_toggled_and_deleted() {
    let (state, seeded) = state();
    let item = ForecastItemService::add(
        seeded.store.as_ref(),
        ForecastItem::new("Vestuari", ForecastKind::Expense, 400.0),
    )
    .unwrap();

    let Json(patched) = api::forecast::update_item(
        State(state.clone()),
        Path(item.id),
        Json(ForecastItemPatch {
            amount: Some(450.0),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(patched.amount, 450.0);

    let Json(toggled) = api::forecast::toggle_item(State(state.clone()), Path(item.id))
        .await
        .unwrap();
    assert!(!toggled.is_active);

    let status = api::forecast::delete_item(State(state.clone()), Path(item.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let err = api::forecast::delete_item(State(state), Path(item.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn statistics_honour_filters_and_options() {
    let (state, _) = state();
    let params = StatsParams {
        filter: RawStatsFilter {
            payment_type: Some("cash".into()),
            ..Default::default()
        },
        timeline: Some("1".into()),
        debug: Some("true".into()),
    };
    let Json(report) = api::stats::estadistiques(State(state), Query(params))
        .await
        .unwrap();
    assert_eq!(report.stats.kpis.total_income, 450.0);
    assert_eq!(report.timeline.as_ref().map(Vec::len), Some(1));
    let debug = report.debug.unwrap();
    assert_eq!((debug.before_filter, debug.after_filter), (2, 1));
}

#[tokio::test]
async fn invalid_filters_are_rejected() {
    let (state, _) = state();
    let params = StatsParams {
        filter: RawStatsFilter {
            years: Some("vint-i-cinc".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = api::stats::estadistiques(State(state), Query(params))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn compare_reports_deltas_between_payment_types() {
    let (state, _) = state();
    let params = CompareParams {
        axis: Some("payment".into()),
        a: Some("cash".into()),
        b: Some("invoice".into()),
        filter: RawStatsFilter::default(),
    };
    let Json(report) = api::stats::compare(State(state), Query(params)).await.unwrap();
    assert_eq!(report.a.stats.kpis.total_income, 450.0);
    assert_eq!(report.b.stats.kpis.total_income, 900.0);
    assert_eq!(report.deltas["totalIncome"].diff, 450.0);
    assert_eq!(report.deltas["totalIncome"].pct, 100.0);
}

#[tokio::test]
async fn router_builds_with_every_route() {
    let (state, _) = state();
    let _router = api::router(state);
}
