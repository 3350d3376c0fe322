use axum::{
    extract::{Query, State},
    Json,
};
use bota_core::{CompareService, ComparisonReport, StatsFilter, StatsReport, StatsService};
use tracing::debug;

use super::{
    blocking,
    query::{CompareParams, StatsParams},
    ApiResult, AppState,
};

/// `GET /api/estadistiques`
pub async fn estadistiques(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> ApiResult<Json<StatsReport>> {
    let filter = params.filter()?;
    let options = params.options();
    let gigs = blocking(&state.store, |store| store.gigs()).await?;
    let report = StatsService::report(&gigs, &filter, options);
    debug!(gigs = gigs.len(), "served statistics");
    Ok(Json(report))
}

/// `GET /api/estadistiques/compare`
pub async fn compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> ApiResult<Json<ComparisonReport>> {
    let (axis, a, b) = params.selection()?;
    let base = StatsFilter::try_from(params.filter.clone())?;
    let gigs = blocking(&state.store, |store| store.gigs()).await?;
    Ok(Json(CompareService::compare(&gigs, &base, axis, a, b)?))
}
