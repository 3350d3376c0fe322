use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bota_core::{
    ForecastItemPatch, ForecastItemService, ForecastProjection, ForecastService, SettingsService,
};
use bota_domain::{ForecastHorizon, ForecastItem, ForecastSettings};
use serde::Serialize;
use uuid::Uuid;

use super::{
    blocking, load_snapshot,
    query::{ForecastParams, SettingsBody},
    ApiResult, AppState,
};

#[derive(Debug, Serialize)]
pub struct ForecastPage {
    #[serde(flatten)]
    pub projection: ForecastProjection,
    pub settings: ForecastSettings,
    pub horizons: Vec<u32>,
}

/// `GET /api/forecast?horizon=N`
pub async fn forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastParams>,
) -> ApiResult<Json<ForecastPage>> {
    let requested = params.horizon()?;
    let snapshot = load_snapshot(&state).await;
    let horizon = requested.unwrap_or(snapshot.settings.default_horizon);
    let today = state.clock.today();
    let projection = ForecastService::from_snapshot(&snapshot, state.policy, horizon.days(), today);
    Ok(Json(ForecastPage {
        projection,
        settings: snapshot.settings,
        horizons: ForecastHorizon::ALL.iter().map(|h| h.days()).collect(),
    }))
}

/// `PATCH /api/forecast/items/:id`
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ForecastItemPatch>,
) -> ApiResult<Json<ForecastItem>> {
    let item = blocking(&state.store, move |store| {
        ForecastItemService::update(store, id, patch)
    })
    .await?;
    Ok(Json(item))
}

/// `POST /api/forecast/items/:id/toggle`
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ForecastItem>> {
    let item = blocking(&state.store, move |store| {
        ForecastItemService::toggle_active(store, id)
    })
    .await?;
    Ok(Json(item))
}

/// `DELETE /api/forecast/items/:id`
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    blocking(&state.store, move |store| ForecastItemService::delete(store, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/settings/forecast`. Creates the record from defaults on first write.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<SettingsBody>,
) -> ApiResult<Json<ForecastSettings>> {
    let horizon = body
        .default_horizon
        .map(ForecastHorizon::try_from)
        .transpose()
        .map_err(bota_core::CoreError::from)?;
    let defaults = state.default_settings.clone();
    let settings = blocking(&state.store, move |store| {
        SettingsService::update_or_create(store, defaults, |settings| {
            if let Some(reserve_min) = body.reserve_min {
                settings.reserve_min = reserve_min;
            }
            if let Some(horizon) = horizon {
                settings.default_horizon = horizon;
            }
        })
    })
    .await?;
    Ok(Json(settings))
}
