//! JSON endpoints for the statistics, pot and forecast pages.

pub mod error;
pub mod forecast;
pub mod pot;
pub mod query;
pub mod stats;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use bota_core::{Clock, CoreError, PotPolicy, RecordStore, Snapshot};
use bota_domain::ForecastSettings;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{context::AppContext, errors::BotaError};

pub use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub policy: PotPolicy,
    pub default_settings: ForecastSettings,
    pub clock: Arc<dyn Clock>,
}

impl From<&AppContext> for AppState {
    fn from(ctx: &AppContext) -> Self {
        Self {
            store: Arc::clone(&ctx.store),
            policy: ctx.pot_policy(),
            default_settings: ctx.default_settings(),
            clock: Arc::clone(&ctx.clock),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/estadistiques", get(stats::estadistiques))
        .route("/api/estadistiques/compare", get(stats::compare))
        .route("/api/pot", get(pot::pot))
        .route("/api/forecast", get(forecast::forecast))
        .route(
            "/api/forecast/items/:id",
            patch(forecast::update_item).delete(forecast::delete_item),
        )
        .route("/api/forecast/items/:id/toggle", post(forecast::toggle_item))
        .route("/api/settings/forecast", put(forecast::update_settings))
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> Result<(), BotaError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|err| BotaError::Server(format!("invalid server address `{addr}`: {err}")))?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .await
        .map_err(|err| BotaError::Server(err.to_string()))
}

/// Runs a store operation on the blocking pool.
pub(crate) async fn blocking<T, F>(store: &Arc<dyn RecordStore>, work: F) -> ApiResult<T>
where
    F: FnOnce(&dyn RecordStore) -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || work(store.as_ref()))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(ApiError::from)
}

/// Reads one table on the blocking pool. Failures are logged and read as empty.
async fn fetch_table<T, F>(store: &Arc<dyn RecordStore>, table: &'static str, read: F) -> Vec<T>
where
    F: FnOnce(&dyn RecordStore) -> Result<Vec<T>, CoreError> + Send + 'static,
    T: Send + 'static,
{
    match blocking(store, read).await {
        Ok(rows) => rows,
        Err(err) => {
            warn!(table, error = %err, "table read failed, continuing with no rows");
            Vec::new()
        }
    }
}

/// Fetches every table concurrently.
pub(crate) async fn load_snapshot(state: &AppState) -> Snapshot {
    let store = &state.store;
    let (gigs, musicians, assignments, movements, advances, forecast_items, settings) = tokio::join!(
        fetch_table(store, "gigs", |s| s.gigs()),
        fetch_table(store, "musicians", |s| s.musicians()),
        fetch_table(store, "assignments", |s| s.assignments()),
        fetch_table(store, "movements", |s| s.movements()),
        fetch_table(store, "advances", |s| s.advances()),
        fetch_table(store, "forecast_items", |s| s.forecast_items()),
        blocking(store, |s| s.settings()),
    );
    let settings = match settings {
        Ok(stored) => stored.unwrap_or_else(|| state.default_settings.clone()),
        Err(err) => {
            warn!(table = "settings", error = %err, "falling back to default settings");
            state.default_settings.clone()
        }
    };
    Snapshot {
        gigs,
        musicians,
        assignments,
        movements,
        advances,
        forecast_items,
        settings,
    }
}
