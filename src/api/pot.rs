use axum::{extract::State, Json};
use bota_core::{LedgerReport, LedgerService};
use serde::Serialize;

use super::{load_snapshot, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct PotPage {
    #[serde(flatten)]
    pub ledger: LedgerReport,
    /// Dangling references found while loading; shown as a banner.
    pub warnings: Vec<String>,
}

/// `GET /api/pot`. Ledger entries come newest first.
pub async fn pot(State(state): State<AppState>) -> ApiResult<Json<PotPage>> {
    let snapshot = load_snapshot(&state).await;
    let mut ledger = LedgerService::compute_ledger(
        &snapshot.movements,
        &snapshot.gigs,
        &snapshot.advances,
        state.policy,
    );
    ledger.entries.reverse();
    Ok(Json(PotPage {
        ledger,
        warnings: snapshot.warnings(),
    }))
}
