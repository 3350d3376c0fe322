//! Everything a request or shell command needs: configuration, the record store and a clock.

use std::sync::Arc;

use bota_config::Config;
use bota_core::{Clock, PotPolicy, RecordStore};
use bota_domain::{ForecastHorizon, ForecastSettings};
use bota_storage_json::{JsonRecordStore, StoragePaths};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::errors::BotaError;

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    /// Present when the store is file-backed; exports and table backups go through it.
    pub archive: Option<Arc<JsonRecordStore>>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Opens the JSON tables under the configured data root.
    pub fn open(config: Config) -> Result<Self, BotaError> {
        let data_root = config.resolve_data_root();
        let json = Arc::new(JsonRecordStore::new(StoragePaths::new(&data_root))?);
        info!(data_root = %data_root.display(), "opened record store");
        Ok(Self {
            config,
            store: json.clone(),
            archive: Some(json),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_store(config: Config, store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            archive: None,
            clock,
        }
    }

    /// The single pot policy every balance on every page is computed with.
    pub fn pot_policy(&self) -> PotPolicy {
        PotPolicy::new(self.config.pot.base_balance, self.config.pot.cutoff_date)
    }

    /// Forecast settings used until the settings table holds a record.
    pub fn default_settings(&self) -> ForecastSettings {
        let defaults = self.config.forecast;
        let default_horizon = ForecastHorizon::try_from(defaults.horizon_days).unwrap_or_else(|err| {
            warn!(error = %err, "configured forecast horizon ignored");
            ForecastHorizon::default()
        });
        ForecastSettings {
            reserve_min: defaults.reserve_min,
            default_horizon,
        }
    }
}
