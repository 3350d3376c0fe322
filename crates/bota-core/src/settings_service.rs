use bota_domain::ForecastSettings;
use tracing::info;

use crate::{CoreError, RecordStore};

pub struct SettingsService;

impl SettingsService {
    /// Stored settings, or `defaults` when the record has never been written.
    pub fn load_or(
        store: &dyn RecordStore,
        defaults: ForecastSettings,
    ) -> Result<ForecastSettings, CoreError> {
        Ok(store.settings()?.unwrap_or(defaults))
    }

    pub fn load(store: &dyn RecordStore) -> Result<ForecastSettings, CoreError> {
        Self::load_or(store, ForecastSettings::default())
    }

    pub fn update<F>(store: &dyn RecordStore, mutator: F) -> Result<ForecastSettings, CoreError>
    where
        F: FnOnce(&mut ForecastSettings),
    {
        Self::update_or_create(store, ForecastSettings::default(), mutator)
    }

    /// Applies `mutator` and persists. The record is created from `defaults` on first write.
    pub fn update_or_create<F>(
        store: &dyn RecordStore,
        defaults: ForecastSettings,
        mutator: F,
    ) -> Result<ForecastSettings, CoreError>
    where
        F: FnOnce(&mut ForecastSettings),
    {
        let mut settings = match store.settings()? {
            Some(existing) => existing,
            None => {
                info!("no forecast settings yet, creating from defaults");
                defaults
            }
        };
        mutator(&mut settings);
        if !settings.reserve_min.is_finite() || settings.reserve_min < 0.0 {
            return Err(CoreError::Validation(format!(
                "reserve minimum must be a non-negative amount, got {}",
                settings.reserve_min
            )));
        }
        store.save_settings(&settings)?;
        Ok(settings)
    }

    pub fn set_reserve_min(
        store: &dyn RecordStore,
        reserve_min: f64,
    ) -> Result<ForecastSettings, CoreError> {
        Self::update(store, |settings| settings.reserve_min = reserve_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use bota_domain::ForecastHorizon;

    #[test]
    fn first_update_creates_the_record() {
        let store = InMemoryStore::new();
        let saved = SettingsService::set_reserve_min(&store, 750.0).unwrap();
        assert_eq!(saved.reserve_min, 750.0);
        assert_eq!(saved.default_horizon, ForecastHorizon::Days90);
        assert_eq!(store.settings().unwrap(), Some(saved));
    }

    #[test]
    fn first_write_starts_from_given_defaults() {
        let store = InMemoryStore::new();
        let defaults = ForecastSettings {
            reserve_min: 900.0,
            default_horizon: ForecastHorizon::Days30,
        };
        assert_eq!(SettingsService::load_or(&store, defaults.clone()).unwrap(), defaults);

        let saved = SettingsService::update_or_create(&store, defaults, |settings| {
            settings.reserve_min = 1000.0
        })
        .unwrap();
        assert_eq!(saved.default_horizon, ForecastHorizon::Days30);
        assert_eq!(saved.reserve_min, 1000.0);
    }

    #[test]
    fn negative_reserve_is_rejected_and_not_saved() {
        let store = InMemoryStore::new();
        let err = SettingsService::set_reserve_min(&store, -5.0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.settings().unwrap().is_none());
    }
}
