//! Direct record updates for planned expenses and investments.
//!
//! Each call writes to the store and returns the persisted row, so callers patch their
//! local lists only after the write succeeded.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use bota_domain::{ForecastItem, ForecastKind};

use crate::{CoreError, RecordStore};

/// Partial edit of a forecast item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastItemPatch {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<ForecastKind>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub clear_date: bool,
    pub is_active: Option<bool>,
}

impl ForecastItemPatch {
    fn apply(self, item: &mut ForecastItem) -> Result<(), CoreError> {
        if let Some(name) = self.name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(CoreError::Validation("forecast item name is empty".into()));
            }
            item.name = trimmed.to_string();
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
            item.amount = amount;
        }
        if let Some(kind) = self.kind {
            item.kind = kind;
        }
        if self.clear_date {
            item.date = None;
        } else if let Some(date) = self.date {
            item.date = Some(date);
        }
        if let Some(active) = self.is_active {
            item.is_active = active;
        }
        Ok(())
    }
}

pub struct ForecastItemService;

impl ForecastItemService {
    pub fn add(store: &dyn RecordStore, item: ForecastItem) -> Result<ForecastItem, CoreError> {
        validate_amount(item.amount)?;
        store.save_forecast_item(&item)?;
        info!(item = %item.id, name = %item.name, "added forecast item");
        Ok(item)
    }

    pub fn toggle_active(store: &dyn RecordStore, id: Uuid) -> Result<ForecastItem, CoreError> {
        let mut item = store.forecast_item(id)?;
        item.is_active = !item.is_active;
        store.save_forecast_item(&item)?;
        info!(item = %id, active = item.is_active, "toggled forecast item");
        Ok(item)
    }

    pub fn update(
        store: &dyn RecordStore,
        id: Uuid,
        patch: ForecastItemPatch,
    ) -> Result<ForecastItem, CoreError> {
        let mut item = store.forecast_item(id)?;
        patch.apply(&mut item)?;
        store.save_forecast_item(&item)?;
        Ok(item)
    }

    pub fn delete(store: &dyn RecordStore, id: Uuid) -> Result<ForecastItem, CoreError> {
        let item = store.forecast_item(id)?;
        store.delete_forecast_item(id)?;
        info!(item = %id, "deleted forecast item");
        Ok(item)
    }
}

fn validate_amount(amount: f64) -> Result<(), CoreError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "forecast amounts are positive outflows, got {amount}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;

    fn store_with_item() -> (InMemoryStore, Uuid) {
        let store = InMemoryStore::new();
        let item = ForecastItem::new("Vestuari", ForecastKind::Expense, 400.0)
            .with_date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        let id = item.id;
        ForecastItemService::add(&store, item).unwrap();
        (store, id)
    }

    #[test]
    fn toggle_flips_and_persists() {
        let (store, id) = store_with_item();
        let toggled = ForecastItemService::toggle_active(&store, id).unwrap();
        assert!(!toggled.is_active);
        assert!(!store.forecast_item(id).unwrap().is_active);
    }

    #[test]
    fn patch_updates_only_given_fields() {
        let (store, id) = store_with_item();
        let patch = ForecastItemPatch {
            amount: Some(450.0),
            clear_date: true,
            ..Default::default()
        };
        let updated = ForecastItemService::update(&store, id, patch).unwrap();
        assert_eq!(updated.amount, 450.0);
        assert_eq!(updated.name, "Vestuari");
        assert_eq!(updated.date, None);
    }

    #[test]
    fn invalid_patch_leaves_record_untouched() {
        let (store, id) = store_with_item();
        let patch = ForecastItemPatch {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(ForecastItemService::update(&store, id, patch).is_err());
        assert_eq!(store.forecast_item(id).unwrap().name, "Vestuari");
    }

    #[test]
    fn delete_returns_the_removed_item() {
        let (store, id) = store_with_item();
        let removed = ForecastItemService::delete(&store, id).unwrap();
        assert_eq!(removed.id, id);
        assert!(matches!(
            ForecastItemService::delete(&store, id),
            Err(CoreError::ForecastItemNotFound(_))
        ));
    }
}
