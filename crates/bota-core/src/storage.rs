use std::sync::RwLock;

use bota_domain::{
    AdvancePayment, ForecastItem, ForecastSettings, GigRecord, Identifiable, LedgerMovement,
    Musician, MusicianAssignment,
};
use uuid::Uuid;

use crate::CoreError;

/// Abstraction over the backing tables.
///
/// Saves are upserts keyed by record id. Writes are last-write-wins; there is no version
/// check between concurrent editors.
pub trait RecordStore: Send + Sync {
    fn gigs(&self) -> Result<Vec<GigRecord>, CoreError>;
    fn save_gig(&self, gig: &GigRecord) -> Result<(), CoreError>;
    fn delete_gig(&self, id: Uuid) -> Result<(), CoreError>;

    fn musicians(&self) -> Result<Vec<Musician>, CoreError>;
    fn save_musician(&self, musician: &Musician) -> Result<(), CoreError>;

    fn assignments(&self) -> Result<Vec<MusicianAssignment>, CoreError>;
    fn save_assignment(&self, assignment: &MusicianAssignment) -> Result<(), CoreError>;
    fn delete_assignment(&self, id: Uuid) -> Result<(), CoreError>;

    fn movements(&self) -> Result<Vec<LedgerMovement>, CoreError>;
    fn save_movement(&self, movement: &LedgerMovement) -> Result<(), CoreError>;
    fn delete_movement(&self, id: Uuid) -> Result<(), CoreError>;

    fn advances(&self) -> Result<Vec<AdvancePayment>, CoreError>;
    fn save_advance(&self, advance: &AdvancePayment) -> Result<(), CoreError>;
    fn delete_advance(&self, id: Uuid) -> Result<(), CoreError>;

    fn forecast_items(&self) -> Result<Vec<ForecastItem>, CoreError>;
    fn save_forecast_item(&self, item: &ForecastItem) -> Result<(), CoreError>;
    fn delete_forecast_item(&self, id: Uuid) -> Result<(), CoreError>;

    /// Returns `None` until the settings record has been written once.
    fn settings(&self) -> Result<Option<ForecastSettings>, CoreError>;
    fn save_settings(&self, settings: &ForecastSettings) -> Result<(), CoreError>;

    fn gig(&self, id: Uuid) -> Result<GigRecord, CoreError> {
        self.gigs()?
            .into_iter()
            .find(|gig| gig.id == id)
            .ok_or(CoreError::GigNotFound(id))
    }

    fn forecast_item(&self, id: Uuid) -> Result<ForecastItem, CoreError> {
        self.forecast_items()?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or(CoreError::ForecastItemNotFound(id))
    }
}

/// Replaces the row with the same id or appends it.
pub fn upsert<T: Identifiable + Clone>(rows: &mut Vec<T>, row: &T) {
    match rows.iter_mut().find(|existing| existing.id() == row.id()) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

/// Removes the row with `id`, returning whether anything was removed.
pub fn remove_by_id<T: Identifiable>(rows: &mut Vec<T>, id: Uuid) -> bool {
    let before = rows.len();
    rows.retain(|row| row.id() != id);
    rows.len() != before
}

#[derive(Debug, Default, Clone)]
struct Tables {
    gigs: Vec<GigRecord>,
    musicians: Vec<Musician>,
    assignments: Vec<MusicianAssignment>,
    movements: Vec<LedgerMovement>,
    advances: Vec<AdvancePayment>,
    forecast_items: Vec<ForecastItem>,
    settings: Option<ForecastSettings>,
}

/// Volatile store used by tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T, CoreError> {
        let guard = self
            .tables
            .read()
            .map_err(|_| CoreError::Storage("in-memory store poisoned".into()))?;
        Ok(f(&guard))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> Result<T, CoreError> {
        let mut guard = self
            .tables
            .write()
            .map_err(|_| CoreError::Storage("in-memory store poisoned".into()))?;
        Ok(f(&mut guard))
    }
}

impl RecordStore for InMemoryStore {
    fn gigs(&self) -> Result<Vec<GigRecord>, CoreError> {
        self.read(|t| t.gigs.clone())
    }

    fn save_gig(&self, gig: &GigRecord) -> Result<(), CoreError> {
        self.write(|t| upsert(&mut t.gigs, gig))
    }

    fn delete_gig(&self, id: Uuid) -> Result<(), CoreError> {
        if self.write(|t| remove_by_id(&mut t.gigs, id))? {
            Ok(())
        } else {
            Err(CoreError::GigNotFound(id))
        }
    }

    fn musicians(&self) -> Result<Vec<Musician>, CoreError> {
        self.read(|t| t.musicians.clone())
    }

    fn save_musician(&self, musician: &Musician) -> Result<(), CoreError> {
        self.write(|t| upsert(&mut t.musicians, musician))
    }

    fn assignments(&self) -> Result<Vec<MusicianAssignment>, CoreError> {
        self.read(|t| t.assignments.clone())
    }

    fn save_assignment(&self, assignment: &MusicianAssignment) -> Result<(), CoreError> {
        self.write(|t| upsert(&mut t.assignments, assignment))
    }

    fn delete_assignment(&self, id: Uuid) -> Result<(), CoreError> {
        if self.write(|t| remove_by_id(&mut t.assignments, id))? {
            Ok(())
        } else {
            Err(CoreError::AssignmentNotFound(id))
        }
    }

    fn movements(&self) -> Result<Vec<LedgerMovement>, CoreError> {
        self.read(|t| t.movements.clone())
    }

    fn save_movement(&self, movement: &LedgerMovement) -> Result<(), CoreError> {
        self.write(|t| upsert(&mut t.movements, movement))
    }

    fn delete_movement(&self, id: Uuid) -> Result<(), CoreError> {
        if self.write(|t| remove_by_id(&mut t.movements, id))? {
            Ok(())
        } else {
            Err(CoreError::MovementNotFound(id))
        }
    }

    fn advances(&self) -> Result<Vec<AdvancePayment>, CoreError> {
        self.read(|t| t.advances.clone())
    }

    fn save_advance(&self, advance: &AdvancePayment) -> Result<(), CoreError> {
        self.write(|t| upsert(&mut t.advances, advance))
    }

    fn delete_advance(&self, id: Uuid) -> Result<(), CoreError> {
        if self.write(|t| remove_by_id(&mut t.advances, id))? {
            Ok(())
        } else {
            Err(CoreError::AdvanceNotFound(id))
        }
    }

    fn forecast_items(&self) -> Result<Vec<ForecastItem>, CoreError> {
        self.read(|t| t.forecast_items.clone())
    }

    fn save_forecast_item(&self, item: &ForecastItem) -> Result<(), CoreError> {
        self.write(|t| upsert(&mut t.forecast_items, item))
    }

    fn delete_forecast_item(&self, id: Uuid) -> Result<(), CoreError> {
        if self.write(|t| remove_by_id(&mut t.forecast_items, id))? {
            Ok(())
        } else {
            Err(CoreError::ForecastItemNotFound(id))
        }
    }

    fn settings(&self) -> Result<Option<ForecastSettings>, CoreError> {
        self.read(|t| t.settings.clone())
    }

    fn save_settings(&self, settings: &ForecastSettings) -> Result<(), CoreError> {
        self.write(|t| t.settings = Some(settings.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_gig_upserts_by_id() {
        let store = InMemoryStore::new();
        let mut gig = GigRecord::new(None, "Reus");
        store.save_gig(&gig).unwrap();
        gig.town = "Valls".into();
        store.save_gig(&gig).unwrap();

        let gigs = store.gigs().unwrap();
        assert_eq!(gigs.len(), 1);
        assert_eq!(gigs[0].town, "Valls");
    }

    #[test]
    fn deleting_missing_item_reports_not_found() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        let err = store.delete_forecast_item(id).unwrap_err();
        assert!(matches!(err, CoreError::ForecastItemNotFound(missing) if missing == id));
        assert!(matches!(store.delete_gig(id), Err(CoreError::GigNotFound(_))));
        assert!(matches!(store.delete_movement(id), Err(CoreError::MovementNotFound(_))));
        assert!(matches!(store.delete_advance(id), Err(CoreError::AdvanceNotFound(_))));
        assert!(matches!(
            store.delete_assignment(id),
            Err(CoreError::AssignmentNotFound(_))
        ));
    }

    #[test]
    fn settings_start_absent() {
        let store = InMemoryStore::new();
        assert!(store.settings().unwrap().is_none());
    }
}
