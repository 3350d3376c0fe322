//! Point-in-time copy of every table a dashboard page needs.

use std::collections::HashSet;

use bota_domain::{
    AdvancePayment, ForecastItem, ForecastSettings, GigRecord, LedgerMovement, Musician,
    MusicianAssignment,
};
use tracing::warn;

use crate::{CoreError, RecordStore};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub gigs: Vec<GigRecord>,
    pub musicians: Vec<Musician>,
    pub assignments: Vec<MusicianAssignment>,
    pub movements: Vec<LedgerMovement>,
    pub advances: Vec<AdvancePayment>,
    pub forecast_items: Vec<ForecastItem>,
    pub settings: ForecastSettings,
}

impl Snapshot {
    /// Reads every table. A failing read is logged and replaced by an empty table so the
    /// page still renders with whatever succeeded.
    pub fn load(store: &dyn RecordStore) -> Snapshot {
        Self::load_with_defaults(store, ForecastSettings::default())
    }

    /// Like [`Snapshot::load`], with `defaults` standing in for a never-written settings record.
    pub fn load_with_defaults(store: &dyn RecordStore, defaults: ForecastSettings) -> Snapshot {
        Snapshot {
            gigs: or_empty("gigs", store.gigs()),
            musicians: or_empty("musicians", store.musicians()),
            assignments: or_empty("assignments", store.assignments()),
            movements: or_empty("movements", store.movements()),
            advances: or_empty("advances", store.advances()),
            forecast_items: or_empty("forecast_items", store.forecast_items()),
            settings: match store.settings() {
                Ok(settings) => settings.unwrap_or(defaults),
                Err(err) => {
                    warn!(table = "settings", error = %err, "falling back to default settings");
                    defaults
                }
            },
        }
    }

    /// Detects dangling references and stale derived values.
    pub fn warnings(&self) -> Vec<String> {
        let gig_ids: HashSet<_> = self.gigs.iter().map(|g| g.id).collect();
        let musician_ids: HashSet<_> = self.musicians.iter().map(|m| m.id).collect();
        let mut warnings = Vec::new();

        for advance in &self.advances {
            if !gig_ids.contains(&advance.gig_id) {
                warnings.push(format!(
                    "advance {} references unknown gig {}",
                    advance.id, advance.gig_id
                ));
            }
        }
        for assignment in &self.assignments {
            if !gig_ids.contains(&assignment.gig_id) {
                warnings.push(format!(
                    "assignment {} references unknown gig {}",
                    assignment.id, assignment.gig_id
                ));
            }
            if !musician_ids.contains(&assignment.musician_id) {
                warnings.push(format!(
                    "assignment {} references unknown musician {}",
                    assignment.id, assignment.musician_id
                ));
            }
        }
        for gig in &self.gigs {
            if gig.is_closed() && (gig.pot_delta - gig.margin()).abs() > 0.005 {
                warnings.push(format!(
                    "closed gig {} has pot delta {:.2} but margin {:.2}",
                    gig.id,
                    gig.pot_delta,
                    gig.margin()
                ));
            }
            if gig.collected && !gig.status.is_confirmed() {
                warnings.push(format!(
                    "gig {} is collected but has status `{}`",
                    gig.id, gig.status
                ));
            }
        }
        warnings
    }
}

fn or_empty<T>(table: &str, result: Result<Vec<T>, CoreError>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        warn!(table, error = %err, "read failed, rendering with an empty table");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use bota_domain::{GigStatus, IncomeType};
    use uuid::Uuid;

    struct BrokenGigs(InMemoryStore);

    impl RecordStore for BrokenGigs {
        fn gigs(&self) -> Result<Vec<GigRecord>, CoreError> {
            Err(CoreError::Storage("connection reset".into()))
        }
        fn save_gig(&self, gig: &GigRecord) -> Result<(), CoreError> {
            self.0.save_gig(gig)
        }
        fn delete_gig(&self, id: Uuid) -> Result<(), CoreError> {
            self.0.delete_gig(id)
        }
        fn musicians(&self) -> Result<Vec<Musician>, CoreError> {
            self.0.musicians()
        }
        fn save_musician(&self, musician: &Musician) -> Result<(), CoreError> {
            self.0.save_musician(musician)
        }
        fn assignments(&self) -> Result<Vec<MusicianAssignment>, CoreError> {
            self.0.assignments()
        }
        fn save_assignment(&self, assignment: &MusicianAssignment) -> Result<(), CoreError> {
            self.0.save_assignment(assignment)
        }
        fn delete_assignment(&self, id: Uuid) -> Result<(), CoreError> {
            self.0.delete_assignment(id)
        }
        fn movements(&self) -> Result<Vec<LedgerMovement>, CoreError> {
            self.0.movements()
        }
        fn save_movement(&self, movement: &LedgerMovement) -> Result<(), CoreError> {
            self.0.save_movement(movement)
        }
        fn delete_movement(&self, id: Uuid) -> Result<(), CoreError> {
            self.0.delete_movement(id)
        }
        fn advances(&self) -> Result<Vec<AdvancePayment>, CoreError> {
            self.0.advances()
        }
        fn save_advance(&self, advance: &AdvancePayment) -> Result<(), CoreError> {
            self.0.save_advance(advance)
        }
        fn delete_advance(&self, id: Uuid) -> Result<(), CoreError> {
            self.0.delete_advance(id)
        }
        fn forecast_items(&self) -> Result<Vec<ForecastItem>, CoreError> {
            self.0.forecast_items()
        }
        fn save_forecast_item(&self, item: &ForecastItem) -> Result<(), CoreError> {
            self.0.save_forecast_item(item)
        }
        fn delete_forecast_item(&self, id: Uuid) -> Result<(), CoreError> {
            self.0.delete_forecast_item(id)
        }
        fn settings(&self) -> Result<Option<ForecastSettings>, CoreError> {
            self.0.settings()
        }
        fn save_settings(&self, settings: &ForecastSettings) -> Result<(), CoreError> {
            self.0.save_settings(settings)
        }
    }

    #[test]
    fn failing_table_defaults_to_empty() {
        let inner = InMemoryStore::new();
        inner
            .save_movement(&LedgerMovement::new(None, 40.0, "Loteria"))
            .unwrap();
        let snapshot = Snapshot::load(&BrokenGigs(inner));
        assert!(snapshot.gigs.is_empty());
        assert_eq!(snapshot.movements.len(), 1);
        assert_eq!(snapshot.settings, ForecastSettings::default());
    }

    #[test]
    fn warnings_flag_orphaned_advances() {
        let mut snapshot = Snapshot::default();
        let gig = GigRecord::new(None, "Manresa")
            .with_status(GigStatus::Confirmed)
            .with_income(500.0, IncomeType::Cash);
        snapshot.advances.push(AdvancePayment::new(Uuid::new_v4(), 50.0, None));
        snapshot.gigs.push(gig);

        let warnings = snapshot.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown gig"));
    }
}
