//! Lifecycle and cost updates for gig records.

use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use bota_domain::{
    AssignmentRole, GigRecord, GigStatus, Musician, MusicianAssignment,
};

use crate::{CoreError, RecordStore};

pub struct GigService;

impl GigService {
    pub fn add(store: &dyn RecordStore, gig: GigRecord) -> Result<Uuid, CoreError> {
        let id = gig.id;
        store.save_gig(&gig)?;
        info!(gig = %id, status = %gig.status, "added gig");
        Ok(id)
    }

    /// Loads the gig, applies `mutator`, and writes it back only if the mutator succeeded.
    pub fn update<F>(store: &dyn RecordStore, id: Uuid, mutator: F) -> Result<GigRecord, CoreError>
    where
        F: FnOnce(&mut GigRecord) -> Result<(), CoreError>,
    {
        let mut gig = store.gig(id)?;
        mutator(&mut gig)?;
        store.save_gig(&gig)?;
        Ok(gig)
    }

    pub fn advance_status(
        store: &dyn RecordStore,
        id: Uuid,
        next: GigStatus,
    ) -> Result<GigRecord, CoreError> {
        let gig = Self::update(store, id, |gig| Ok(gig.advance_to(next)?))?;
        info!(gig = %id, status = %gig.status, "gig status changed");
        Ok(gig)
    }

    pub fn mark_collected(store: &dyn RecordStore, id: Uuid) -> Result<GigRecord, CoreError> {
        let gig = Self::update(store, id, |gig| Ok(gig.mark_collected()?))?;
        if gig.is_closed() {
            info!(gig = %id, pot_delta = gig.pot_delta, "gig closed, pot delta is final");
        }
        Ok(gig)
    }

    pub fn mark_musicians_paid(store: &dyn RecordStore, id: Uuid) -> Result<GigRecord, CoreError> {
        let gig = Self::update(store, id, |gig| Ok(gig.mark_musicians_paid()?))?;
        if gig.is_closed() {
            info!(gig = %id, pot_delta = gig.pot_delta, "gig closed, pot delta is final");
        }
        Ok(gig)
    }

    /// Σ effective price of the non-declined assignments of `gig_id`.
    ///
    /// Assignments whose musician is missing are skipped with a warning.
    pub fn musician_cost(
        gig_id: Uuid,
        assignments: &[MusicianAssignment],
        musicians: &[Musician],
    ) -> f64 {
        let by_id: HashMap<Uuid, &Musician> = musicians.iter().map(|m| (m.id, m)).collect();
        assignments
            .iter()
            .filter(|a| a.gig_id == gig_id && a.counts_towards_cost())
            .filter_map(|a| match by_id.get(&a.musician_id) {
                Some(musician) => Some(a.effective_price(musician)),
                None => {
                    warn!(assignment = %a.id, musician = %a.musician_id, "assignment without musician");
                    a.price_override
                }
            })
            .sum()
    }

    /// Recomputes the musician cost and pot delta of a gig from its assignments.
    pub fn recalculate_cost(store: &dyn RecordStore, id: Uuid) -> Result<GigRecord, CoreError> {
        let assignments = store.assignments()?;
        let musicians = store.musicians()?;
        let cost = Self::musician_cost(id, &assignments, &musicians);
        Self::update(store, id, |gig| Ok(gig.set_musician_cost(cost)?))
    }

    pub fn assign_musician(
        store: &dyn RecordStore,
        gig_id: Uuid,
        musician_id: Uuid,
        role: AssignmentRole,
        price_override: Option<f64>,
    ) -> Result<MusicianAssignment, CoreError> {
        let gig = store.gig(gig_id)?;
        if gig.is_closed() {
            return Err(CoreError::Validation(format!(
                "gig {gig_id} is closed; its musician cost is final"
            )));
        }
        if !store.musicians()?.iter().any(|m| m.id == musician_id) {
            return Err(CoreError::MusicianNotFound(musician_id));
        }
        let mut assignment = MusicianAssignment::new(gig_id, musician_id, role);
        assignment.price_override = price_override;
        store.save_assignment(&assignment)?;
        Self::recalculate_cost(store, gig_id)?;
        Ok(assignment)
    }
}
