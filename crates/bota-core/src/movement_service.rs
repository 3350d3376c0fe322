use tracing::info;
use uuid::Uuid;

use bota_domain::{AdvancePayment, LedgerMovement};

use crate::{CoreError, RecordStore};

/// Validated writes for manual pot movements and advance payments.
pub struct MovementService;

impl MovementService {
    pub fn record_movement(
        store: &dyn RecordStore,
        movement: LedgerMovement,
    ) -> Result<Uuid, CoreError> {
        if !movement.amount.is_finite() || movement.amount == 0.0 {
            return Err(CoreError::Validation(format!(
                "movement amount must be non-zero, got {}",
                movement.amount
            )));
        }
        store.save_movement(&movement)?;
        info!(movement = %movement.id, amount = movement.amount, "recorded pot movement");
        Ok(movement.id)
    }

    pub fn delete_movement(store: &dyn RecordStore, id: Uuid) -> Result<(), CoreError> {
        store.delete_movement(id)
    }

    /// Advances must point at an existing gig that is not closed yet.
    pub fn record_advance(
        store: &dyn RecordStore,
        advance: AdvancePayment,
    ) -> Result<Uuid, CoreError> {
        if !advance.amount.is_finite() || advance.amount <= 0.0 {
            return Err(CoreError::Validation(format!(
                "advance amount must be positive, got {}",
                advance.amount
            )));
        }
        let gig = store.gig(advance.gig_id)?;
        if gig.is_closed() {
            return Err(CoreError::Validation(format!(
                "gig {} is already closed",
                gig.id
            )));
        }
        store.save_advance(&advance)?;
        info!(advance = %advance.id, gig = %gig.id, "recorded advance payment");
        Ok(advance.id)
    }

    pub fn delete_advance(store: &dyn RecordStore, id: Uuid) -> Result<(), CoreError> {
        store.delete_advance(id)
    }
}
