//! Per-party signature state machine.
//!
//! ```text
//! Unsigned --sign--> Signed   (terminal)
//! Signed   --sign--> Signed   (no-op, instant unchanged)
//! ```
//!
//! There is no unsign: revoking consent is a clause in the record text, not a
//! data mutation.

use crate::records::RecordStore;
use crate::StoreResult;
use consent_types::{Clock, ConsentRecord, PartySlot, RecordId};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a sign call. `record` is the just-persisted value.
#[derive(Debug, Clone, PartialEq)]
pub struct SignOutcome {
    pub record: ConsentRecord,
    pub changed: bool,
}

pub struct SignatureMachine {
    store: Arc<RecordStore>,
    clock: Arc<dyn Clock>,
}

impl SignatureMachine {
    /// Uses the store's clock for signed-at instants.
    pub fn new(store: Arc<RecordStore>) -> Self {
        let clock = store.clock();
        Self { store, clock }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn sign(&self, id: &RecordId, party: PartySlot) -> StoreResult<SignOutcome> {
        let current = self.store.get(id)?;
        if current.is_signed(party) {
            debug!(id = %id, party = %party, "already signed");
            return Ok(SignOutcome {
                record: current,
                changed: false,
            });
        }

        let at = self.clock.now();
        let mut changed = false;
        let record = self.store.update(id, |record| {
            changed = record.mark_signed(party, at);
        })?;

        if changed {
            info!(id = %id, party = %party, signed_at = %at, "party signed");
        }
        Ok(SignOutcome { record, changed })
    }
}
