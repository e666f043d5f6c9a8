//! Typed CRUD over the record collection.

use crate::kv::KvStore;
use crate::validation::Validator;
use crate::{StoreError, StoreResult};
use consent_types::{decode_record, Clock, ConsentRecord, NewConsentRecord, PartySlot, RecordId, SystemClock};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Slot name holding the JSON array of records.
pub const DEFAULT_SLOT: &str = "consent-agreements";

/// Record store over a single key-value slot.
///
/// There is no per-record storage: every call loads the entire collection and
/// every mutation writes the entire collection back before returning.
pub struct RecordStore {
    kv: Arc<dyn KvStore>,
    slot: String,
    validator: Validator,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            slot: DEFAULT_SLOT.to_string(),
            validator: Validator::default(),
            clock: Arc::new(SystemClock),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Backend("record store lock poisoned".to_string()))
    }

    fn load(&self) -> StoreResult<Vec<ConsentRecord>> {
        let Some(raw) = self.kv.get(&self.slot)? else {
            return Ok(Vec::new());
        };
        let values: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Serialization(format!("slot {}: {}", self.slot, e)))?;
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                decode_record(value).map_err(|e| {
                    StoreError::Serialization(format!("slot {} element {}: {}", self.slot, index, e))
                })
            })
            .collect()
    }

    fn save(&self, records: &[ConsentRecord]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.set(&self.slot, &raw)
    }

    /// All records in stored order.
    pub fn list(&self) -> StoreResult<Vec<ConsentRecord>> {
        let records = self.load()?;
        debug!(count = records.len(), "listed records");
        Ok(records)
    }

    pub fn get(&self, id: &RecordId) -> StoreResult<ConsentRecord> {
        self.load()?
            .into_iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Validate and append a new record, assigning `id` and `createdAt` when
    /// the draft does not carry them.
    pub fn create(&self, draft: NewConsentRecord) -> StoreResult<ConsentRecord> {
        self.validator.validate(&draft)?;

        let _guard = self.lock()?;
        let mut records = self.load()?;

        let id = draft.id.clone().unwrap_or_else(RecordId::generate);
        if records.iter().any(|r| r.id == id) {
            return Err(StoreError::Conflict(format!("record {} already exists", id)));
        }
        let created_at = draft.created_at.unwrap_or_else(|| self.clock.now());

        let record = ConsentRecord::from_draft(draft, id, created_at);
        records.push(record.clone());
        self.save(&records)?;

        info!(id = %record.id, title = %record.title, "record created");
        Ok(record)
    }

    /// Read-modify-write one record.
    ///
    /// The mutator works on a copy; the collection is written back only when
    /// the result keeps the textual content intact and every signature state
    /// is a legal successor of the stored one.
    pub fn update<F>(&self, id: &RecordId, mutator: F) -> StoreResult<ConsentRecord>
    where
        F: FnOnce(&mut ConsentRecord),
    {
        let _guard = self.lock()?;
        let mut records = self.load()?;
        let index = records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let current = &records[index];
        let mut next = current.clone();
        mutator(&mut next);

        if !current.same_content(&next) {
            warn!(id = %id, "rejected update touching immutable content");
            return Err(StoreError::InvariantViolation(format!(
                "record {}: only signature state may change after creation",
                id
            )));
        }
        for slot in PartySlot::BOTH {
            if !current.signature(slot).permits(&next.signature(slot)) {
                warn!(id = %id, party = %slot, "rejected signature regression");
                return Err(StoreError::InvariantViolation(format!(
                    "record {}: {} signature cannot be revoked or re-dated",
                    id, slot
                )));
            }
        }

        records[index] = next.clone();
        self.save(&records)?;
        debug!(id = %id, "record updated");
        Ok(next)
    }

    pub fn delete(&self, id: &RecordId) -> StoreResult<()> {
        let _guard = self.lock()?;
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.save(&records)?;
        info!(id = %id, "record deleted");
        Ok(())
    }
}
