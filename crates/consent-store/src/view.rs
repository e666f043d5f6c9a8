//! Navigation selector and the consumer-held view of the selected record.

use crate::records::RecordStore;
use crate::signing::{SignOutcome, SignatureMachine};
use crate::{StoreError, StoreResult};
use consent_types::{ConsentRecord, PartySlot, RecordId};
use tracing::debug;

/// Which record is displayed; `None` means the list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSelector(pub Option<RecordId>);

impl ViewSelector {
    pub fn list() -> Self {
        Self(None)
    }

    pub fn record(id: RecordId) -> Self {
        Self(Some(id))
    }

    /// Read the `view` parameter from a query string such as `view=abc&x=1`.
    pub fn from_query(query: &str) -> Self {
        let id = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "view")
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
            .map(RecordId::from);
        Self(id)
    }

    pub fn to_query(&self) -> String {
        match &self.0 {
            Some(id) => format!("view={}", id),
            None => String::new(),
        }
    }

    pub fn is_list(&self) -> bool {
        self.0.is_none()
    }
}

/// In-memory copy of the record currently on screen.
///
/// The copy is only ever replaced with values returned by the store, so a
/// render after `sign` sees the persisted state without another read.
#[derive(Debug, Default)]
pub struct ActiveView {
    current: Option<ConsentRecord>,
}

impl ActiveView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ConsentRecord> {
        self.current.as_ref()
    }

    pub fn selector(&self) -> ViewSelector {
        ViewSelector(self.current.as_ref().map(|r| r.id.clone()))
    }

    /// Resolve a selector. An unknown id falls back to the list view and
    /// returns `false`.
    pub fn open(&mut self, store: &RecordStore, selector: &ViewSelector) -> StoreResult<bool> {
        let Some(id) = &selector.0 else {
            self.current = None;
            return Ok(true);
        };
        match store.get(id) {
            Ok(record) => {
                debug!(id = %id, "view opened");
                self.current = Some(record);
                Ok(true)
            }
            Err(StoreError::NotFound(_)) => {
                self.current = None;
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    /// Sign for `party` on the displayed record and adopt the persisted value.
    pub fn sign(&mut self, machine: &SignatureMachine, party: PartySlot) -> StoreResult<SignOutcome> {
        let id = self
            .current
            .as_ref()
            .map(|r| r.id.clone())
            .ok_or(StoreError::NoSelection)?;
        let outcome = machine.sign(&id, party)?;
        self.current = Some(outcome.record.clone());
        Ok(outcome)
    }

    /// Delete `id`; closes the view when it was the displayed record.
    pub fn delete(&mut self, store: &RecordStore, id: &RecordId) -> StoreResult<()> {
        store.delete(id)?;
        if self.current.as_ref().is_some_and(|r| &r.id == id) {
            self.current = None;
        }
        Ok(())
    }
}
