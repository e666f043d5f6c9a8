//! Key-value seam.
//!
//! The store engine is opaque: callers only see whole string values under
//! named keys.

use crate::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Opaque persistent key-value service.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the value under `key` as a unit.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`; returns whether it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;
}

/// In-memory adapter. Deterministic and test-friendly; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryKv {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot, e.g. with a document written by another tool.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let kv = Self::default();
        if let Ok(mut guard) = kv.slots.write() {
            guard.insert(key.into(), value.into());
        }
        kv
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let guard = self
            .slots
            .read()
            .map_err(|_| StoreError::Backend("kv lock poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut guard = self
            .slots
            .write()
            .map_err(|_| StoreError::Backend("kv lock poisoned".to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut guard = self
            .slots
            .write()
            .map_err(|_| StoreError::Backend("kv lock poisoned".to_string()))?;
        Ok(guard.remove(key).is_some())
    }
}
