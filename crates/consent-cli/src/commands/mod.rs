//! CLI command implementations

pub mod document;
pub mod record;
pub mod template;

use crate::config::{CliConfig, StorageConfig};
use crate::error::CliResult;
use consent_document::DisplaySettings;
use consent_store::{FileKv, KvStore, MemoryKv, RecordStore, SignatureMachine};
use consent_types::RecordId;
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs, built once from configuration.
pub struct Context {
    pub store: Arc<RecordStore>,
    pub machine: SignatureMachine,
    pub display: DisplaySettings,
    pub config: CliConfig,
}

impl Context {
    pub fn from_config(config: CliConfig) -> CliResult<Self> {
        let kv: Arc<dyn KvStore> = match &config.storage {
            StorageConfig::Memory => Arc::new(MemoryKv::new()),
            StorageConfig::File { .. } => {
                let dir = config.data_dir();
                debug!(dir = %dir.display(), "using file storage");
                Arc::new(FileKv::new(dir))
            }
        };
        let store = Arc::new(RecordStore::new(kv).with_validator(config.validator()));
        Ok(Self {
            machine: SignatureMachine::new(store.clone()),
            display: config.display_settings()?,
            store,
            config,
        })
    }

    /// Accept a full id or a unique prefix of one.
    pub fn resolve(&self, id: &str) -> CliResult<RecordId> {
        let records = self.store.list()?;
        if records.iter().any(|r| r.id.as_str() == id) {
            return Ok(RecordId::from(id));
        }
        let mut matches = records.iter().filter(|r| r.id.as_str().starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(record), None) if !id.is_empty() => Ok(record.id.clone()),
            (Some(_), Some(_)) => Err(crate::error::CliError::InvalidInput(format!(
                "id prefix {} is ambiguous",
                id
            ))),
            _ => Ok(RecordId::from(id)),
        }
    }
}
