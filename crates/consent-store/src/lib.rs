//! Consent record persistence and signature state.
//!
//! Layers, leaves first:
//! - [`KvStore`]: opaque get/set/delete service ([`MemoryKv`], [`FileKv`])
//! - [`RecordStore`]: typed CRUD over one named slot holding the whole
//!   collection as a JSON array
//! - [`SignatureMachine`]: per-party Unsigned -> Signed transitions
//! - [`ActiveView`]: the consumer-held view of the selected record
//!
//! Every mutating call reads the full collection, applies the change and
//! writes the full collection back before returning.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod file;
pub mod kv;
pub mod records;
pub mod signing;
pub mod validation;
pub mod view;

pub use error::{FieldError, StoreError, StoreResult};
pub use file::FileKv;
pub use kv::{KvStore, MemoryKv};
pub use records::{RecordStore, DEFAULT_SLOT};
pub use signing::{SignOutcome, SignatureMachine};
pub use validation::Validator;
pub use view::{ActiveView, ViewSelector};
