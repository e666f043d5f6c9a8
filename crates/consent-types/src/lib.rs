//! Consent record data model.
//!
//! This crate defines the canonical entity shared by every other layer:
//! - [`ConsentRecord`]: one agreement between two parties
//! - [`SignatureState`]: per-party local attestation (not a cryptographic proof)
//! - [`SafetyMeasure`]: the fixed option set chosen at creation time
//! - [`ConsentTemplate`]: built-in starting points for new records
//!
//! Design stance:
//! - Textual content is immutable after creation; only the two signature
//!   states ever change, and each changes at most once (Unsigned -> Signed).
//! - The persisted JSON layout is described by [`wire`]; older flat documents
//!   are normalized on read.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod clock;
pub mod ids;
pub mod party;
pub mod record;
pub mod safety;
pub mod template;
pub mod wire;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::RecordId;
pub use party::{Party, PartySlot};
pub use record::{ConsentRecord, NewConsentRecord, SignatureState};
pub use safety::{SafetyMeasure, UnknownSafetyMeasure};
pub use template::{find_template, templates, ConsentTemplate};
pub use wire::{decode_record, WireError};
