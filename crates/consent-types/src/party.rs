//! Parties to an agreement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One party's identification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub legal_id: String,
}

impl Party {
    pub fn new(name: impl Into<String>, legal_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            legal_id: legal_id.into(),
        }
    }
}

/// Which side of the agreement an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartySlot {
    A,
    B,
}

impl PartySlot {
    pub const BOTH: [PartySlot; 2] = [PartySlot::A, PartySlot::B];

    /// Display label used in rendered documents.
    pub fn label(self) -> &'static str {
        match self {
            PartySlot::A => "参与方1",
            PartySlot::B => "参与方2",
        }
    }
}

impl fmt::Display for PartySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartySlot::A => f.write_str("partyA"),
            PartySlot::B => f.write_str("partyB"),
        }
    }
}

impl FromStr for PartySlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "1" | "partya" | "party1" => Ok(PartySlot::A),
            "b" | "2" | "partyb" | "party2" => Ok(PartySlot::B),
            other => Err(format!("unknown party: {} (expected a or b)", other)),
        }
    }
}
