//! Safety measure option set.
//!
//! Records store the display labels; the enum keeps the set closed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A safety measure selected when the record was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SafetyMeasure {
    Contraception,
    StiTesting,
    SafeWords,
    NoRecording,
    Other,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown safety measure: {0}")]
pub struct UnknownSafetyMeasure(pub String);

impl SafetyMeasure {
    /// Every option, in the order the creation form offers them.
    pub const ALL: [SafetyMeasure; 5] = [
        SafetyMeasure::Contraception,
        SafetyMeasure::StiTesting,
        SafetyMeasure::SafeWords,
        SafetyMeasure::NoRecording,
        SafetyMeasure::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SafetyMeasure::Contraception => "使用避孕措施",
            SafetyMeasure::StiTesting => "性传播疾病检测",
            SafetyMeasure::SafeWords => "使用安全词",
            SafetyMeasure::NoRecording => "禁止录音录像",
            SafetyMeasure::Other => "其他措施",
        }
    }

    /// Stable ASCII key, used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            SafetyMeasure::Contraception => "contraception",
            SafetyMeasure::StiTesting => "sti-testing",
            SafetyMeasure::SafeWords => "safe-words",
            SafetyMeasure::NoRecording => "no-recording",
            SafetyMeasure::Other => "other",
        }
    }
}

impl fmt::Display for SafetyMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SafetyMeasure {
    type Err = UnknownSafetyMeasure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SafetyMeasure::ALL
            .into_iter()
            .find(|m| {
                m.label() == trimmed
                    || m.key() == trimmed
                    || m.key().replace('-', "_") == trimmed
            })
            .ok_or_else(|| UnknownSafetyMeasure(trimmed.to_string()))
    }
}

impl TryFrom<String> for SafetyMeasure {
    type Error = UnknownSafetyMeasure;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SafetyMeasure> for String {
    fn from(value: SafetyMeasure) -> Self {
        value.label().to_string()
    }
}
