//! Persisted JSON layout.
//!
//! Current layout: camelCase fields, nested `partyA`/`partyB`, each signature
//! flattened into a `partyXSigned` flag plus an optional `partyXSignedAt`
//! instant. Documents written by the earlier browser application use a flat
//! `party1Name`/`party1ID` layout; [`decode_record`] accepts both.

use crate::ids::RecordId;
use crate::party::Party;
use crate::record::{ConsentRecord, NewConsentRecord, SignatureState};
use crate::safety::SafetyMeasure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} is true but no signed-at instant is recorded")]
    MissingSignedAt { field: &'static str },

    #[error("{field} is false but a signed-at instant is recorded")]
    UnexpectedSignedAt { field: &'static str },
}

/// Serialized form of [`ConsentRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWire {
    pub id: RecordId,
    pub title: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub party_a: Party,
    pub party_b: Party,
    pub consent_details: String,
    #[serde(default)]
    pub safety_measures: Vec<SafetyMeasure>,
    pub privacy_terms: String,
    pub revocation_terms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_terms: Option<String>,
    #[serde(default)]
    pub party_a_signed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_a_signed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub party_b_signed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_b_signed_at: Option<DateTime<Utc>>,
}

fn signature_state(
    signed: bool,
    at: Option<DateTime<Utc>>,
    field: &'static str,
) -> Result<SignatureState, WireError> {
    match (signed, at) {
        (true, Some(at)) => Ok(SignatureState::Signed { at }),
        (false, None) => Ok(SignatureState::Unsigned),
        (true, None) => Err(WireError::MissingSignedAt { field }),
        (false, Some(_)) => Err(WireError::UnexpectedSignedAt { field }),
    }
}

impl TryFrom<RecordWire> for ConsentRecord {
    type Error = WireError;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        let a = signature_state(wire.party_a_signed, wire.party_a_signed_at, "partyASigned")?;
        let b = signature_state(wire.party_b_signed, wire.party_b_signed_at, "partyBSigned")?;
        let draft = NewConsentRecord {
            id: None,
            created_at: None,
            title: wire.title,
            date: wire.date,
            party_a: wire.party_a,
            party_b: wire.party_b,
            consent_details: wire.consent_details,
            safety_measures: wire.safety_measures,
            privacy_terms: wire.privacy_terms,
            revocation_terms: wire.revocation_terms,
            additional_terms: wire.additional_terms,
        };
        Ok(ConsentRecord::from_draft(draft, wire.id, wire.created_at).with_signatures(a, b))
    }
}

impl From<ConsentRecord> for RecordWire {
    fn from(record: ConsentRecord) -> Self {
        let a = record.signature(crate::PartySlot::A);
        let b = record.signature(crate::PartySlot::B);
        Self {
            id: record.id,
            title: record.title,
            date: record.date,
            created_at: record.created_at,
            party_a: record.party_a,
            party_b: record.party_b,
            consent_details: record.consent_details,
            safety_measures: record.safety_measures,
            privacy_terms: record.privacy_terms,
            revocation_terms: record.revocation_terms,
            additional_terms: record.additional_terms,
            party_a_signed: a.is_signed(),
            party_a_signed_at: a.signed_at(),
            party_b_signed: b.is_signed(),
            party_b_signed_at: b.signed_at(),
        }
    }
}

/// Flat layout written by the browser application.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyAgreement {
    id: RecordId,
    agreement_title: String,
    date: String,
    created_at: DateTime<Utc>,
    party1_name: String,
    #[serde(rename = "party1ID")]
    party1_id: String,
    party2_name: String,
    #[serde(rename = "party2ID")]
    party2_id: String,
    consent_details: String,
    #[serde(default)]
    safety_measures: Vec<SafetyMeasure>,
    privacy_terms: String,
    revocation_terms: String,
    #[serde(default)]
    additional_terms: Option<String>,
    #[serde(default)]
    party1_signed: Option<bool>,
    #[serde(default)]
    party1_signed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    party2_signed: Option<bool>,
    #[serde(default)]
    party2_signed_at: Option<DateTime<Utc>>,
}

impl LegacyAgreement {
    /// A raised flag always wins so a signature is never lost; a missing
    /// instant falls back to the creation instant. A stray instant without
    /// the flag is dropped, matching how the old views displayed it.
    fn legacy_state(
        signed: Option<bool>,
        at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> SignatureState {
        if signed.unwrap_or(false) {
            SignatureState::Signed {
                at: at.unwrap_or(created_at),
            }
        } else {
            SignatureState::Unsigned
        }
    }

    fn normalize(self) -> ConsentRecord {
        let a = Self::legacy_state(self.party1_signed, self.party1_signed_at, self.created_at);
        let b = Self::legacy_state(self.party2_signed, self.party2_signed_at, self.created_at);
        let draft = NewConsentRecord {
            id: None,
            created_at: None,
            title: self.agreement_title,
            date: self.date,
            party_a: Party::new(self.party1_name, self.party1_id),
            party_b: Party::new(self.party2_name, self.party2_id),
            consent_details: self.consent_details,
            safety_measures: self.safety_measures,
            privacy_terms: self.privacy_terms,
            revocation_terms: self.revocation_terms,
            additional_terms: self.additional_terms,
        };
        ConsentRecord::from_draft(draft, self.id, self.created_at).with_signatures(a, b)
    }
}

fn is_legacy(value: &Value) -> bool {
    value.get("agreementTitle").is_some() || value.get("party1Name").is_some()
}

/// Decode one stored element in either layout.
pub fn decode_record(value: Value) -> Result<ConsentRecord, WireError> {
    if is_legacy(&value) {
        let legacy: LegacyAgreement = serde_json::from_value(value)?;
        Ok(legacy.normalize())
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PartySlot;
    use serde_json::json;

    fn current_json() -> Value {
        json!({
            "id": "rec-1",
            "title": "周末协议",
            "date": "2024-03-05",
            "createdAt": "2024-03-05T06:03:09Z",
            "partyA": { "name": "Alice", "legalId": "110101199003071234" },
            "partyB": { "name": "Bob", "legalId": "11010119900307123X" },
            "consentDetails": "details",
            "safetyMeasures": ["使用避孕措施", "使用安全词"],
            "privacyTerms": "privacy",
            "revocationTerms": "revocation",
            "partyASigned": true,
            "partyASignedAt": "2024-03-05T07:00:00Z"
        })
    }

    #[test]
    fn decodes_current_layout() {
        let record = decode_record(current_json()).unwrap();
        assert_eq!(record.title, "周末协议");
        assert!(record.is_signed(PartySlot::A));
        assert!(!record.is_signed(PartySlot::B));
        assert_eq!(record.safety_measures.len(), 2);
        assert_eq!(record.additional_terms, None);
    }

    #[test]
    fn serializes_flag_and_instant_pairs() {
        let record = decode_record(current_json()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["partyASigned"], true);
        assert_eq!(value["partyBSigned"], false);
        assert!(value.get("partyBSignedAt").is_none());
        assert!(value.get("additionalTerms").is_none());
        assert_eq!(value["partyA"]["legalId"], "110101199003071234");
    }

    #[test]
    fn rejects_flag_without_instant() {
        let mut value = current_json();
        value["partyBSigned"] = json!(true);
        let err = decode_record(value).unwrap_err();
        assert!(err.to_string().contains("partyBSigned"));
    }

    #[test]
    fn rejects_instant_without_flag() {
        let mut value = current_json();
        value["partyASigned"] = json!(false);
        assert!(decode_record(value).is_err());
    }

    #[test]
    fn normalizes_legacy_layout() {
        let legacy = json!({
            "id": "0b7c",
            "agreementTitle": "同意协议 - 2024/3/5",
            "date": "2024-03-05",
            "party1Name": "Alice",
            "party2Name": "Bob",
            "createdAt": "2024-03-05T06:03:09.123Z",
            "party1ID": "110101199003071234",
            "party2ID": "11010119900307123X",
            "consentDetails": "details",
            "safetyMeasures": ["使用安全词"],
            "privacyTerms": "privacy",
            "revocationTerms": "revocation",
            "additionalTerms": "",
            "party1Signed": true,
            "party2SignedAt": "2024-03-05T08:00:00Z"
        });
        let record = decode_record(legacy).unwrap();
        assert_eq!(record.party_a.name, "Alice");
        assert_eq!(record.party_b.legal_id, "11010119900307123X");
        assert_eq!(
            record.signature(PartySlot::A).signed_at(),
            Some(record.created_at)
        );
        assert!(!record.is_signed(PartySlot::B));
        assert_eq!(record.additional_terms.as_deref(), Some(""));
    }
}
