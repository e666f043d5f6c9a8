//! The canonical consent record.

use crate::ids::RecordId;
use crate::party::{Party, PartySlot};
use crate::safety::SafetyMeasure;
use crate::template::ConsentTemplate;
use crate::wire::RecordWire;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Local attestation state of one party.
///
/// `Signed` is terminal: nothing in this crate moves a state back to
/// `Unsigned`, and the signed-at instant is written exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureState {
    #[default]
    Unsigned,
    Signed { at: DateTime<Utc> },
}

impl SignatureState {
    pub fn is_signed(&self) -> bool {
        matches!(self, SignatureState::Signed { .. })
    }

    pub fn signed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SignatureState::Signed { at } => Some(*at),
            SignatureState::Unsigned => None,
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn permits(&self, next: &SignatureState) -> bool {
        match self {
            SignatureState::Unsigned => true,
            SignatureState::Signed { .. } => self == next,
        }
    }
}

/// One agreement between two parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire", into = "RecordWire")]
pub struct ConsentRecord {
    pub id: RecordId,
    pub title: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub party_a: Party,
    pub party_b: Party,
    pub consent_details: String,
    pub safety_measures: Vec<SafetyMeasure>,
    pub privacy_terms: String,
    pub revocation_terms: String,
    pub additional_terms: Option<String>,
    party_a_signature: SignatureState,
    party_b_signature: SignatureState,
}

impl ConsentRecord {
    /// Build an unsigned record from a draft. Validation happens at the store
    /// boundary, not here.
    pub fn from_draft(draft: NewConsentRecord, id: RecordId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            date: draft.date,
            created_at,
            party_a: draft.party_a,
            party_b: draft.party_b,
            consent_details: draft.consent_details,
            safety_measures: draft.safety_measures,
            privacy_terms: draft.privacy_terms,
            revocation_terms: draft.revocation_terms,
            additional_terms: draft.additional_terms,
            party_a_signature: SignatureState::Unsigned,
            party_b_signature: SignatureState::Unsigned,
        }
    }

    pub(crate) fn with_signatures(mut self, a: SignatureState, b: SignatureState) -> Self {
        self.party_a_signature = a;
        self.party_b_signature = b;
        self
    }

    pub fn party(&self, slot: PartySlot) -> &Party {
        match slot {
            PartySlot::A => &self.party_a,
            PartySlot::B => &self.party_b,
        }
    }

    pub fn signature(&self, slot: PartySlot) -> SignatureState {
        match slot {
            PartySlot::A => self.party_a_signature,
            PartySlot::B => self.party_b_signature,
        }
    }

    pub fn is_signed(&self, slot: PartySlot) -> bool {
        self.signature(slot).is_signed()
    }

    pub fn any_signed(&self) -> bool {
        PartySlot::BOTH.iter().any(|slot| self.is_signed(*slot))
    }

    /// Move `slot` from Unsigned to Signed at `at`.
    ///
    /// Returns `false` and leaves the record untouched when the party has
    /// already signed.
    pub fn mark_signed(&mut self, slot: PartySlot, at: DateTime<Utc>) -> bool {
        let state = match slot {
            PartySlot::A => &mut self.party_a_signature,
            PartySlot::B => &mut self.party_b_signature,
        };
        if state.is_signed() {
            return false;
        }
        *state = SignatureState::Signed { at };
        true
    }

    /// Additional terms, only when present and non-empty.
    pub fn additional_terms_given(&self) -> Option<&str> {
        self.additional_terms
            .as_deref()
            .filter(|terms| !terms.is_empty())
    }

    /// True when every field except the two signature states is equal.
    pub fn same_content(&self, other: &ConsentRecord) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.date == other.date
            && self.created_at == other.created_at
            && self.party_a == other.party_a
            && self.party_b == other.party_b
            && self.consent_details == other.consent_details
            && self.safety_measures == other.safety_measures
            && self.privacy_terms == other.privacy_terms
            && self.revocation_terms == other.revocation_terms
            && self.additional_terms == other.additional_terms
    }
}

/// Input for record creation.
///
/// `id` and `created_at` are assigned by the store when absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewConsentRecord {
    pub id: Option<RecordId>,
    pub created_at: Option<DateTime<Utc>>,
    pub title: String,
    pub date: String,
    pub party_a: Party,
    pub party_b: Party,
    pub consent_details: String,
    pub safety_measures: Vec<SafetyMeasure>,
    pub privacy_terms: String,
    pub revocation_terms: String,
    pub additional_terms: Option<String>,
}

impl NewConsentRecord {
    /// `同意协议 - 2024/3/5`
    pub fn default_title(date: NaiveDate) -> String {
        format!("同意协议 - {}/{}/{}", date.year(), date.month(), date.day())
    }

    /// Fill an empty title and date from `today`.
    pub fn with_defaults(mut self, today: NaiveDate) -> Self {
        if self.title.trim().is_empty() {
            self.title = Self::default_title(today);
        }
        if self.date.trim().is_empty() {
            self.date = today.format("%Y-%m-%d").to_string();
        }
        self
    }

    /// Copy a template's clauses and safety options into the draft.
    pub fn apply_template(&mut self, template: &ConsentTemplate) {
        self.consent_details = template.consent_details.to_string();
        self.privacy_terms = template.privacy_terms.to_string();
        self.revocation_terms = template.revocation_terms.to_string();
        self.safety_measures = template.safety_measures.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> NewConsentRecord {
        NewConsentRecord {
            title: "周末协议".into(),
            date: "2024-03-05".into(),
            party_a: Party::new("Alice", "110101199003071234"),
            party_b: Party::new("Bob", "11010119900307123X"),
            consent_details: "第一行\n第二行".into(),
            safety_measures: vec![SafetyMeasure::Contraception],
            privacy_terms: "保密".into(),
            revocation_terms: "随时撤回".into(),
            ..Default::default()
        }
    }

    #[test]
    fn mark_signed_is_one_way() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let mut record = ConsentRecord::from_draft(draft(), RecordId::generate(), created);
        let first = created + chrono::Duration::minutes(5);
        let later = created + chrono::Duration::minutes(9);

        assert!(record.mark_signed(PartySlot::A, first));
        assert!(!record.mark_signed(PartySlot::A, later));
        assert_eq!(record.signature(PartySlot::A).signed_at(), Some(first));
        assert!(!record.is_signed(PartySlot::B));
    }

    #[test]
    fn same_content_ignores_signatures() {
        let created = Utc::now();
        let record = ConsentRecord::from_draft(draft(), RecordId::generate(), created);
        let mut signed = record.clone();
        signed.mark_signed(PartySlot::B, created);
        assert!(record.same_content(&signed));

        let mut edited = record.clone();
        edited.privacy_terms.push('!');
        assert!(!record.same_content(&edited));
    }

    #[test]
    fn empty_additional_terms_are_not_given() {
        let mut d = draft();
        d.additional_terms = Some(String::new());
        let record = ConsentRecord::from_draft(d, RecordId::generate(), Utc::now());
        assert_eq!(record.additional_terms_given(), None);
        assert_eq!(record.additional_terms.as_deref(), Some(""));
    }

    #[test]
    fn signed_state_only_permits_itself() {
        let at = Utc::now();
        let signed = SignatureState::Signed { at };
        assert!(SignatureState::Unsigned.permits(&signed));
        assert!(signed.permits(&signed));
        assert!(!signed.permits(&SignatureState::Unsigned));
        assert!(!signed.permits(&SignatureState::Signed {
            at: at + chrono::Duration::seconds(1)
        }));
    }

    #[test]
    fn defaults_fill_title_and_date() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let filled = NewConsentRecord::default().with_defaults(today);
        assert_eq!(filled.title, "同意协议 - 2024/3/5");
        assert_eq!(filled.date, "2024-03-05");
    }
}
