//! Record to document tree projection.

use crate::locale::DisplaySettings;
use crate::tree::{Block, DocumentTree, Section, SectionKind};
use chrono::{DateTime, Utc};
use consent_types::{ConsentRecord, PartySlot, SignatureState};

/// Signature state as the projector sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureView {
    pub a: SignatureState,
    pub b: SignatureState,
}

impl SignatureView {
    pub fn of(record: &ConsentRecord) -> Self {
        Self {
            a: record.signature(PartySlot::A),
            b: record.signature(PartySlot::B),
        }
    }

    pub fn get(&self, slot: PartySlot) -> SignatureState {
        match slot {
            PartySlot::A => self.a,
            PartySlot::B => self.b,
        }
    }

    pub fn signed_at(&self, slot: PartySlot) -> Option<DateTime<Utc>> {
        self.get(slot).signed_at()
    }

    pub fn any_signed(&self) -> bool {
        self.a.is_signed() || self.b.is_signed()
    }
}

/// Build the document tree for `record`.
///
/// Pure: equal inputs give equal trees. Signature state is read from
/// `signatures` only, never from the record.
pub fn project(
    record: &ConsentRecord,
    signatures: &SignatureView,
    display: &DisplaySettings,
) -> DocumentTree {
    let mut sections = Vec::with_capacity(8);

    sections.push(Section {
        kind: SectionKind::Title,
        heading: record.title.clone(),
        blocks: vec![Block::Field {
            label: "日期".to_string(),
            value: record.date.clone(),
        }],
    });

    let parties = PartySlot::BOTH
        .iter()
        .map(|slot| {
            let party = record.party(*slot);
            Block::Party {
                slot: *slot,
                name: party.name.clone(),
                legal_id: party.legal_id.clone(),
                signed: signatures.get(*slot).is_signed(),
            }
        })
        .collect();
    sections.push(Section::new(SectionKind::Parties, parties));

    sections.push(Section::new(
        SectionKind::Consent,
        vec![Block::Paragraph {
            text: record.consent_details.clone(),
        }],
    ));
    sections.push(Section::new(
        SectionKind::Safety,
        vec![Block::List {
            items: record
                .safety_measures
                .iter()
                .map(|m| m.label().to_string())
                .collect(),
        }],
    ));
    sections.push(Section::new(
        SectionKind::Privacy,
        vec![Block::Paragraph {
            text: record.privacy_terms.clone(),
        }],
    ));
    sections.push(Section::new(
        SectionKind::Revocation,
        vec![Block::Paragraph {
            text: record.revocation_terms.clone(),
        }],
    ));

    if let Some(terms) = record.additional_terms_given() {
        sections.push(Section::new(
            SectionKind::AdditionalTerms,
            vec![Block::Paragraph {
                text: terms.to_string(),
            }],
        ));
    }

    if signatures.any_signed() {
        let blocks = PartySlot::BOTH
            .iter()
            .filter_map(|slot| {
                signatures.signed_at(*slot).map(|at| Block::Signature {
                    slot: *slot,
                    name: record.party(*slot).name.clone(),
                    signed_at: display.format_instant(at),
                })
            })
            .collect();
        sections.push(Section::new(SectionKind::Signatures, blocks));
    }

    DocumentTree {
        record_id: record.id.clone(),
        title: record.title.clone(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use consent_types::{NewConsentRecord, Party, RecordId, SafetyMeasure};

    fn record(additional: Option<&str>) -> ConsentRecord {
        let draft = NewConsentRecord {
            title: "周末协议".into(),
            date: "2024-03-05".into(),
            party_a: Party::new("Alice", "110101199003071234"),
            party_b: Party::new("Bob", "11010119900307123X"),
            consent_details: "details".into(),
            safety_measures: vec![SafetyMeasure::SafeWords, SafetyMeasure::Contraception],
            privacy_terms: "privacy".into(),
            revocation_terms: "revocation".into(),
            additional_terms: additional.map(str::to_string),
            ..Default::default()
        };
        ConsentRecord::from_draft(
            draft,
            RecordId::from("r-1"),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn unsigned_record_has_mandatory_sections_only() {
        let r = record(None);
        let tree = project(&r, &SignatureView::of(&r), &DisplaySettings::china());
        assert_eq!(tree.kinds(), SectionKind::MANDATORY.to_vec());
        assert_eq!(tree.sections[0].heading, "周末协议");
        tree.validate().unwrap();
    }

    #[test]
    fn safety_list_keeps_stored_order() {
        let r = record(None);
        let tree = project(&r, &SignatureView::of(&r), &DisplaySettings::china());
        let safety = tree.section(SectionKind::Safety).unwrap();
        assert_eq!(
            safety.blocks[0].texts(),
            vec!["使用安全词".to_string(), "使用避孕措施".to_string()]
        );
    }

    #[test]
    fn signature_block_per_signed_party() {
        let mut r = record(Some("extra"));
        r.mark_signed(
            PartySlot::B,
            Utc.with_ymd_and_hms(2024, 3, 5, 6, 3, 9).unwrap(),
        );
        let tree = project(&r, &SignatureView::of(&r), &DisplaySettings::china());
        assert!(tree.has_section(SectionKind::AdditionalTerms));
        let signatures = tree.section(SectionKind::Signatures).unwrap();
        assert_eq!(signatures.blocks.len(), 1);
        assert_eq!(
            signatures.blocks[0].texts(),
            vec!["Bob 已签署".to_string(), "签署时间: 2024/3/5 14:03:09".to_string()]
        );
        tree.validate().unwrap();
    }

    #[test]
    fn projection_reads_signatures_from_view() {
        let r = record(None);
        let mut view = SignatureView::of(&r);
        view.a = SignatureState::Signed {
            at: Utc.with_ymd_and_hms(2024, 3, 5, 1, 0, 0).unwrap(),
        };
        let tree = project(&r, &view, &DisplaySettings::china());
        assert!(tree.has_section(SectionKind::Signatures));
    }

    #[test]
    fn projecting_twice_is_equal() {
        let r = record(Some("x"));
        let view = SignatureView::of(&r);
        let settings = DisplaySettings::china();
        assert_eq!(project(&r, &view, &settings), project(&r, &view, &settings));
    }

    #[test]
    fn validate_rejects_missing_or_misordered_sections() {
        let r = record(None);
        let mut tree = project(&r, &SignatureView::of(&r), &DisplaySettings::china());
        tree.sections.swap(1, 2);
        assert!(tree.validate().is_err());
        tree.sections.remove(1);
        assert!(tree.validate().is_err());
    }
}
