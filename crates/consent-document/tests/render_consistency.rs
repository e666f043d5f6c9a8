//! Cross-renderer laws over generated records.

use chrono::{Duration, TimeZone, Utc};
use consent_document::{
    project, ContentSummary, DisplaySettings, ExportRenderer, HasContent, InteractiveRenderer,
    PrintRenderer, Renderer, SectionKind, SignatureView,
};
use consent_store::{MemoryKv, RecordStore, SignatureMachine};
use consent_types::{
    ConsentRecord, FixedClock, NewConsentRecord, Party, PartySlot, RecordId, SafetyMeasure,
};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Helpers
// ============================================================================

fn summaries(record: &ConsentRecord) -> [ContentSummary; 4] {
    let tree = project(record, &SignatureView::of(record), &DisplaySettings::china());
    [
        ContentSummary::of(&tree),
        InteractiveRenderer::default().render(&tree).unwrap().content(),
        PrintRenderer::default().render(&tree).unwrap().content(),
        ExportRenderer::default().render(&tree).unwrap().content(),
    ]
}

fn build(
    title: String,
    details: String,
    measures: Vec<SafetyMeasure>,
    additional: Option<String>,
    signed: (Option<i64>, Option<i64>),
) -> ConsentRecord {
    let created = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
    let draft = NewConsentRecord {
        title,
        date: "2024-03-05".into(),
        party_a: Party::new("Alice", "110101199003071234"),
        party_b: Party::new("Bob", "11010119900307123X"),
        consent_details: details,
        safety_measures: measures,
        privacy_terms: "隐私".into(),
        revocation_terms: "撤回".into(),
        additional_terms: additional,
        ..Default::default()
    };
    let mut record = ConsentRecord::from_draft(draft, RecordId::from("gen"), created);
    if let Some(secs) = signed.0 {
        record.mark_signed(PartySlot::A, created + Duration::seconds(secs));
    }
    if let Some(secs) = signed.1 {
        record.mark_signed(PartySlot::B, created + Duration::seconds(secs));
    }
    record
}

// ============================================================================
// Strategies
// ============================================================================

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 <>&\"\n\u{4e00}-\u{4e20}]{1,40}"
}

fn measures() -> impl Strategy<Value = Vec<SafetyMeasure>> {
    proptest::sample::subsequence(SafetyMeasure::ALL.to_vec(), 0..=5).prop_shuffle()
}

fn record() -> impl Strategy<Value = ConsentRecord> {
    (
        text(),
        text(),
        measures(),
        proptest::option::of("[a-z\n]{0,10}"),
        (
            proptest::option::of(0i64..86_400),
            proptest::option::of(0i64..86_400),
        ),
    )
        .prop_map(|(title, details, measures, additional, signed)| {
            build(title, details, measures, additional, signed)
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn renderers_show_identical_content(record in record()) {
        let [reference, interactive, print, export] = summaries(&record);
        prop_assert_eq!(&reference, &interactive);
        prop_assert_eq!(&reference, &print);
        prop_assert_eq!(&reference, &export);
    }

    #[test]
    fn signatures_section_iff_any_party_signed(record in record()) {
        let [reference, ..] = summaries(&record);
        prop_assert_eq!(
            reference.section(SectionKind::Signatures).is_some(),
            record.any_signed()
        );
        if let Some(section) = reference.section(SectionKind::Signatures) {
            let signed = PartySlot::BOTH.iter().filter(|s| record.is_signed(**s)).count();
            prop_assert_eq!(section.texts.len(), signed * 2);
        }
    }
}

// ============================================================================
// Conditional section law
// ============================================================================

#[test]
fn additional_terms_section_only_when_non_empty() {
    for (terms, expected) in [(None, false), (Some(""), false), (Some("X"), true)] {
        let record = build(
            "t".into(),
            "d".into(),
            vec![],
            terms.map(str::to_string),
            (None, None),
        );
        for summary in summaries(&record) {
            let section = summary.section(SectionKind::AdditionalTerms);
            assert_eq!(section.is_some(), expected, "terms = {:?}", terms);
            if let Some(section) = section {
                assert_eq!(section.heading, "额外条款");
                assert_eq!(section.texts, vec!["X".to_string()]);
            }
        }
    }
}

// ============================================================================
// Two parties, two safety measures, signing twice
// ============================================================================

#[test]
fn alice_and_bob_scenario() {
    let created = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(created));
    let store = Arc::new(RecordStore::new(Arc::new(MemoryKv::new())).with_clock(clock.clone()));
    let machine = SignatureMachine::new(store.clone());

    let record = store
        .create(NewConsentRecord {
            title: "周末协议".into(),
            date: "2024-03-05".into(),
            party_a: Party::new("Alice", "110101199003071234"),
            party_b: Party::new("Bob", "11010119900307123X"),
            consent_details: "第一段\n第二段".into(),
            safety_measures: vec![SafetyMeasure::SafeWords, SafetyMeasure::Contraception],
            privacy_terms: "privacy".into(),
            revocation_terms: "revocation".into(),
            ..Default::default()
        })
        .unwrap();

    let unsigned = [
        SectionKind::Title,
        SectionKind::Parties,
        SectionKind::Consent,
        SectionKind::Safety,
        SectionKind::Privacy,
        SectionKind::Revocation,
    ];
    for summary in summaries(&store.get(&record.id).unwrap()) {
        assert_eq!(summary.kinds(), unsigned);
        assert!(summary.section(SectionKind::Signatures).is_none());
    }

    clock.advance(Duration::seconds(189));
    let first = machine.sign(&record.id, PartySlot::A).unwrap();
    assert!(first.changed);
    clock.advance(Duration::minutes(10));
    let second = machine.sign(&record.id, PartySlot::A).unwrap();
    assert!(!second.changed);

    let stored = store.get(&record.id).unwrap();
    assert_eq!(stored, first.record);
    assert_eq!(
        stored.signature(PartySlot::A).signed_at(),
        Some(created + Duration::seconds(189))
    );

    let [reference, interactive, print, export] = summaries(&stored);
    assert_eq!(reference, interactive);
    assert_eq!(reference, print);
    assert_eq!(reference, export);

    let mut signed = unsigned.to_vec();
    signed.push(SectionKind::Signatures);
    assert_eq!(reference.kinds(), signed);

    let safety = reference.section(SectionKind::Safety).unwrap();
    assert_eq!(safety.texts, vec!["使用安全词", "使用避孕措施"]);

    let signatures = reference.section(SectionKind::Signatures).unwrap();
    assert_eq!(
        signatures.texts,
        vec!["Alice 已签署", "签署时间: 2024/3/5 14:03:09"]
    );
    assert!(reference.section(SectionKind::AdditionalTerms).is_none());

    let tree = project(&stored, &SignatureView::of(&stored), &DisplaySettings::china());
    let view = InteractiveRenderer::default().render(&tree).unwrap();
    assert_eq!(view.signable(), vec![PartySlot::B]);
}
