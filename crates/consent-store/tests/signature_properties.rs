//! Property tests: signing is idempotent and monotonic.

use chrono::{Duration, TimeZone, Utc};
use consent_store::{MemoryKv, RecordStore, SignatureMachine, StoreError};
use consent_types::{FixedClock, NewConsentRecord, Party, PartySlot, RecordId, SafetyMeasure};
use proptest::prelude::*;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn draft(index: usize) -> NewConsentRecord {
    NewConsentRecord {
        title: format!("协议 {}", index),
        date: "2024-03-05".into(),
        party_a: Party::new("Alice", "110101199003071234"),
        party_b: Party::new("Bob", "11010119900307123X"),
        consent_details: "details".into(),
        safety_measures: vec![SafetyMeasure::SafeWords],
        privacy_terms: "privacy".into(),
        revocation_terms: "revocation".into(),
        ..Default::default()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Sign(usize, PartySlot),
    Tick(i64),
    Create,
    Delete(usize),
}

fn arb_slot() -> impl Strategy<Value = PartySlot> {
    prop_oneof![Just(PartySlot::A), Just(PartySlot::B)]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..4, arb_slot()).prop_map(|(i, s)| Op::Sign(i, s)),
        2 => (1i64..600).prop_map(Op::Tick),
        1 => Just(Op::Create),
        1 => (0usize..4).prop_map(Op::Delete),
    ]
}

fn fixture() -> (Arc<FixedClock>, Arc<RecordStore>, SignatureMachine) {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap(),
    ));
    let store = Arc::new(RecordStore::new(Arc::new(MemoryKv::new())).with_clock(clock.clone()));
    let machine = SignatureMachine::new(store.clone());
    (clock, store, machine)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Signing the same party any number of times keeps the first instant.
    #[test]
    fn repeated_signing_keeps_first_instant(
        slot in arb_slot(),
        repeats in 1usize..6,
        gap_secs in 1i64..10_000,
    ) {
        let (clock, store, machine) = fixture();
        let id = store.create(draft(0)).unwrap().id;

        let first = machine.sign(&id, slot).unwrap();
        prop_assert!(first.changed);
        let signed_at = first.record.signature(slot).signed_at();

        for _ in 0..repeats {
            clock.advance(Duration::seconds(gap_secs));
            let again = machine.sign(&id, slot).unwrap();
            prop_assert!(!again.changed);
            prop_assert_eq!(again.record.signature(slot).signed_at(), signed_at);
        }
        prop_assert_eq!(store.get(&id).unwrap().signature(slot).signed_at(), signed_at);
    }

    /// No operation sequence takes a signed party back to unsigned or moves
    /// its instant.
    #[test]
    fn signatures_never_regress(ops in prop::collection::vec(arb_op(), 1..40)) {
        let (clock, store, machine) = fixture();
        let mut ids: Vec<RecordId> = (0..2).map(|i| store.create(draft(i)).unwrap().id).collect();
        let mut seen = std::collections::HashMap::new();

        for op in ops {
            match op {
                Op::Sign(i, slot) => {
                    if let Some(id) = ids.get(i % ids.len().max(1)) {
                        machine.sign(id, slot).unwrap();
                    }
                }
                Op::Tick(secs) => clock.advance(Duration::seconds(secs)),
                Op::Create => ids.push(store.create(draft(ids.len())).unwrap().id),
                Op::Delete(i) => {
                    if !ids.is_empty() {
                        let id = ids.remove(i % ids.len());
                        store.delete(&id).unwrap();
                        seen.retain(|(rid, _): &(RecordId, PartySlot), _| rid != &id);
                    }
                }
            }

            for record in store.list().unwrap() {
                for slot in PartySlot::BOTH {
                    let key = (record.id.clone(), slot);
                    let state = record.signature(slot);
                    if let Some(previous) = seen.get(&key) {
                        prop_assert_eq!(&state, previous);
                    }
                    if state.is_signed() {
                        seen.insert(key, state);
                    }
                }
            }
        }
    }
}

#[test]
fn store_refuses_to_unsign_through_update() {
    let (_, store, machine) = fixture();
    let id = store.create(draft(0)).unwrap().id;
    machine.sign(&id, PartySlot::A).unwrap();

    let err = store
        .update(&id, |record| {
            *record = consent_types::ConsentRecord::from_draft(
                draft(0),
                record.id.clone(),
                record.created_at,
            );
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::InvariantViolation(_)));
    assert!(store.get(&id).unwrap().is_signed(PartySlot::A));
}
