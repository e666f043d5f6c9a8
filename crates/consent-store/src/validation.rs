//! Creation-time checks. Records are validated once, at the store boundary.

use crate::{FieldError, StoreError, StoreResult};
use consent_types::NewConsentRecord;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// 15 digits, 18 digits, or 17 digits followed by a check character X.
fn resident_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(^\d{15}$)|(^\d{18}$)|(^\d{17}(\d|X|x)$)").expect("static pattern compiles")
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Validator {
    /// Require legal ids in resident id card format.
    pub strict_legal_id: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            strict_legal_id: true,
        }
    }
}

impl Validator {
    pub fn lenient() -> Self {
        Self {
            strict_legal_id: false,
        }
    }

    pub fn validate(&self, draft: &NewConsentRecord) -> StoreResult<()> {
        let mut errors = Vec::new();

        let required: [(&'static str, &str); 9] = [
            ("title", &draft.title),
            ("date", &draft.date),
            ("partyA.name", &draft.party_a.name),
            ("partyA.legalId", &draft.party_a.legal_id),
            ("partyB.name", &draft.party_b.name),
            ("partyB.legalId", &draft.party_b.legal_id),
            ("consentDetails", &draft.consent_details),
            ("privacyTerms", &draft.privacy_terms),
            ("revocationTerms", &draft.revocation_terms),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field,
                    message: "required".to_string(),
                });
            }
        }

        if self.strict_legal_id {
            for (field, value) in [
                ("partyA.legalId", &draft.party_a.legal_id),
                ("partyB.legalId", &draft.party_b.legal_id),
            ] {
                if !value.trim().is_empty() && !resident_id_pattern().is_match(value) {
                    errors.push(FieldError {
                        field,
                        message: "not a valid resident id number".to_string(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for measure in &draft.safety_measures {
            if !seen.insert(*measure) {
                errors.push(FieldError {
                    field: "safetyMeasures",
                    message: format!("duplicate option: {}", measure),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }
}
