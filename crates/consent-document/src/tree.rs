//! Render-target-agnostic document tree.

use crate::{DocumentError, DocumentResult};
use consent_types::{PartySlot, RecordId};
use serde::Serialize;

/// Section identity. Declaration order is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Title,
    Parties,
    Consent,
    Safety,
    Privacy,
    Revocation,
    AdditionalTerms,
    Signatures,
}

impl SectionKind {
    /// Sections every valid tree carries, in order.
    pub const MANDATORY: [SectionKind; 6] = [
        SectionKind::Title,
        SectionKind::Parties,
        SectionKind::Consent,
        SectionKind::Safety,
        SectionKind::Privacy,
        SectionKind::Revocation,
    ];

    /// Fixed heading; the title section uses the record title instead.
    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::Title => "协议标题",
            SectionKind::Parties => "参与方信息",
            SectionKind::Consent => "同意详情",
            SectionKind::Safety => "安全措施",
            SectionKind::Privacy => "隐私条款",
            SectionKind::Revocation => "撤回同意条款",
            SectionKind::AdditionalTerms => "额外条款",
            SectionKind::Signatures => "签名",
        }
    }

    pub fn is_mandatory(self) -> bool {
        Self::MANDATORY.contains(&self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// `label: value` on one line.
    Field { label: String, value: String },
    /// Newline-significant free text.
    Paragraph { text: String },
    /// Ordered items, rendered in the given order.
    List { items: Vec<String> },
    /// A party's identification plus whether it has signed (gates affordances).
    Party {
        slot: PartySlot,
        name: String,
        legal_id: String,
        signed: bool,
    },
    /// One signed party's attestation line.
    Signature {
        slot: PartySlot,
        name: String,
        signed_at: String,
    },
}

impl Block {
    /// Literal text a reader sees for this block, one entry per line item.
    pub fn texts(&self) -> Vec<String> {
        match self {
            Block::Field { label, value } => vec![format!("{}: {}", label, value)],
            Block::Paragraph { text } => vec![text.clone()],
            Block::List { items } => items.clone(),
            Block::Party {
                slot,
                name,
                legal_id,
                ..
            } => vec![
                format!("{}: {}", slot.label(), name),
                format!("身份证号: {}", legal_id),
            ],
            Block::Signature {
                name, signed_at, ..
            } => vec![format!("{} 已签署", name), format!("签署时间: {}", signed_at)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(kind: SectionKind, blocks: Vec<Block>) -> Self {
        Self {
            kind,
            heading: kind.heading().to_string(),
            blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTree {
    pub record_id: RecordId,
    pub title: String,
    pub sections: Vec<Section>,
}

impl DocumentTree {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.section(kind).is_some()
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    /// Check the structural contract: mandatory sections present, strictly
    /// ordered, no duplicates, conditional sections non-empty.
    pub fn validate(&self) -> DocumentResult<()> {
        for kind in SectionKind::MANDATORY {
            if !self.has_section(kind) {
                return Err(DocumentError::RenderFailure(format!(
                    "missing mandatory section {:?}",
                    kind
                )));
            }
        }
        if self.sections.windows(2).any(|pair| pair[0].kind >= pair[1].kind) {
            return Err(DocumentError::RenderFailure(
                "sections out of order or duplicated".to_string(),
            ));
        }
        if let Some(section) = self.section(SectionKind::Signatures) {
            let valid = !section.blocks.is_empty()
                && section
                    .blocks
                    .iter()
                    .all(|b| matches!(b, Block::Signature { .. }));
            if !valid {
                return Err(DocumentError::RenderFailure(
                    "signatures section must hold one block per signed party".to_string(),
                ));
            }
        }
        if let Some(section) = self.section(SectionKind::AdditionalTerms) {
            if section.blocks.iter().all(|b| b.texts().concat().is_empty()) {
                return Err(DocumentError::RenderFailure(
                    "additional terms section without text".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Party blocks, for renderers that gate affordances on signature state.
    pub fn parties(&self) -> impl Iterator<Item = &Block> {
        self.section(SectionKind::Parties)
            .into_iter()
            .flat_map(|s| s.blocks.iter())
            .filter(|b| matches!(b, Block::Party { .. }))
    }
}
