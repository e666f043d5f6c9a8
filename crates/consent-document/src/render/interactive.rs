//! Terminal view with sign affordances.

use super::{checked, ContentSummary, HasContent, Renderer};
use crate::locale::DisplaySettings;
use crate::tree::{Block, DocumentTree, SectionKind};
use crate::DocumentResult;
use colored::*;
use consent_types::{ConsentRecord, PartySlot, RecordId};
use serde::Serialize;

/// Controls the user can act on. Never part of the document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Affordance {
    SignButton { slot: PartySlot },
    SignedBadge { slot: PartySlot },
    Print,
    Export,
    BackToList,
}

impl Affordance {
    pub fn label(&self) -> &'static str {
        match self {
            Affordance::SignButton { .. } => "点击签署",
            Affordance::SignedBadge { .. } => "已签署",
            Affordance::Print => "打印",
            Affordance::Export => "导出图片",
            Affordance::BackToList => "返回列表",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ViewNode {
    Line { text: String, emphasis: bool },
    Bullet { text: String },
    Action { affordance: Affordance },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSection {
    pub kind: SectionKind,
    pub heading: String,
    pub nodes: Vec<ViewNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveView {
    pub record_id: RecordId,
    pub toolbar: Vec<Affordance>,
    pub sections: Vec<ViewSection>,
}

impl InteractiveView {
    /// Every affordance in display order, toolbar first.
    pub fn affordances(&self) -> Vec<Affordance> {
        let inline = self.sections.iter().flat_map(|s| &s.nodes).filter_map(|n| match n {
            ViewNode::Action { affordance } => Some(*affordance),
            _ => None,
        });
        self.toolbar.iter().copied().chain(inline).collect()
    }

    /// Parties that can still sign from this view.
    pub fn signable(&self) -> Vec<PartySlot> {
        self.affordances()
            .into_iter()
            .filter_map(|a| match a {
                Affordance::SignButton { slot } => Some(slot),
                _ => None,
            })
            .collect()
    }

    pub fn render_ansi(&self) -> String {
        let mut out = String::new();
        let toolbar: Vec<String> = self
            .toolbar
            .iter()
            .map(|a| format!("[{}]", a.label()))
            .collect();
        out.push_str(&format!("{}\n\n", toolbar.join(" ").dimmed()));

        for section in &self.sections {
            if section.kind == SectionKind::Title {
                out.push_str(&format!("{}\n", section.heading.bold()));
            } else {
                out.push_str(&format!("\n{}\n", section.heading.cyan().bold()));
            }
            for node in &section.nodes {
                match node {
                    ViewNode::Line { text, emphasis } => {
                        for line in text.lines() {
                            if *emphasis {
                                out.push_str(&format!("  {}\n", line.green()));
                            } else {
                                out.push_str(&format!("  {}\n", line));
                            }
                        }
                    }
                    ViewNode::Bullet { text } => out.push_str(&format!("  • {}\n", text)),
                    ViewNode::Action { affordance } => {
                        let label = match affordance {
                            Affordance::SignedBadge { .. } => {
                                format!("✓ {}", affordance.label()).green()
                            }
                            _ => format!("[{}]", affordance.label()).yellow(),
                        };
                        out.push_str(&format!("    {}\n", label));
                    }
                }
            }
        }
        out
    }
}

impl HasContent for InteractiveView {
    fn content(&self) -> ContentSummary {
        let mut summary = ContentSummary::default();
        for section in &self.sections {
            summary.push(section.kind, &section.heading, None);
            for node in &section.nodes {
                match node {
                    ViewNode::Line { text, .. } | ViewNode::Bullet { text } => {
                        summary.push(section.kind, &section.heading, Some(text.clone()))
                    }
                    ViewNode::Action { .. } => {}
                }
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractiveRenderer {
    display: DisplaySettings,
}

impl InteractiveRenderer {
    pub fn new(display: DisplaySettings) -> Self {
        Self { display }
    }

    /// Rows for the record list, in stored order.
    pub fn list(&self, records: &[ConsentRecord]) -> ListView {
        ListView {
            rows: records
                .iter()
                .map(|r| ListRow {
                    id: r.id.clone(),
                    title: r.title.clone(),
                    date: r.date.clone(),
                    parties: format!("{} 和 {}", r.party_a.name, r.party_b.name),
                    created: self.display.format_date(r.created_at),
                    party_a_signed: r.is_signed(PartySlot::A),
                    party_b_signed: r.is_signed(PartySlot::B),
                })
                .collect(),
        }
    }
}

impl Renderer for InteractiveRenderer {
    type Output = InteractiveView;

    fn render(&self, tree: &DocumentTree) -> DocumentResult<InteractiveView> {
        checked(tree, "interactive")?;
        let sections = tree
            .sections
            .iter()
            .map(|section| {
                let mut nodes = Vec::new();
                for block in &section.blocks {
                    match block {
                        Block::List { items } => nodes.extend(
                            items.iter().map(|text| ViewNode::Bullet { text: text.clone() }),
                        ),
                        Block::Party { slot, signed, .. } => {
                            nodes.extend(block.texts().into_iter().map(|text| ViewNode::Line {
                                text,
                                emphasis: false,
                            }));
                            let affordance = if *signed {
                                Affordance::SignedBadge { slot: *slot }
                            } else {
                                Affordance::SignButton { slot: *slot }
                            };
                            nodes.push(ViewNode::Action { affordance });
                        }
                        Block::Signature { .. } => {
                            nodes.extend(block.texts().into_iter().map(|text| ViewNode::Line {
                                text,
                                emphasis: true,
                            }))
                        }
                        Block::Field { .. } | Block::Paragraph { .. } => {
                            nodes.extend(block.texts().into_iter().map(|text| ViewNode::Line {
                                text,
                                emphasis: false,
                            }))
                        }
                    }
                }
                ViewSection {
                    kind: section.kind,
                    heading: section.heading.clone(),
                    nodes,
                }
            })
            .collect();

        Ok(InteractiveView {
            record_id: tree.record_id.clone(),
            toolbar: vec![Affordance::Print, Affordance::Export, Affordance::BackToList],
            sections,
        })
    }
}

/// One row of the record list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: RecordId,
    pub title: String,
    pub date: String,
    pub parties: String,
    pub created: String,
    pub party_a_signed: bool,
    pub party_b_signed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ListView {
    pub rows: Vec<ListRow>,
}

impl ListView {
    pub const EMPTY_STATE: &'static str = "暂无协议";

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render_ansi(&self) -> String {
        if self.rows.is_empty() {
            return format!("{}\n", Self::EMPTY_STATE.dimmed());
        }
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&format!("{}  {}\n", row.title.bold(), row.id.short().dimmed()));
            out.push_str(&format!("  日期: {}\n", row.date));
            out.push_str(&format!("  {}\n", row.parties));
            out.push_str(&format!("  创建于 {}\n", row.created.dimmed()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{project, SignatureView};
    use chrono::{TimeZone, Utc};
    use consent_types::{NewConsentRecord, Party, SafetyMeasure};

    fn record() -> ConsentRecord {
        let draft = NewConsentRecord {
            title: "t".into(),
            date: "2024-03-05".into(),
            party_a: Party::new("Alice", "110101199003071234"),
            party_b: Party::new("Bob", "11010119900307123X"),
            consent_details: "d".into(),
            safety_measures: vec![SafetyMeasure::Other],
            privacy_terms: "p".into(),
            revocation_terms: "r".into(),
            ..Default::default()
        };
        ConsentRecord::from_draft(
            draft,
            RecordId::from("r-1"),
            Utc.with_ymd_and_hms(2024, 3, 5, 20, 0, 0).unwrap(),
        )
    }

    #[test]
    fn sign_buttons_follow_signature_state() {
        let mut r = record();
        r.mark_signed(PartySlot::A, Utc::now());
        let tree = project(&r, &SignatureView::of(&r), &DisplaySettings::china());
        let view = InteractiveRenderer::default().render(&tree).unwrap();

        assert_eq!(view.signable(), vec![PartySlot::B]);
        assert!(view
            .affordances()
            .contains(&Affordance::SignedBadge { slot: PartySlot::A }));
        assert_eq!(view.content(), ContentSummary::of(&tree));
    }

    #[test]
    fn list_rows_join_party_names() {
        let list = InteractiveRenderer::default().list(&[record()]);
        assert_eq!(list.rows[0].parties, "Alice 和 Bob");
        assert_eq!(list.rows[0].created, "2024/3/6");
    }

    #[test]
    fn empty_list_shows_empty_state() {
        let list = InteractiveRenderer::default().list(&[]);
        assert!(list.is_empty());
        assert!(list.render_ansi().contains("暂无协议"));
    }
}
