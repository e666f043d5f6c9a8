//! Renderers over [`DocumentTree`].

pub mod export;
pub mod interactive;
pub mod print;

use crate::tree::{DocumentTree, SectionKind};
use crate::DocumentResult;
use serde::Serialize;

/// One visible section as a reader sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionContent {
    pub kind: SectionKind,
    pub heading: String,
    pub texts: Vec<String>,
}

/// Ordered visible sections and their literal text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ContentSummary {
    pub sections: Vec<SectionContent>,
}

impl ContentSummary {
    /// Summary straight from the tree, the reference every renderer must match.
    pub fn of(tree: &DocumentTree) -> Self {
        Self {
            sections: tree
                .sections
                .iter()
                .map(|section| SectionContent {
                    kind: section.kind,
                    heading: section.heading.clone(),
                    texts: section.blocks.iter().flat_map(|b| b.texts()).collect(),
                })
                .collect(),
        }
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    pub fn section(&self, kind: SectionKind) -> Option<&SectionContent> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Push `text` under `kind`, opening a new section when the kind changes.
    pub(crate) fn push(&mut self, kind: SectionKind, heading: &str, text: Option<String>) {
        let open = matches!(self.sections.last(), Some(last) if last.kind == kind);
        if !open {
            self.sections.push(SectionContent {
                kind,
                heading: heading.to_string(),
                texts: Vec::new(),
            });
        }
        if let (Some(text), Some(last)) = (text, self.sections.last_mut()) {
            last.texts.push(text);
        }
    }
}

/// Anything that can report the content it shows.
pub trait HasContent {
    fn content(&self) -> ContentSummary;
}

/// Maps a document tree to one target layout.
pub trait Renderer {
    type Output: HasContent;

    /// Render `tree`, rejecting trees that break the structural contract.
    fn render(&self, tree: &DocumentTree) -> DocumentResult<Self::Output>;
}

/// Validate before rendering; contract violations are logged here once.
pub(crate) fn checked(tree: &DocumentTree, target: &str) -> DocumentResult<()> {
    tree.validate().map_err(|e| {
        tracing::error!(record_id = %tree.record_id, target, error = %e, "refusing to render document");
        e
    })
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn push_groups_by_kind() {
        let mut summary = ContentSummary::default();
        summary.push(SectionKind::Title, "t", None);
        summary.push(SectionKind::Title, "t", Some("日期: x".into()));
        summary.push(SectionKind::Consent, "同意详情", Some("a".into()));
        assert_eq!(summary.kinds(), vec![SectionKind::Title, SectionKind::Consent]);
        assert_eq!(summary.sections[0].texts, vec!["日期: x".to_string()]);
    }
}
