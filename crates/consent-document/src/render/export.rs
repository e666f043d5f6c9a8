//! Fixed-width, fully inline-styled layout for rasterization.
//!
//! Colors are absolute [`Rgb`] triples; a relative or function-based color
//! cannot be expressed, so a rasterizer never has to resolve one.

use super::{checked, escape_html, ContentSummary, HasContent, Renderer};
use crate::tree::{Block, DocumentTree, SectionKind};
use crate::DocumentResult;
use consent_types::RecordId;
use serde::Serialize;

/// Default logical width in pixels.
pub const EXPORT_WIDTH: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub panel: Rgb,
    pub border: Rgb,
    pub accent: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb::WHITE,
            text: Rgb::BLACK,
            muted: Rgb(85, 85, 85),
            panel: Rgb(249, 249, 249),
            border: Rgb(238, 238, 238),
            accent: Rgb(22, 101, 52),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InlineStyle {
    pub color: Rgb,
    pub background: Option<Rgb>,
    pub border: Option<Rgb>,
    pub font_size_px: u32,
    pub bold: bool,
    pub padding_px: u32,
    pub margin_bottom_px: u32,
}

impl InlineStyle {
    pub fn css(&self) -> String {
        let mut css = format!(
            "color: {}; font-size: {}px; font-weight: {}; padding: {}px; margin: 0 0 {}px 0; white-space: pre-line;",
            self.color.css(),
            self.font_size_px,
            if self.bold { 700 } else { 400 },
            self.padding_px,
            self.margin_bottom_px
        );
        if let Some(bg) = self.background {
            css.push_str(&format!(" background-color: {};", bg.css()));
        }
        if let Some(border) = self.border {
            css.push_str(&format!(" border: 1px solid {};", border.css()));
        }
        css
    }
}

/// Whether the rasterizer captures a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capture {
    Include,
    /// Status badges and loading indicators: skipped, never an error.
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRole {
    Title,
    Heading,
    Body,
    ListItem,
    Badge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportBlock {
    pub section: SectionKind,
    pub role: BlockRole,
    pub text: String,
    pub style: InlineStyle,
    pub capture: Capture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportLayout {
    pub record_id: RecordId,
    pub title: String,
    pub width: u32,
    pub padding_px: u32,
    pub background: Rgb,
    pub blocks: Vec<ExportBlock>,
}

impl ExportLayout {
    pub fn captured(&self) -> impl Iterator<Item = &ExportBlock> {
        self.blocks.iter().filter(|b| b.capture == Capture::Include)
    }

    /// Self-contained HTML. Excluded blocks carry the `badge` class.
    pub fn to_html(&self) -> String {
        let mut out = format!(
            "<div class=\"export-root\" style=\"width: {}px; padding: {}px; background-color: {}; font-family: sans-serif; box-sizing: border-box;\">\n",
            self.width,
            self.padding_px,
            self.background.css()
        );
        for block in &self.blocks {
            let class = match block.capture {
                Capture::Include => "",
                Capture::Exclude => " class=\"badge\"",
            };
            out.push_str(&format!(
                "<div{} style=\"{}\">{}</div>\n",
                class,
                block.style.css(),
                escape_html(&block.text)
            ));
        }
        out.push_str("</div>\n");
        out
    }
}

impl HasContent for ExportLayout {
    fn content(&self) -> ContentSummary {
        let mut summary = ContentSummary::default();
        let mut heading = String::new();
        for block in &self.blocks {
            match block.role {
                BlockRole::Title | BlockRole::Heading => {
                    heading = block.text.clone();
                    summary.push(block.section, &heading, None);
                }
                BlockRole::Body | BlockRole::ListItem => {
                    summary.push(block.section, &heading, Some(block.text.clone()))
                }
                BlockRole::Badge => {}
            }
        }
        summary
    }
}

#[derive(Debug, Clone)]
pub struct ExportRenderer {
    width: u32,
    palette: Palette,
}

impl Default for ExportRenderer {
    fn default() -> Self {
        Self {
            width: EXPORT_WIDTH,
            palette: Palette::default(),
        }
    }
}

impl ExportRenderer {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    fn style(&self, role: BlockRole) -> InlineStyle {
        let p = &self.palette;
        match role {
            BlockRole::Title => InlineStyle {
                color: p.text,
                background: None,
                border: None,
                font_size_px: 24,
                bold: true,
                padding_px: 0,
                margin_bottom_px: 12,
            },
            BlockRole::Heading => InlineStyle {
                color: p.text,
                background: None,
                border: None,
                font_size_px: 18,
                bold: true,
                padding_px: 0,
                margin_bottom_px: 8,
            },
            BlockRole::Body | BlockRole::ListItem => InlineStyle {
                color: p.muted,
                background: Some(p.panel),
                border: Some(p.border),
                font_size_px: 14,
                bold: false,
                padding_px: 8,
                margin_bottom_px: 8,
            },
            BlockRole::Badge => InlineStyle {
                color: p.accent,
                background: None,
                border: Some(p.accent),
                font_size_px: 12,
                bold: false,
                padding_px: 2,
                margin_bottom_px: 4,
            },
        }
    }

    fn block(&self, section: SectionKind, role: BlockRole, text: String) -> ExportBlock {
        ExportBlock {
            section,
            role,
            text,
            style: self.style(role),
            capture: if role == BlockRole::Badge {
                Capture::Exclude
            } else {
                Capture::Include
            },
        }
    }
}

impl Renderer for ExportRenderer {
    type Output = ExportLayout;

    fn render(&self, tree: &DocumentTree) -> DocumentResult<ExportLayout> {
        checked(tree, "export")?;
        let mut blocks = Vec::new();
        for section in &tree.sections {
            let role = if section.kind == SectionKind::Title {
                BlockRole::Title
            } else {
                BlockRole::Heading
            };
            blocks.push(self.block(section.kind, role, section.heading.clone()));
            for block in &section.blocks {
                let role = match block {
                    Block::List { .. } => BlockRole::ListItem,
                    _ => BlockRole::Body,
                };
                for text in block.texts() {
                    blocks.push(self.block(section.kind, role, text));
                }
                if let Block::Party { signed: true, .. } = block {
                    blocks.push(self.block(section.kind, BlockRole::Badge, "已签署".to_string()));
                }
            }
        }

        Ok(ExportLayout {
            record_id: tree.record_id.clone(),
            title: tree.title.clone(),
            width: self.width,
            padding_px: 40,
            background: self.palette.background,
            blocks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Section;
    use consent_types::PartySlot;

    fn tree(signed: bool) -> DocumentTree {
        let para = |t: &str| vec![Block::Paragraph { text: t.into() }];
        DocumentTree {
            record_id: RecordId::from("r"),
            title: "协议".into(),
            sections: vec![
                Section {
                    kind: SectionKind::Title,
                    heading: "协议".into(),
                    blocks: vec![],
                },
                Section::new(
                    SectionKind::Parties,
                    vec![Block::Party {
                        slot: PartySlot::A,
                        name: "Alice".into(),
                        legal_id: "1".into(),
                        signed,
                    }],
                ),
                Section::new(SectionKind::Consent, para("c")),
                Section::new(SectionKind::Safety, vec![Block::List { items: vec![] }]),
                Section::new(SectionKind::Privacy, para("p")),
                Section::new(SectionKind::Revocation, para("r")),
            ],
        }
    }

    #[test]
    fn layout_is_fixed_width_on_white() {
        let layout = ExportRenderer::default().render(&tree(false)).unwrap();
        assert_eq!(layout.width, 800);
        assert_eq!(layout.background, Rgb::WHITE);
        let html = layout.to_html();
        assert!(html.contains("width: 800px"));
        assert!(html.contains("background-color: rgb(255, 255, 255)"));
        assert!(!html.contains("oklch"));
    }

    #[test]
    fn badges_are_excluded_from_capture_and_content() {
        let t = tree(true);
        let layout = ExportRenderer::default().render(&t).unwrap();
        let badge = layout
            .blocks
            .iter()
            .find(|b| b.role == BlockRole::Badge)
            .unwrap();
        assert_eq!(badge.capture, Capture::Exclude);
        assert!(layout.captured().all(|b| b.role != BlockRole::Badge));
        assert!(layout.to_html().contains("class=\"badge\""));
        assert_eq!(layout.content(), ContentSummary::of(&t));
    }

    #[test]
    fn every_block_has_absolute_colors() {
        let layout = ExportRenderer::default().render(&tree(true)).unwrap();
        for block in &layout.blocks {
            assert!(block.style.css().contains("color: rgb("));
        }
    }
}
