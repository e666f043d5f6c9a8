//! Print-formatted HTML.

use super::{checked, escape_html, ContentSummary, HasContent, Renderer};
use crate::tree::{Block, DocumentTree, SectionKind};
use crate::DocumentResult;
use consent_types::RecordId;

/// Physical page the print stylesheet targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSetup {
    pub size: &'static str,
    pub margin: &'static str,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            size: "A4",
            margin: "1.5cm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintLine {
    Text(String),
    Item(String),
}

impl PrintLine {
    fn text(&self) -> &str {
        match self {
            PrintLine::Text(t) | PrintLine::Item(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintSection {
    pub kind: SectionKind,
    pub heading: String,
    pub lines: Vec<PrintLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    pub record_id: RecordId,
    pub title: String,
    pub page: PageSetup,
    pub sections: Vec<PrintSection>,
}

impl PrintDocument {
    /// Class of the single container holding all printable content.
    pub const CONTAINER_CLASS: &'static str = "print-content";

    /// Stylesheet scoped to print media: only the container is visible and
    /// controls are hidden.
    pub fn stylesheet(&self) -> String {
        format!(
            "@media print {{\n\
             \x20 body * {{ visibility: hidden; }}\n\
             \x20 .{c}, .{c} * {{ visibility: visible; }}\n\
             \x20 .{c} {{ position: absolute; left: 0; top: 0; width: 100%; }}\n\
             \x20 .btn, button, .no-print {{ display: none !important; }}\n\
             \x20 .section {{ page-break-inside: avoid; margin-bottom: 16px; }}\n\
             \x20 @page {{ size: {size}; margin: {margin}; }}\n\
             }}\n",
            c = Self::CONTAINER_CLASS,
            size = self.page.size,
            margin = self.page.margin,
        )
    }

    /// The `.print-content` container alone.
    pub fn container_html(&self) -> String {
        let mut out = format!("<div class=\"{}\">\n", Self::CONTAINER_CLASS);
        for section in &self.sections {
            out.push_str("<div class=\"section\">\n");
            if section.kind == SectionKind::Title {
                out.push_str(&format!("<h1>{}</h1>\n", escape_html(&section.heading)));
            } else {
                out.push_str(&format!("<h2>{}</h2>\n", escape_html(&section.heading)));
            }
            let mut in_list = false;
            for line in &section.lines {
                match line {
                    PrintLine::Item(text) => {
                        if !in_list {
                            out.push_str("<ul>\n");
                            in_list = true;
                        }
                        out.push_str(&format!("<li>{}</li>\n", escape_html(text)));
                    }
                    PrintLine::Text(text) => {
                        if in_list {
                            out.push_str("</ul>\n");
                            in_list = false;
                        }
                        out.push_str(&format!(
                            "<p style=\"white-space: pre-line\">{}</p>\n",
                            escape_html(text)
                        ));
                    }
                }
            }
            if in_list {
                out.push_str("</ul>\n");
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
        out
    }

    /// Standalone page for the system print dialog.
    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_html(&self.title),
            self.stylesheet(),
            self.container_html()
        )
    }
}

impl HasContent for PrintDocument {
    fn content(&self) -> ContentSummary {
        let mut summary = ContentSummary::default();
        for section in &self.sections {
            summary.push(section.kind, &section.heading, None);
            for line in &section.lines {
                summary.push(section.kind, &section.heading, Some(line.text().to_string()));
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrintRenderer {
    page: PageSetup,
}

impl PrintRenderer {
    pub fn new(page: PageSetup) -> Self {
        Self { page }
    }
}

impl Renderer for PrintRenderer {
    type Output = PrintDocument;

    fn render(&self, tree: &DocumentTree) -> DocumentResult<PrintDocument> {
        checked(tree, "print")?;
        let sections = tree
            .sections
            .iter()
            .map(|section| PrintSection {
                kind: section.kind,
                heading: section.heading.clone(),
                lines: section
                    .blocks
                    .iter()
                    .flat_map(|block| {
                        let texts = block.texts();
                        let item = matches!(block, Block::List { .. });
                        texts.into_iter().map(move |t| {
                            if item {
                                PrintLine::Item(t)
                            } else {
                                PrintLine::Text(t)
                            }
                        })
                    })
                    .collect(),
            })
            .collect();

        Ok(PrintDocument {
            record_id: tree.record_id.clone(),
            title: tree.title.clone(),
            page: self.page.clone(),
            sections,
        })
    }
}
