//! # Consent Document
//!
//! One projection, three sinks.
//!
//! ```text
//! ConsentRecord + SignatureView
//!          │ project()
//!          ▼
//!     DocumentTree ──► InteractiveRenderer ──► InteractiveView (terminal)
//!          ├─────────► PrintRenderer       ──► PrintDocument   (@media print HTML)
//!          └─────────► ExportRenderer      ──► ExportLayout    (inline-styled, fixed width)
//! ```
//!
//! Every renderer reports a [`ContentSummary`]: the visible section names and
//! their literal text. For one tree the three summaries are equal; only
//! layout, media scoping and styling differ.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod locale;
pub mod projector;
pub mod render;
pub mod tree;

pub use error::{DocumentError, DocumentResult};
pub use locale::{DisplayLocale, DisplaySettings};
pub use projector::{project, SignatureView};
pub use render::export::{
    BlockRole, Capture, ExportBlock, ExportLayout, ExportRenderer, InlineStyle, Palette, Rgb,
    EXPORT_WIDTH,
};
pub use render::interactive::{
    Affordance, InteractiveRenderer, InteractiveView, ListRow, ListView, ViewNode, ViewSection,
};
pub use render::print::{PageSetup, PrintDocument, PrintLine, PrintRenderer, PrintSection};
pub use render::{ContentSummary, HasContent, Renderer, SectionContent};
pub use tree::{Block, DocumentTree, Section, SectionKind};
