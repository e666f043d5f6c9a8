//! # Consent Export
//!
//! Turns a record into a downloadable PNG, and hands print documents to the
//! system print dialog.
//!
//! ```text
//! Idle → Preparing → Rendering → Rasterizing → Delivering → Idle
//!            └──────────┴─────────────┴─────────────┴──→ Failed → Idle
//! ```
//!
//! Everything an export attaches to the [`HostDocument`] (progress indicator,
//! offscreen surface) is held by a guard and detached when the guard drops,
//! so no exit path leaves an attachment behind.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod delivery;
pub mod encode;
mod error;
pub mod font;
pub mod host;
pub mod notify;
pub mod pipeline;
pub mod print;
pub mod raster;

pub use delivery::{artifact_filename, file_stem, ArtifactSink, DeliveredArtifact, DirectorySink, MemorySink};
pub use encode::encode_png;
pub use error::{ExportError, ExportResult};
pub use font::FontSet;
pub use host::{Attachment, AttachmentGuard, AttachmentKind, HostDocument, OffscreenSurface};
pub use notify::{Notice, Notifier, RecordingNotifier, TracingNotifier};
pub use pipeline::{ExportOptions, ExportPipeline, ExportReceipt, ExportStage};
pub use print::{HtmlFileDialog, PrintDialog, PrintJob, PrintReceipt};
pub use raster::{GlyphRasterizer, RasterImage, RasterOptions, Rasterizer};
