//! The live document exports and print jobs temporarily attach to.

use crate::{ExportError, ExportResult};
use consent_document::ExportLayout;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Blocking overlay shown while an export runs.
    ProgressIndicator,
    /// Hidden render target, outside the visible layout flow.
    OffscreenSurface,
    /// Print-scoped stylesheet.
    PrintStyle,
    /// The `.print-content` container.
    PrintContainer,
}

impl AttachmentKind {
    pub fn in_layout_flow(self) -> bool {
        matches!(self, AttachmentKind::ProgressIndicator | AttachmentKind::PrintContainer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub id: u64,
    pub kind: AttachmentKind,
    pub label: String,
}

#[derive(Debug, Default)]
struct HostState {
    next_id: u64,
    attached: Vec<Attachment>,
}

/// Shared handle to the host document. Clones see the same attachments.
#[derive(Debug, Clone, Default)]
pub struct HostDocument {
    state: Arc<Mutex<HostState>>,
}

impl HostDocument {
    pub fn new() -> Self {
        Self::default()
    }

    // Cleanup must still run after a panic elsewhere poisoned the lock.
    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attach a node; it stays until the returned guard drops.
    pub fn attach(&self, kind: AttachmentKind, label: impl Into<String>) -> AttachmentGuard {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.attached.push(Attachment {
            id,
            kind,
            label: label.into(),
        });
        debug!(id, ?kind, "attached to host document");
        AttachmentGuard {
            host: self.clone(),
            id,
            kind,
        }
    }

    pub fn show_progress(&self, message: &str) -> AttachmentGuard {
        self.attach(AttachmentKind::ProgressIndicator, message)
    }

    pub fn mount_surface(&self, width: u32) -> OffscreenSurface {
        OffscreenSurface {
            guard: self.attach(AttachmentKind::OffscreenSurface, format!("{}px", width)),
            width,
            layout: None,
        }
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.state().attached.clone()
    }

    pub fn is_clean(&self) -> bool {
        self.state().attached.is_empty()
    }

    fn detach(&self, id: u64) {
        let mut state = self.state();
        state.attached.retain(|a| a.id != id);
    }
}

/// Detaches its node from the host on drop.
#[derive(Debug)]
#[must_use = "the attachment is removed as soon as the guard drops"]
pub struct AttachmentGuard {
    host: HostDocument,
    id: u64,
    kind: AttachmentKind,
}

impl AttachmentGuard {
    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }
}

impl Drop for AttachmentGuard {
    fn drop(&mut self) {
        self.host.detach(self.id);
        debug!(id = self.id, kind = ?self.kind, "detached from host document");
    }
}

/// Hidden render target owned by one export.
#[derive(Debug)]
pub struct OffscreenSurface {
    guard: AttachmentGuard,
    width: u32,
    layout: Option<ExportLayout>,
}

impl OffscreenSurface {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_attached(&self) -> bool {
        self.guard.host.attachments().iter().any(|a| a.id == self.guard.id)
    }

    pub fn render_into(&mut self, layout: ExportLayout) {
        self.layout = Some(layout);
    }

    pub fn layout(&self) -> ExportResult<&ExportLayout> {
        self.layout
            .as_ref()
            .ok_or_else(|| ExportError::Raster("surface has no rendered content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_detach_on_drop() {
        let host = HostDocument::new();
        let progress = host.show_progress("exporting");
        let surface = host.mount_surface(800);
        assert_eq!(host.attachments().len(), 2);
        assert!(surface.is_attached());

        drop(surface);
        assert_eq!(host.attachments()[0].kind, AttachmentKind::ProgressIndicator);
        drop(progress);
        assert!(host.is_clean());
    }

    #[test]
    fn surface_is_outside_layout_flow() {
        assert!(!AttachmentKind::OffscreenSurface.in_layout_flow());
        assert!(AttachmentKind::ProgressIndicator.in_layout_flow());
    }

    #[test]
    fn empty_surface_cannot_be_rasterized() {
        let host = HostDocument::new();
        let surface = host.mount_surface(800);
        assert!(surface.layout().is_err());
    }

    #[test]
    fn guard_detaches_during_unwind() {
        let host = HostDocument::new();
        let cloned = host.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = cloned.show_progress("exporting");
            panic!("render blew up");
        }));
        assert!(result.is_err());
        assert!(host.is_clean());
    }
}
