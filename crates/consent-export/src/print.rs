//! Print jobs.

use crate::delivery::{file_stem, write_atomic};
use crate::host::{AttachmentKind, HostDocument};
use crate::notify::{Notice, Notifier};
use crate::{ExportError, ExportResult};
use async_trait::async_trait;
use consent_document::{
    project, DisplaySettings, PageSetup, PrintDocument, PrintRenderer, Renderer, SignatureView,
};
use consent_types::ConsentRecord;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// The system print dialog.
#[async_trait]
pub trait PrintDialog: Send + Sync {
    /// Hand `document` to the user for printing. Returns where it went.
    async fn print(&self, document: &PrintDocument) -> ExportResult<String>;
}

/// Writes the print page to `{dir}/{title}.html` for a browser's print dialog.
#[derive(Debug, Clone)]
pub struct HtmlFileDialog {
    dir: PathBuf,
}

impl HtmlFileDialog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PrintDialog for HtmlFileDialog {
    async fn print(&self, document: &PrintDocument) -> ExportResult<String> {
        let filename = format!("{}.html", file_stem(&document.title));
        let path = self.dir.join(filename);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ExportError::Print(format!("{}: {}", self.dir.display(), e)))?;
        let (dir, target, html) = (self.dir.clone(), path.clone(), document.to_html());
        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, html.as_bytes()))
            .await
            .map_err(|e| ExportError::Print(e.to_string()))?
            .map_err(|e| ExportError::Print(format!("{}: {}", path.display(), e)))?;
        Ok(path.display().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintReceipt {
    pub location: String,
}

pub struct PrintJob {
    host: HostDocument,
    dialog: Arc<dyn PrintDialog>,
    notifier: Arc<dyn Notifier>,
    display: DisplaySettings,
    page: PageSetup,
}

impl PrintJob {
    pub fn new(host: HostDocument, dialog: Arc<dyn PrintDialog>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            host,
            dialog,
            notifier,
            display: DisplaySettings::default(),
            page: PageSetup::default(),
        }
    }

    pub fn with_display(mut self, display: DisplaySettings) -> Self {
        self.display = display;
        self
    }

    /// Attach the print style and container, open the dialog, detach both.
    ///
    /// A failure emits one print notice before it is returned.
    pub async fn run(&self, record: &ConsentRecord) -> ExportResult<PrintReceipt> {
        match self.print(record).await {
            Ok(receipt) => {
                info!(record_id = %record.id, location = %receipt.location, "print job finished");
                Ok(receipt)
            }
            Err(err) => {
                warn!(record_id = %record.id, error = %err, "print job failed");
                self.notifier.notify(Notice::PrintFailed);
                Err(err)
            }
        }
    }

    async fn print(&self, record: &ConsentRecord) -> ExportResult<PrintReceipt> {
        let tree = project(record, &SignatureView::of(record), &self.display);
        let document = PrintRenderer::new(self.page.clone()).render(&tree)?;

        let _style = self.host.attach(AttachmentKind::PrintStyle, document.stylesheet());
        let _container = self
            .host
            .attach(AttachmentKind::PrintContainer, PrintDocument::CONTAINER_CLASS);
        let location = self.dialog.print(&document).await?;
        Ok(PrintReceipt { location })
    }
}
