//! Record to PNG export.

use crate::delivery::{artifact_filename, ArtifactSink};
use crate::encode::encode_png;
use crate::host::HostDocument;
use crate::notify::{Notice, Notifier};
use crate::raster::{RasterOptions, Rasterizer};
use crate::{ExportError, ExportResult};
use consent_document::{project, DisplaySettings, ExportRenderer, Renderer, SignatureView, EXPORT_WIDTH};
use consent_types::ConsentRecord;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    Idle,
    Preparing,
    Rendering,
    Rasterizing,
    Delivering,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub width: u32,
    pub scale: u32,
    pub timeout: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: EXPORT_WIDTH,
            scale: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub filename: String,
    pub location: String,
    pub bytes: usize,
    pub width: u32,
    pub height: u32,
}

/// Resets the in-flight flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Walks the stage through `Failed` back to `Idle` unless the run settled.
/// Covers a dropped `export_to_image` future.
struct StageReset<'a> {
    stage: &'a watch::Sender<ExportStage>,
    settled: bool,
}

impl Drop for StageReset<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(stage = ?*self.stage.borrow(), "export abandoned before it settled");
            self.stage.send_replace(ExportStage::Failed);
            self.stage.send_replace(ExportStage::Idle);
        }
    }
}

/// One export at a time against one host document.
pub struct ExportPipeline {
    host: HostDocument,
    rasterizer: Arc<dyn Rasterizer>,
    sink: Arc<dyn ArtifactSink>,
    notifier: Arc<dyn Notifier>,
    display: DisplaySettings,
    options: ExportOptions,
    in_flight: AtomicBool,
    stage: watch::Sender<ExportStage>,
}

impl ExportPipeline {
    pub fn new(
        host: HostDocument,
        rasterizer: Arc<dyn Rasterizer>,
        sink: Arc<dyn ArtifactSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (stage, _) = watch::channel(ExportStage::Idle);
        Self {
            host,
            rasterizer,
            sink,
            notifier,
            display: DisplaySettings::default(),
            options: ExportOptions::default(),
            in_flight: AtomicBool::new(false),
            stage,
        }
    }

    pub fn with_display(mut self, display: DisplaySettings) -> Self {
        self.display = display;
        self
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn host(&self) -> &HostDocument {
        &self.host
    }

    pub fn stage(&self) -> ExportStage {
        *self.stage.borrow()
    }

    /// Stage changes, starting from the current stage.
    pub fn stages(&self) -> watch::Receiver<ExportStage> {
        self.stage.subscribe()
    }

    fn enter(&self, stage: ExportStage) {
        self.stage.send_replace(stage);
        info!(?stage, "export stage");
    }

    /// Export `record` as `{title}.png` through the sink.
    ///
    /// On failure every attachment is already released, one notice has been
    /// emitted and the pipeline is back to `Idle` when the error is returned.
    /// A call while another export runs fails with [`ExportError::Busy`] and
    /// leaves the running export alone.
    pub async fn export_to_image(&self, record: &ConsentRecord) -> ExportResult<ExportReceipt> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(record_id = %record.id, "export rejected, another export is running");
            return Err(ExportError::Busy);
        }
        let _in_flight = InFlight(&self.in_flight);
        let mut reset = StageReset {
            stage: &self.stage,
            settled: false,
        };

        self.enter(ExportStage::Preparing);
        let result = self.run(record).await;
        reset.settled = true;
        match result {
            Ok(receipt) => {
                self.enter(ExportStage::Idle);
                info!(record_id = %record.id, file = %receipt.filename, "export finished");
                Ok(receipt)
            }
            Err(err) => {
                self.enter(ExportStage::Failed);
                warn!(record_id = %record.id, error = %err, "export failed");
                self.notifier.notify(Notice::ExportFailed);
                self.enter(ExportStage::Idle);
                Err(err)
            }
        }
    }

    async fn run(&self, record: &ConsentRecord) -> ExportResult<ExportReceipt> {
        let _progress = self.host.show_progress("正在导出...");
        let mut surface = self.host.mount_surface(self.options.width);

        self.enter(ExportStage::Rendering);
        let tree = project(record, &SignatureView::of(record), &self.display);
        let layout = ExportRenderer::new(self.options.width).render(&tree)?;
        surface.render_into(layout);

        self.enter(ExportStage::Rasterizing);
        let raster_options = RasterOptions {
            scale: self.options.scale,
        };
        let image = tokio::time::timeout(
            self.options.timeout,
            self.rasterizer.rasterize(&surface, &raster_options),
        )
        .await
        .map_err(|_| ExportError::Timeout(self.options.timeout))??;
        drop(surface);

        self.enter(ExportStage::Delivering);
        let bytes = encode_png(&image)?;
        let filename = artifact_filename(&record.title);
        let delivered = self.sink.deliver(&filename, &bytes).await?;

        Ok(ExportReceipt {
            filename: delivered.filename,
            location: delivered.location,
            bytes: delivered.bytes,
            width: image.width,
            height: image.height,
        })
    }
}
