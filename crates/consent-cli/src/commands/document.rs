//! Document commands: print, export

use super::Context;
use crate::error::CliResult;
use crate::output::{print_single, print_success, OutputFormat, TerminalNotifier};
use consent_export::{
    DirectorySink, ExportPipeline, ExportStage, HostDocument, HtmlFileDialog, PrintJob,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

fn stage_message(stage: ExportStage) -> &'static str {
    match stage {
        ExportStage::Idle => "完成",
        ExportStage::Preparing => "准备中...",
        ExportStage::Rendering => "渲染文档...",
        ExportStage::Rasterizing => "生成图片...",
        ExportStage::Delivering => "保存文件...",
        ExportStage::Failed => "导出失败",
    }
}

pub async fn print(ctx: &Context, id: &str, format: OutputFormat) -> CliResult<()> {
    let record = ctx.store.get(&ctx.resolve(id)?)?;
    let job = PrintJob::new(
        HostDocument::new(),
        Arc::new(HtmlFileDialog::new(ctx.config.out_dir())),
        Arc::new(TerminalNotifier),
    )
    .with_display(ctx.display);

    let receipt = job.run(&record).await?;
    match format {
        OutputFormat::Table => {
            print_success(&format!("Print page written: {}", receipt.location));
            println!("  Open it in a browser and print (A4).");
        }
        _ => print_single(&serde_json::json!({ "location": receipt.location }), format)?,
    }
    Ok(())
}

pub async fn export(ctx: &Context, id: &str, format: OutputFormat) -> CliResult<()> {
    let record = ctx.store.get(&ctx.resolve(id)?)?;
    let rasterizer = ctx.config.rasterizer()?;
    let pipeline = ExportPipeline::new(
        HostDocument::new(),
        Arc::new(rasterizer),
        Arc::new(DirectorySink::new(ctx.config.out_dir())),
        Arc::new(TerminalNotifier),
    )
    .with_display(ctx.display)
    .with_options(ctx.config.export_options()?);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut stages = pipeline.stages();
    let watcher = {
        let pb = pb.clone();
        tokio::spawn(async move {
            while stages.changed().await.is_ok() {
                let stage = *stages.borrow_and_update();
                pb.set_message(stage_message(stage));
            }
        })
    };

    let result = pipeline.export_to_image(&record).await;
    watcher.abort();

    let receipt = match result {
        Ok(receipt) => {
            pb.finish_and_clear();
            receipt
        }
        Err(err) => {
            pb.abandon_with_message(stage_message(ExportStage::Failed));
            return Err(err.into());
        }
    };

    match format {
        OutputFormat::Table => {
            print_success(&format!("Exported: {}", receipt.location));
            println!("  {}x{} px, {} bytes", receipt.width, receipt.height, receipt.bytes);
        }
        _ => print_single(&receipt, format)?,
    }
    Ok(())
}
