use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use tokio::task::JoinHandle;

use docsift_core::{
    BatchRunner, BatchSummary, CancelFlag, LayeredAcquirer, PipelineVariant, Progress, RunConfig,
};

use crate::cli::ScanArgs;
use crate::display;

pub async fn run(variant: PipelineVariant, args: ScanArgs) -> Result<()> {
    let ocr = args.ocr_config()?;
    let config = RunConfig::new(&args.input, &args.output, variant);
    config.validate()?;

    let acquirer = Arc::new(LayeredAcquirer::from_config(&ocr));
    if ocr.enabled && !acquirer.has_ocr() {
        eprintln!(
            "{} tesseract not found; images and scanned PDFs will be skipped",
            style("!").yellow()
        );
    }

    let runner = BatchRunner::new(config, acquirer)?;
    let cancel = runner.cancel_flag();

    let task = tokio::spawn(async move { runner.run(print_progress).await });
    let summary = await_batch(task, &cancel, tokio::signal::ctrl_c()).await?;

    if !args.quiet {
        display::print_summary(&summary);
    }

    eprintln!(
        "Results written to {}",
        style(summary.output_dir.display()).cyan()
    );

    Ok(())
}

/// Waits for the batch. A delivered interrupt cancels it after the current
/// file; an interrupt handler that fails to install is ignored.
async fn await_batch(
    mut task: JoinHandle<docsift_core::Result<BatchSummary>>,
    cancel: &CancelFlag,
    interrupt: impl Future<Output = std::io::Result<()>>,
) -> Result<BatchSummary> {
    tokio::select! {
        joined = &mut task => Ok(joined??),
        Ok(()) = interrupt => {
            cancel.cancel();
            eprintln!("{} stopping after the current file", style("!").yellow());
            Ok(task.await??)
        }
    }
}

fn print_progress(progress: &Progress) {
    match progress {
        Progress::Started { .. } => {}
        Progress::Processing { .. } => eprintln!("{}", style(progress).dim()),
        Progress::Complete { .. } => eprintln!("{}", style(progress).green()),
        Progress::Cancelled { .. } => eprintln!("{}", style(progress).yellow()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn summary(cancelled: bool) -> BatchSummary {
        BatchSummary {
            input_dir: PathBuf::from("in"),
            output_dir: PathBuf::from("out"),
            variant: PipelineVariant::Pii,
            records: Vec::new(),
            summary_path: PathBuf::from("out/pii_results.csv"),
            cancelled,
        }
    }

    /// Finishes once the flag is set, or after a short delay.
    fn batch(cancel: &CancelFlag) -> JoinHandle<docsift_core::Result<BatchSummary>> {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                if cancel.is_cancelled() {
                    return Ok(summary(true));
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            Ok(summary(false))
        })
    }

    #[tokio::test]
    async fn test_interrupt_cancels_batch() {
        let cancel = CancelFlag::new();
        let result = await_batch(batch(&cancel), &cancel, async { Ok(()) })
            .await
            .unwrap();

        assert!(cancel.is_cancelled());
        assert!(result.cancelled);
    }

    #[tokio::test]
    async fn test_failed_interrupt_handler_keeps_running() {
        let cancel = CancelFlag::new();
        let result = await_batch(batch(&cancel), &cancel, async {
            Err(std::io::Error::other("signal handler unavailable"))
        })
        .await
        .unwrap();

        assert!(!cancel.is_cancelled());
        assert!(!result.cancelled);
    }
}
