//! Batch tagging on a blocking worker with a progress bar.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use console::Style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tagsmith_core::pipeline::{RunContext, RunEvent, RunSummary, StopFlag, TaskSlot};
use tagsmith_core::{BatchProcessor, InferenceEngine};

use super::OverwritePolicy;
use crate::cli::handle_interrupt;
use crate::cli::theme::tagsmith_theme;

/// Tag `files` in order; Ctrl-C stops the run after the current image.
pub async fn run_batch(
    slot: &TaskSlot,
    processor: BatchProcessor<InferenceEngine>,
    files: Vec<PathBuf>,
    policy: OverwritePolicy,
) -> anyhow::Result<RunSummary> {
    let policy = if policy == OverwritePolicy::Ask && !console::Term::stderr().is_term() {
        tracing::warn!("--overwrite ask needs a terminal; existing sidecars will be kept");
        OverwritePolicy::Never
    } else {
        policy
    };

    let stop = StopFlag::new();
    let progress = create_progress_bar(files.len() as u64);

    let ctrl_c = {
        let stop = stop.clone();
        let pb = progress.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                pb.println("  Stopping after the current image...");
                stop.request_stop();
            }
        })
    };

    let start = Instant::now();
    let pb = progress.clone();
    let summary = slot
        .run_blocking(move || {
            let ctx = RunContext::new()
                .with_stop_flag(stop.clone())
                .with_overwrite_checker(overwrite_checker(policy, pb.clone(), stop))
                .with_log_sink(move |event: &RunEvent| report(&pb, event));
            processor.run(&files, &ctx)
        })
        .await;
    ctrl_c.abort();
    progress.finish_and_clear();

    let summary = summary?;
    print_summary(&summary, start.elapsed());
    Ok(summary)
}

/// Overwrite decision for one run.
///
/// Interrupting the prompt declines and stops the run.
fn overwrite_checker(
    policy: OverwritePolicy,
    pb: ProgressBar,
    stop: StopFlag,
) -> impl Fn(&Path) -> bool + Send + 'static {
    move |sidecar: &Path| match policy {
        OverwritePolicy::Always => true,
        OverwritePolicy::Never => false,
        OverwritePolicy::Ask => {
            let answer = pb.suspend(|| {
                Confirm::with_theme(&tagsmith_theme())
                    .with_prompt(format!("{} already exists. Overwrite?", sidecar.display()))
                    .default(false)
                    .interact()
            });
            match handle_interrupt(answer) {
                Ok(Some(overwrite)) => overwrite,
                Ok(None) => {
                    stop.request_stop();
                    false
                }
                Err(e) => {
                    tracing::warn!("Overwrite prompt failed, keeping {:?}: {e}", sidecar);
                    false
                }
            }
        }
    }
}

/// Forward one run event to the progress bar.
fn report(pb: &ProgressBar, event: &RunEvent) {
    match event {
        RunEvent::Processing { path, .. } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pb.set_message(name);
        }
        RunEvent::Written { .. } => pb.inc(1),
        RunEvent::Skipped { .. } => {
            pb.inc(1);
            let dim = Style::new().for_stderr().dim();
            pb.println(format!("  {}", dim.apply_to(event)));
        }
        RunEvent::Failed { .. } => {
            pb.inc(1);
            let red = Style::new().for_stderr().red();
            pb.println(format!("  {}", red.apply_to(event)));
        }
        RunEvent::Aborted { .. } => {
            let yellow = Style::new().for_stderr().yellow();
            pb.println(format!("  {}", yellow.apply_to(event)));
        }
    }
}

/// Create a progress bar for batch tagging.
fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    match ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        Ok(style) => pb.set_style(style.progress_chars("##-")),
        Err(e) => tracing::debug!("Progress template rejected: {e}"),
    }
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after a run.
fn print_summary(summary: &RunSummary, elapsed: Duration) {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        summary.written as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Written:      {:>8}", summary.written);
    if summary.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", summary.skipped);
    }
    if !summary.failures.is_empty() {
        eprintln!("    Failed:       {:>8}", summary.failures.len());
    }
    if summary.aborted {
        eprintln!(
            "    Not reached:  {:>8}",
            summary.total - summary.attempted()
        );
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");

    for failure in &summary.failures {
        eprintln!(
            "    {}: {} ({})",
            failure.path.display(),
            failure.kind,
            failure.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_core::pipeline::FailureKind;

    #[test]
    fn test_fixed_policies_never_prompt() {
        let stop = StopFlag::new();
        let always = overwrite_checker(OverwritePolicy::Always, ProgressBar::hidden(), stop.clone());
        let never = overwrite_checker(OverwritePolicy::Never, ProgressBar::hidden(), stop.clone());
        assert!(always(Path::new("a.txt")));
        assert!(!never(Path::new("a.txt")));
        assert!(!stop.is_stopped());
    }

    #[test]
    fn test_report_advances_on_finished_images_only() {
        let pb = ProgressBar::hidden();
        pb.set_length(3);
        let path = PathBuf::from("a.png");

        report(
            &pb,
            &RunEvent::Processing {
                index: 0,
                total: 3,
                path: path.clone(),
            },
        );
        assert_eq!(pb.position(), 0);

        report(
            &pb,
            &RunEvent::Written {
                index: 0,
                total: 3,
                path: path.clone(),
            },
        );
        report(
            &pb,
            &RunEvent::Failed {
                index: 1,
                total: 3,
                path,
                kind: FailureKind::Load,
                message: "bad".into(),
            },
        );
        report(&pb, &RunEvent::Aborted { index: 2, total: 3 });
        assert_eq!(pb.position(), 2);
    }
}
