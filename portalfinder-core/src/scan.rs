use crate::progress::{ReporterSummary, progress_bar, spawn_reporter};
use crate::sink::AppendWriter;
use chrono::{DateTime, Utc};
use colored::Colorize;
use portalfinder_scanner::{
    CancellationToken, ClassificationVerdict, Orchestrator, ProbeConfig, ScanOutcome,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Buffered events between the coordinator and the progress reporter. A full
/// buffer makes the coordinator wait, pacing the scan to the renderer.
const PROGRESS_CHANNEL_CAPACITY: usize = 32;

/// Options for configuring a scan
pub struct ScanOptions {
    pub candidates: Vec<String>,
    pub probe: ProbeConfig,
    pub concurrency: usize,
    /// Also print a line for candidates without a portal
    pub verbose: bool,
    pub show_progress: bool,
}

/// Everything a finished (or cancelled) scan produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub completed: usize,
    pub cancelled: bool,
    pub matched: Vec<ClassificationVerdict>,
    #[serde(skip)]
    pub progress: ReporterSummary,
    /// Lines written by the incremental writer, when one was used
    #[serde(skip)]
    pub appended: Option<usize>,
}

impl ScanReport {
    pub fn from_outcome(
        outcome: ScanOutcome,
        started_at: DateTime<Utc>,
        progress: ReporterSummary,
    ) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            total: outcome.total,
            completed: outcome.completed,
            cancelled: outcome.cancelled,
            matched: outcome.matched,
            progress,
            appended: None,
        }
    }

    pub fn matched_candidates(&self) -> Vec<String> {
        self.matched.iter().map(|v| v.candidate.clone()).collect()
    }
}

/// Render the human-readable line for one verdict. Negative verdicts only
/// produce a line in verbose mode.
pub fn format_verdict_line(verdict: &ClassificationVerdict, verbose: bool) -> Option<String> {
    if verdict.matched {
        let redirect = verdict
            .redirect_target
            .as_ref()
            .map(|target| format!(" -> redirect to: {}", target))
            .unwrap_or_default();
        let keyword = verdict.matched_keyword.as_deref().unwrap_or("-");

        Some(format!(
            "{} {}{} [Detected via: {}, Keyword: {}]",
            "[v] Account portal found:".green().bold(),
            verdict.candidate.green(),
            redirect,
            verdict.method,
            keyword
        ))
    } else if verbose {
        Some(format!(
            "{} {}",
            "[x] No account portal found:".red(),
            verdict.candidate.red()
        ))
    } else {
        None
    }
}

/// Execute a scan with the given options.
///
/// The progress reporter runs on its own task for the whole scan. Verdict
/// lines are printed from the orchestrator's coordinator, one at a time,
/// with the bar suspended so they never tear. When `append_to` is given,
/// each match is also handed to an [`AppendWriter`] as soon as it is found.
pub async fn execute_scan(
    options: ScanOptions,
    append_to: Option<AppendWriter>,
    cancel: CancellationToken,
) -> Result<ScanReport, String> {
    let ScanOptions {
        candidates,
        probe,
        concurrency,
        verbose,
        show_progress,
    } = options;

    let started_at = Utc::now();
    let total = candidates.len();

    let orchestrator = Orchestrator::new(&probe)
        .map_err(|e| format!("Failed to prepare scan: {}", e))?
        .with_concurrency(concurrency)
        .with_cancellation(cancel);

    let bar = progress_bar(total, show_progress);
    let (progress_tx, progress_rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
    let reporter = spawn_reporter(bar.clone(), progress_rx);

    let writer = append_to.map(Arc::new);
    let writer_clone = writer.clone();
    let bar_clone = bar.clone();
    let verdict_callback = Arc::new(move |verdict: &ClassificationVerdict| {
        if let Some(line) = format_verdict_line(verdict, verbose) {
            bar_clone.suspend(|| println!("{}", line));
        }
        if verdict.matched
            && let Some(ref writer) = writer_clone
        {
            writer.record(&verdict.candidate);
        }
    });

    let scan_result = orchestrator
        .with_progress_sender(progress_tx)
        .with_verdict_callback(verdict_callback)
        .scan(candidates)
        .await;

    let progress = reporter
        .await
        .map_err(|e| format!("Progress reporter failed: {}", e))?;
    let outcome = scan_result.map_err(|e| format!("Scan failed: {}", e))?;

    let mut report = ScanReport::from_outcome(outcome, started_at, progress);

    if let Some(writer) = writer {
        // The callback holding the other reference was dropped with the orchestrator.
        match Arc::try_unwrap(writer) {
            Ok(writer) => report.appended = Some(writer.finish().await),
            Err(_) => tracing::warn!("Output writer still shared after scan, not flushed"),
        }
    }

    Ok(report)
}
