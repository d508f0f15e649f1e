// Live progress rendering for a running scan

use indicatif::{ProgressBar, ProgressStyle};
use portalfinder_scanner::ProgressEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Rotating glyphs; indicatif shows the last one once the bar is finished.
const SPINNER_GLYPHS: &str = "\\|/-✓";

/// What the reporter observed before its channel closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReporterSummary {
    pub events: usize,
    pub last: Option<ProgressEvent>,
}

/// Build the counter/spinner bar. A hidden bar keeps the same bookkeeping
/// without drawing anything.
pub fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    let pb = if visible {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };

    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} Checking candidates ({pos}/{len}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_GLYPHS);
    pb.set_style(style);
    pb.set_length(total as u64);
    pb
}

/// Start the reporter on its own task. It renders every event it receives and
/// returns once all senders are gone.
pub fn spawn_reporter(
    bar: ProgressBar,
    rx: mpsc::Receiver<ProgressEvent>,
) -> JoinHandle<ReporterSummary> {
    tokio::spawn(run_reporter(bar, rx))
}

pub async fn run_reporter(
    bar: ProgressBar,
    mut rx: mpsc::Receiver<ProgressEvent>,
) -> ReporterSummary {
    let mut summary = ReporterSummary::default();

    while let Some(event) = rx.recv().await {
        bar.set_length(event.total as u64);
        bar.set_position(event.completed as u64);
        bar.tick();

        summary.events += 1;
        summary.last = Some(event);
    }

    bar.finish_and_clear();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reporter_tracks_last_event() {
        let bar = progress_bar(3, false);
        let (tx, rx) = mpsc::channel(1);
        let handle = spawn_reporter(bar.clone(), rx);

        for completed in 1..=3 {
            tx.send(ProgressEvent {
                completed,
                total: 3,
            })
            .await
            .unwrap();
        }
        drop(tx);

        let summary = handle.await.unwrap();
        assert_eq!(summary.events, 3);
        assert_eq!(
            summary.last,
            Some(ProgressEvent {
                completed: 3,
                total: 3
            })
        );
        assert_eq!(bar.position(), 3);
        assert!(bar.is_finished());
    }

    #[tokio::test]
    async fn test_reporter_stops_without_events() {
        let (tx, rx) = mpsc::channel(1);
        drop(tx);

        let summary = run_reporter(progress_bar(0, false), rx).await;
        assert_eq!(summary, ReporterSummary::default());
    }
}
