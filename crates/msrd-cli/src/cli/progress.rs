//! Live progress bar fed by dispatcher completion events.

use indicatif::{ProgressBar, ProgressStyle};
use msrd_core::job::JobOutcome;
use msrd_core::report::{RunSummary, Tally};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const TEMPLATE: &str = "{percent:>3}%|{bar:40.green}| {pos}/{len} [{elapsed_precise}<{eta_precise}]";

fn bar(total: usize) -> ProgressBar {
    if total == 0 {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#.");
    ProgressBar::new(total as u64).with_style(style)
}

/// Consumes outcomes until every sender is dropped, then returns the summary.
pub fn spawn_reporter(total: usize, mut rx: mpsc::Receiver<JobOutcome>) -> JoinHandle<RunSummary> {
    tokio::spawn(async move {
        let bar = bar(total);
        let mut tally = Tally::new(total);
        while let Some(outcome) = rx.recv().await {
            tally.observe(&outcome);
            if let Some(err) = &outcome.error {
                bar.println(format!("ERROR: {}", err));
            } else if outcome.fell_back {
                bar.println(format!("INFO: [{}] was not cached, downloaded it", outcome.identifier));
            }
            bar.inc(1);
        }
        bar.finish();

        if !tally.is_clean() {
            tracing::warn!(
                dispatched = tally.total(),
                observed = tally.processed(),
                "progress reporter saw a different number of outcomes than jobs"
            );
        }
        tally.summary()
    })
}
