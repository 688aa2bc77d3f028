//! Progress monitor.
//!
//! Purely observational: it waits for the aggregator to publish a new
//! [`Progress`] value and redraws a progress bar, at most once per interval.
//! Publishing never waits on the monitor, so a slow terminal cannot hold up
//! probes.

use super::state::Progress;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Progress bar styled for a port scan.
pub fn scan_progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar
}

/// Follow `progress` and render it on `bar` until the scan completes, the
/// publisher goes away, or `cancel` fires. Returns the last progress seen.
pub async fn monitor_progress(
    mut progress: watch::Receiver<Progress>,
    bar: ProgressBar,
    interval: Duration,
    cancel: CancellationToken,
) -> Progress {
    loop {
        let current = *progress.borrow_and_update();
        render(&bar, current);

        if current.is_complete() {
            bar.finish_with_message("done");
            return current;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return settle(&bar, *progress.borrow()),
            changed = progress.changed() => {
                if changed.is_err() {
                    // Publisher dropped; show whatever it last sent.
                    return settle(&bar, *progress.borrow());
                }
            }
        }

        // Updates arriving during the pause are coalesced into the next borrow.
        if !interval.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

/// Draw the final value and close the bar.
fn settle(bar: &ProgressBar, last: Progress) -> Progress {
    render(bar, last);
    if last.is_complete() {
        bar.finish_with_message("done");
    } else {
        bar.abandon_with_message("interrupted");
    }
    last
}

fn render(bar: &ProgressBar, progress: Progress) {
    bar.set_length(progress.total as u64);
    bar.set_position(progress.scanned as u64);
    if progress.open > 0 {
        bar.set_message(format!("{} open", progress.open));
    }
}
