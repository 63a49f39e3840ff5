//! Bounded-concurrency batch orchestration

use crate::fetch::Fetch;
use crate::outcome::{Outcome, Summary, WorkItem};

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// Runs a fetcher over a list of work items with at most `workers` in flight
pub struct Batch<F: ?Sized> {
    fetcher: Arc<F>,
    output_dir: Arc<Path>,
    workers: usize,
}

impl<F: Fetch + ?Sized + 'static> Batch<F> {
    /// A worker count of zero is treated as one.
    pub fn new(fetcher: Arc<F>, output_dir: impl Into<PathBuf>, workers: usize) -> Self {
        let output_dir: PathBuf = output_dir.into();
        Self {
            fetcher,
            output_dir: Arc::from(output_dir),
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fetch every item and fold the outcomes into a [`Summary`].
    ///
    /// `on_outcome` sees each outcome as it completes, in completion order.
    pub async fn run<O>(&self, items: Vec<WorkItem>, mut on_outcome: O) -> Summary
    where
        O: FnMut(&WorkItem, &Outcome),
    {
        let start_time = Instant::now();
        let total = items.len();
        debug!(
            "Starting batch of {} items with {} workers ({})",
            total,
            self.workers,
            self.fetcher.name()
        );

        let mut completions = stream::iter(items)
            .map(|item| {
                let fetcher = Arc::clone(&self.fetcher);
                let dest = Arc::clone(&self.output_dir);
                let fallback = item.clone();

                async move {
                    let handle = tokio::spawn(async move {
                        let outcome = fetcher.fetch(&item, &dest).await;
                        (item, outcome)
                    });

                    match handle.await {
                        Ok(completed) => completed,
                        Err(e) => {
                            let outcome = join_failure(&fallback, e);
                            (fallback, outcome)
                        }
                    }
                }
            })
            .buffer_unordered(self.workers);

        // Sole owner of the summary: one update per completed item
        let mut summary = Summary::new();
        while let Some((item, outcome)) = completions.next().await {
            debug!(
                "[{}/{}] {}: {} ({})",
                item.index, total, outcome.status, outcome.label, outcome.detail
            );
            on_outcome(&item, &outcome);
            summary.record(outcome);
        }

        debug!(
            "Batch complete in {:.1}s: {} ok, {} skipped, {} failed",
            start_time.elapsed().as_secs_f32(),
            summary.succeeded,
            summary.skipped,
            summary.failed
        );

        summary
    }
}

fn join_failure(item: &WorkItem, e: JoinError) -> Outcome {
    let detail = if e.is_panic() {
        let payload = e.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        format!("fetch task panicked: {}", message)
    } else {
        "fetch task cancelled".to_string()
    };

    warn!("{}: {}", item.url, detail);
    Outcome::failed(item.url.clone(), detail)
}
