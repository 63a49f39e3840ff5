//! The fetch capability driven by the batch orchestrator

use crate::outcome::{Outcome, WorkItem};
use async_trait::async_trait;
use std::path::Path;

/// Turns one [`WorkItem`] into an audio file under `dest`.
///
/// Implementations never return errors: anything that goes wrong is reported
/// as a [`Failed`](crate::outcome::OutcomeStatus::Failed) outcome so one bad
/// item cannot abort the batch. An output that already exists must yield
/// [`Skipped`](crate::outcome::OutcomeStatus::Skipped) without fetching again.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, item: &WorkItem, dest: &Path) -> Outcome;

    /// Short name for logging
    fn name(&self) -> &'static str;
}
