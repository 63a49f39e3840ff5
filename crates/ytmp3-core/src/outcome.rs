//! Work items, per-item outcomes and the batch summary

use std::fmt;

/// One source URL submitted to a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// 1-based position in the input list, for display only
    pub index: usize,
    pub url: String,
}

impl WorkItem {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Skipped,
    Failed,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "OK"),
            OutcomeStatus::Skipped => write!(f, "SKIP"),
            OutcomeStatus::Failed => write!(f, "FAIL"),
        }
    }
}

/// Terminal result of processing one [`WorkItem`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Resolved title, or the original URL when no title is known
    pub label: String,
    pub status: OutcomeStatus,
    pub detail: String,
}

impl Outcome {
    pub fn success(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Success, label, detail)
    }

    pub fn skipped(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Skipped, label, detail)
    }

    pub fn failed(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Failed, label, detail)
    }

    fn new(status: OutcomeStatus, label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status,
            detail: detail.into(),
        }
    }
}

/// Aggregated counts for a batch, plus the failures in completion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<Outcome>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome.status {
            OutcomeStatus::Success => self.succeeded += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed => {
                self.failed += 1;
                self.failures.push(outcome);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}
