//! Per-document outcomes and the run summary

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::errors::CollaboratorError;
use crate::navigation::{DocumentRef, NavigationError};

/// Whether the run may write to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Compute and report, never submit
    DryRun,
    /// Submit changed bodies
    Live,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::DryRun => "dry-run",
            RunMode::Live => "live",
        }
    }
}

/// Why a document was not submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Dry-run mode; the sink is never called
    DryRun,
    /// New body equals the fetched body
    Unchanged,
    /// Stop requested before this document started
    Cancelled,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::DryRun => "dry_run",
            SkipReason::Unchanged => "unchanged",
            SkipReason::Cancelled => "cancelled",
        }
    }
}

/// Why a document failed; the batch continues regardless
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Fetch(CollaboratorError),
    Edit(NavigationError),
    Submit(CollaboratorError),
}

impl FailureReason {
    /// Stable tag used in reports
    pub fn tag(&self) -> &'static str {
        match self {
            FailureReason::Fetch(_) => "fetch_error",
            FailureReason::Edit(_) => "edit_error",
            FailureReason::Submit(_) => "submit_error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Fetch(e) | FailureReason::Submit(e) => {
                write!(f, "{} ({}): {}", self.tag(), e.kind, e)
            }
            FailureReason::Edit(e) => write!(f, "{} ({}): {}", self.tag(), e.kind(), e),
        }
    }
}

/// Terminal result of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    Skipped(SkipReason),
    Failed(FailureReason),
}

impl EditOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, EditOutcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            EditOutcome::Updated => "DONE",
            EditOutcome::Skipped(_) => "SKIPPED",
            EditOutcome::Failed(_) => "FAILED",
        }
    }
}

impl fmt::Display for EditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOutcome::Updated => write!(f, "DONE(updated)"),
            EditOutcome::Skipped(reason) => write!(f, "SKIPPED({})", reason.as_str()),
            EditOutcome::Failed(reason) => write!(f, "FAILED({})", reason),
        }
    }
}

/// One line of the summary: which document, what happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub document: DocumentRef,
    pub outcome: EditOutcome,
}

/// Aggregated result of a run, in sequence order
///
/// Built incrementally by the orchestrator through `RunSummaryBuilder` and
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct RunSummary {
    mode: RunMode,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    records: Vec<DocumentRecord>,
    updated: usize,
    skipped: usize,
    failed: usize,
}

impl RunSummary {
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn updated(&self) -> usize {
        self.updated
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn outcome_of(&self, id: &str) -> Option<&EditOutcome> {
        self.records
            .iter()
            .find(|r| r.document.id == id)
            .map(|r| &r.outcome)
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// A stop request left documents unprocessed
    pub fn was_cancelled(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.outcome == EditOutcome::Skipped(SkipReason::Cancelled))
    }

    /// 0 when every document was processed without failure, 1 when any
    /// failed or the run was cancelled before the end
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() || self.was_cancelled() {
            1
        } else {
            0
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn to_json(&self) -> Value {
        let documents: Vec<Value> = self
            .records
            .iter()
            .map(|r| {
                let mut entry = json!({
                    "position": r.document.position,
                    "id": r.document.id,
                    "title": r.document.title,
                    "url": r.document.url,
                    "state": r.outcome.label(),
                });
                match &r.outcome {
                    EditOutcome::Skipped(reason) => entry["reason"] = json!(reason.as_str()),
                    EditOutcome::Failed(reason) => {
                        entry["reason"] = json!(reason.tag());
                        entry["detail"] = json!(reason.to_string());
                    }
                    EditOutcome::Updated => {}
                }
                entry
            })
            .collect();

        json!({
            "mode": self.mode.as_str(),
            "started_at": self.started_at,
            "finished_at": self.finished_at,
            "total": self.total(),
            "updated": self.updated,
            "skipped": self.skipped,
            "failed": self.failed,
            "cancelled": self.was_cancelled(),
            "documents": documents,
        })
    }
}

/// Append-only accumulator for a `RunSummary`
#[derive(Debug)]
pub struct RunSummaryBuilder {
    mode: RunMode,
    started_at: DateTime<Utc>,
    records: Vec<DocumentRecord>,
}

impl RunSummaryBuilder {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            started_at: Utc::now(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, document: DocumentRef, outcome: EditOutcome) -> &DocumentRecord {
        self.records.push(DocumentRecord { document, outcome });
        &self.records[self.records.len() - 1]
    }

    pub fn finish(self) -> RunSummary {
        let mut updated = 0;
        let mut skipped = 0;
        let mut failed = 0;
        for record in &self.records {
            match record.outcome {
                EditOutcome::Updated => updated += 1,
                EditOutcome::Skipped(_) => skipped += 1,
                EditOutcome::Failed(_) => failed += 1,
            }
        }

        RunSummary {
            mode: self.mode,
            started_at: self.started_at,
            finished_at: Utc::now(),
            records: self.records,
            updated,
            skipped,
            failed,
        }
    }
}
