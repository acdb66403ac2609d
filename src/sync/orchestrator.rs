//! Batch Orchestrator
//!
//! Drives every document of a sequence snapshot through
//! PENDING -> FETCHING -> EDITING -> SUBMITTING -> terminal, strictly one at
//! a time and in sequence order.
//!
//! # Failure isolation
//!
//! Any failure inside one document becomes that document's terminal state.
//! Nothing a single document does can abort or skip the rest of the batch.

use serde_json::Value;

use super::cancel::StopSignal;
use super::collaborator::{ContentSink, ContentSource, FetchedDocument};
use super::outcome::{
    DocumentRecord, EditOutcome, FailureReason, RunMode, RunSummary, RunSummaryBuilder, SkipReason,
};
use super::state::DocumentState;
use crate::navigation::{apply_with_report, compute, DocumentRef, DocumentSequence};
use crate::observability::{
    log_event_with_fields, trace_event, Event, Logger, ObservationScope, Severity,
};

/// Hooks notified while a run progresses
///
/// Observers see data; they cannot change an outcome.
pub trait RunObserver {
    /// A new body was computed for `document`
    fn document_edited(&mut self, _document: &DocumentRef, _fetched: &FetchedDocument, _updated: &str) {}

    /// `record` reached its terminal state
    fn document_finished(&mut self, _record: &DocumentRecord) {}
}

/// Bodies are equal modulo trailing line breaks some services append
fn is_unchanged(original: &str, updated: &str) -> bool {
    let trim = |s: &str| s.trim_end_matches(['\n', '\r']).len();
    original[..trim(original)] == updated[..trim(updated)]
}

/// Sequential per-document update loop
pub struct BatchOrchestrator<'a> {
    source: &'a dyn ContentSource,
    sink: &'a dyn ContentSink,
    mode: RunMode,
    stop: StopSignal,
    observers: Vec<&'a mut dyn RunObserver>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(source: &'a dyn ContentSource, sink: &'a dyn ContentSink, mode: RunMode) -> Self {
        Self {
            source,
            sink,
            mode,
            stop: StopSignal::new(),
            observers: Vec::new(),
        }
    }

    /// Use an externally owned stop flag
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Register an observer for the duration of the run
    pub fn observe(mut self, observer: &'a mut dyn RunObserver) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Process every document of `sequence` and summarize
    pub fn run(&mut self, sequence: &DocumentSequence) -> RunSummary {
        let total = sequence.len().to_string();
        let scope = ObservationScope::with_fields(
            "SYNC_RUN",
            &[("documents", &total), ("mode", self.mode.as_str())],
        );

        let mut summary = RunSummaryBuilder::new(self.mode);
        let mut cancelled = false;

        for document in sequence {
            let outcome = if cancelled || self.stop.is_stop_requested() {
                if !cancelled {
                    cancelled = true;
                    let position = document.position.to_string();
                    log_event_with_fields(Event::RunCancelled, &[("next_position", &position)]);
                }
                self.transition(
                    document,
                    DocumentState::Pending,
                    DocumentState::Finished(EditOutcome::Skipped(SkipReason::Cancelled)),
                );
                EditOutcome::Skipped(SkipReason::Cancelled)
            } else {
                self.process(sequence, document)
            };

            let record = summary.push(document.clone(), outcome);
            for observer in self.observers.iter_mut() {
                observer.document_finished(record);
            }
        }

        let summary = summary.finish();
        let updated = summary.updated().to_string();
        let skipped = summary.skipped().to_string();
        let failed = summary.failed().to_string();
        scope.complete_with_fields(&[
            ("updated", &updated),
            ("skipped", &skipped),
            ("failed", &failed),
        ]);
        summary
    }

    fn transition(&self, document: &DocumentRef, from: DocumentState, to: DocumentState) -> DocumentState {
        debug_assert!(
            from.can_transition_to(&to),
            "forbidden transition {} -> {}",
            from.state_name(),
            to.state_name()
        );
        if Logger::enabled(Severity::Trace) {
            let position = document.position.to_string();
            trace_event(
                Event::DocumentState,
                &[
                    ("id", &document.id),
                    ("position", &position),
                    ("from", from.state_name()),
                    ("to", to.state_name()),
                ],
            );
        }
        to
    }

    fn finish(&self, document: &DocumentRef, from: DocumentState, outcome: EditOutcome) -> EditOutcome {
        match &outcome {
            EditOutcome::Failed(reason) => {
                let detail = reason.to_string();
                log_event_with_fields(
                    Event::DocumentFailed,
                    &[("id", &document.id), ("reason", reason.tag()), ("detail", &detail)],
                );
            }
            EditOutcome::Skipped(reason) => {
                log_event_with_fields(
                    Event::DocumentSkipped,
                    &[("id", &document.id), ("reason", reason.as_str())],
                );
            }
            EditOutcome::Updated => {
                log_event_with_fields(Event::DocumentSubmitted, &[("id", &document.id)]);
            }
        }
        self.transition(document, from, DocumentState::Finished(outcome.clone()));
        outcome
    }

    fn process(&mut self, sequence: &DocumentSequence, document: &DocumentRef) -> EditOutcome {
        let state = self.transition(document, DocumentState::Pending, DocumentState::Fetching);

        let fetched = match self.source.fetch_body(&document.id) {
            Ok(fetched) => fetched,
            Err(e) => return self.finish(document, state, EditOutcome::Failed(FailureReason::Fetch(e))),
        };

        let state = self.transition(document, state, DocumentState::Editing);

        let edited = compute(sequence.as_slice(), document.position)
            .and_then(|targets| apply_with_report(&fetched.body, &targets));
        let (updated, report) = match edited {
            Ok(edited) => edited,
            Err(e) => return self.finish(document, state, EditOutcome::Failed(FailureReason::Edit(e))),
        };

        log_event_with_fields(
            Event::DocumentEdited,
            &[
                ("id", &document.id),
                ("first_run", if report.is_first_run() { "true" } else { "false" }),
            ],
        );
        for observer in self.observers.iter_mut() {
            observer.document_edited(document, &fetched, &updated);
        }

        if self.mode == RunMode::DryRun {
            return self.finish(document, state, EditOutcome::Skipped(SkipReason::DryRun));
        }
        if is_unchanged(&fetched.body, &updated) {
            return self.finish(document, state, EditOutcome::Skipped(SkipReason::Unchanged));
        }

        let state = self.transition(document, state, DocumentState::Submitting);

        let mut preserved = fetched.preserved;
        preserved.ensure("title", Value::String(document.title.clone()));

        match self.sink.submit(&document.id, &updated, &preserved) {
            Ok(()) => self.finish(document, state, EditOutcome::Updated),
            Err(e) => self.finish(document, state, EditOutcome::Failed(FailureReason::Submit(e))),
        }
    }
}
