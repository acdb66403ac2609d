//! Batch synchronization
//!
//! Walks a sequence snapshot one document at a time:
//!
//! 1. fetch the current body through a `ContentSource`
//! 2. compute navigation targets and apply them
//! 3. submit the new body through a `ContentSink` (live mode only)
//!
//! Each document ends in exactly one of DONE, SKIPPED or FAILED. A failing
//! document never stops the batch; only a stop request does, and only
//! between documents.

mod artifacts;
mod cancel;
mod collaborator;
mod errors;
mod orchestrator;
mod outcome;
mod state;

pub use artifacts::{artifact_stem, default_workdir, unified_diff, ArtifactWriter};
pub use cancel::StopSignal;
pub use collaborator::{
    CollaboratorResult, ContentSink, ContentSource, FetchedDocument, PreservedFields,
};
pub use errors::{ArtifactError, ArtifactResult, CollaboratorError, CollaboratorErrorKind};
pub use orchestrator::{BatchOrchestrator, RunObserver};
pub use outcome::{
    DocumentRecord, EditOutcome, FailureReason, RunMode, RunSummary, RunSummaryBuilder, SkipReason,
};
pub use state::DocumentState;
