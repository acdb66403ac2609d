//! Observable events
//!
//! Every structured log line carries one of these names. Events are explicit
//! and typed so that log consumers can match on stable strings.

use std::fmt;

/// Observable events in da-story-edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// `.env` loaded and resolved
    ConfigLoaded,
    /// Missing registry keys appended to `.env`
    ConfigBootstrapped,
    /// Key/value pairs written back into `.env`
    ConfigUpdated,
    /// `.env` line that does not parse as an assignment
    ConfigLineIgnored,

    // Gallery
    /// Gallery input parsed and folder resolved
    GalleryResolved,
    /// Gallery HTML page used to recover folder ordering
    GalleryHtmlFallback,
    /// Ordered literature snapshot taken for this run
    SequenceSnapshot,

    // Per-document lifecycle
    /// Document entered a new state
    DocumentState,
    /// Managed navigation blocks located and replaced
    DocumentEdited,
    /// Document body submitted to the sink
    DocumentSubmitted,
    /// Document skipped (dry-run, unchanged, cancelled)
    DocumentSkipped,
    /// Document failed; batch continues
    DocumentFailed,

    // Run lifecycle
    /// Stop requested; no further documents will start
    RunCancelled,
    /// Artifact file could not be written
    ArtifactWriteFailed,
    /// Progress line could not be written to the console
    ConsoleWriteFailed,

    // Transport
    /// Response served from the on-disk cache
    CacheHit,
    /// Response fetched and written to the cache
    CacheStore,
    /// Transient HTTP failure, request will be retried
    HttpRetry,
    /// Access token refreshed after rejection
    TokenRefreshed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigBootstrapped => "CONFIG_BOOTSTRAPPED",
            Event::ConfigUpdated => "CONFIG_UPDATED",
            Event::ConfigLineIgnored => "CONFIG_LINE_IGNORED",

            Event::GalleryResolved => "GALLERY_RESOLVED",
            Event::GalleryHtmlFallback => "GALLERY_HTML_FALLBACK",
            Event::SequenceSnapshot => "SEQUENCE_SNAPSHOT",

            Event::DocumentState => "DOCUMENT_STATE",
            Event::DocumentEdited => "DOCUMENT_EDITED",
            Event::DocumentSubmitted => "DOCUMENT_SUBMITTED",
            Event::DocumentSkipped => "DOCUMENT_SKIPPED",
            Event::DocumentFailed => "DOCUMENT_FAILED",

            Event::RunCancelled => "SYNC_RUN_CANCELLED",
            Event::ArtifactWriteFailed => "ARTIFACT_WRITE_FAILED",
            Event::ConsoleWriteFailed => "CONSOLE_WRITE_FAILED",

            Event::CacheHit => "CACHE_HIT",
            Event::CacheStore => "CACHE_STORE",
            Event::HttpRetry => "HTTP_RETRY",
            Event::TokenRefreshed => "TOKEN_REFRESHED",
        }
    }

    /// Failure events are logged at ERROR rather than INFO
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::DocumentFailed | Event::ArtifactWriteFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
