//! Console output for CLI commands
//!
//! - Human-readable report lines on stdout
//! - Structured logs stay on stderr (see `observability`)

use std::io::{self, Write};

use crate::deviantart::{DeviationSummary, ResolvedGallery};
use crate::navigation::DocumentRef;
use crate::observability::{Event, Logger};
use crate::sync::{
    artifact_stem, unified_diff, DocumentRecord, FetchedDocument, RunMode, RunObserver, RunSummary,
};

use super::errors::CliResult;

/// Diff lines shown per document in dry-run mode
pub const DIFF_PREVIEW_LINES: usize = 60;

/// Write lines to stdout
pub fn write_lines(lines: &[String]) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{}", line)?;
    }
    stdout.flush()?;
    Ok(())
}

/// First `limit` lines of a diff
pub fn diff_preview(diff: &str, limit: usize) -> String {
    diff.lines().take(limit).collect::<Vec<_>>().join("\n")
}

/// `gallery list` table
pub fn gallery_listing_lines(gallery: &ResolvedGallery, entries: &[DeviationSummary], order: &str) -> Vec<String> {
    let scope = match &gallery.folder_id {
        Some(folder) => format!(" folder {}", folder),
        None => " (all)".to_string(),
    };
    let mut lines = vec![
        format!("Gallery list for {}{}", gallery.target.username, scope),
        format!("Order: {}", order),
        format!("Total entries: {}", entries.len()),
    ];
    for (idx, item) in entries.iter().enumerate() {
        lines.push(format!(
            "{:03} | {:10} | {} | {} | {}",
            idx + 1,
            item.kind,
            item.deviation_id,
            item.title,
            item.url
        ));
    }
    let literature = entries.iter().filter(|item| item.is_literature()).count();
    lines.push(format!("Literature entries: {}", literature));
    lines
}

/// Closing lines of a sync run
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Updated: {}  Skipped: {}  Failed: {}",
        summary.updated(),
        summary.skipped(),
        summary.failed()
    )];
    if summary.mode() == RunMode::DryRun {
        lines.push("No upload performed (dry-run).".to_string());
    }
    if summary.was_cancelled() {
        lines.push("Run interrupted; remaining documents were not processed.".to_string());
    }
    for record in summary.records().iter().filter(|r| r.outcome.is_failed()) {
        lines.push(format!(
            "FAILED {:03} [{}]: {}",
            record.document.position + 1,
            record.document.id,
            record.outcome
        ));
    }
    lines
}

/// Prints one line per document as the run progresses
pub struct ConsoleReporter<W: Write> {
    out: W,
    mode: RunMode,
    pending_diff: Option<String>,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(mode: RunMode) -> Self {
        Self::new(io::stdout(), mode)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, mode: RunMode) -> Self {
        Self {
            out,
            mode,
            pending_diff: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &DocumentRecord) -> io::Result<()> {
        writeln!(
            self.out,
            "{:03} {} [{}] {}",
            record.document.position + 1,
            record.document.title,
            record.document.id,
            record.outcome
        )?;
        if let Some(preview) = self.pending_diff.take() {
            writeln!(self.out, "{}", preview)?;
        }
        self.out.flush()
    }
}

impl<W: Write> RunObserver for ConsoleReporter<W> {
    fn document_edited(&mut self, document: &DocumentRef, fetched: &FetchedDocument, updated: &str) {
        if self.mode == RunMode::DryRun {
            let diff = unified_diff(&artifact_stem(document), &fetched.body, updated);
            if !diff.is_empty() {
                self.pending_diff = Some(diff_preview(&diff, DIFF_PREVIEW_LINES));
            }
        }
    }

    fn document_finished(&mut self, record: &DocumentRecord) {
        if let Err(e) = self.write_record(record) {
            self.pending_diff = None;
            let detail = e.to_string();
            Logger::warn(
                Event::ConsoleWriteFailed.as_str(),
                &[("detail", &detail), ("id", &record.document.id)],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{EditOutcome, PreservedFields, SkipReason};

    fn doc() -> DocumentRef {
        DocumentRef {
            id: "d1".to_string(),
            title: "Chapter 1".to_string(),
            position: 0,
            url: "https://www.deviantart.com/a/art/d1".to_string(),
        }
    }

    #[test]
    fn test_diff_preview_truncates() {
        let diff = (0..100).map(|i| format!("+{}", i)).collect::<Vec<_>>().join("\n");
        let preview = diff_preview(&diff, DIFF_PREVIEW_LINES);
        assert_eq!(preview.lines().count(), 60);
        assert!(preview.ends_with("+59"));
    }

    #[test]
    fn test_reporter_prints_outcome_and_dry_run_diff() {
        let mut reporter = ConsoleReporter::new(Vec::new(), RunMode::DryRun);
        let fetched = FetchedDocument {
            body: "<p>story</p>".to_string(),
            preserved: PreservedFields::new(),
        };
        reporter.document_edited(&doc(), &fetched, "<p>nav</p>\n<p>story</p>");
        reporter.document_finished(&DocumentRecord {
            document: doc(),
            outcome: EditOutcome::Skipped(SkipReason::DryRun),
        });

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.starts_with("001 Chapter 1 [d1] SKIPPED(dry_run)\n"));
        assert!(text.contains("+<p>nav</p>"));
    }

    #[test]
    fn test_reporter_live_mode_has_no_diff() {
        let mut reporter = ConsoleReporter::new(Vec::new(), RunMode::Live);
        let fetched = FetchedDocument {
            body: "a".to_string(),
            preserved: PreservedFields::new(),
        };
        reporter.document_edited(&doc(), &fetched, "b");
        reporter.document_finished(&DocumentRecord {
            document: doc(),
            outcome: EditOutcome::Updated,
        });
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text, "001 Chapter 1 [d1] DONE(updated)\n");
    }

    /// Writer whose every write fails, like a closed stdout pipe
    struct BrokenPipe {
        attempts: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reporter_write_failure_is_contained() {
        let mut reporter = ConsoleReporter::new(BrokenPipe { attempts: 0 }, RunMode::DryRun);
        let fetched = FetchedDocument {
            body: "a".to_string(),
            preserved: PreservedFields::new(),
        };
        reporter.document_edited(&doc(), &fetched, "b");
        let record = DocumentRecord {
            document: doc(),
            outcome: EditOutcome::Skipped(SkipReason::DryRun),
        };
        reporter.document_finished(&record);
        assert!(reporter.pending_diff.is_none());

        reporter.document_finished(&record);
        assert_eq!(reporter.into_inner().attempts, 2);
    }
}
