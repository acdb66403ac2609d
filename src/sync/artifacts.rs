//! Run artifacts on disk
//!
//! Every run gets a fresh work directory holding, per document:
//!
//! - `NNN_<id>_meta.json`: document reference plus preserved fields
//! - `NNN_<id>_original.html`: body as fetched
//! - `NNN_<id>_updated.html`: body with navigation applied
//! - `NNN_<id>.diff`: unified diff, only when the body changed
//!
//! plus a `summary.json` once the run finishes. Artifact failures are logged
//! and never change a document outcome.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use diffy::DiffOptions;
use serde_json::json;

use super::collaborator::FetchedDocument;
use super::errors::{ArtifactError, ArtifactResult};
use super::orchestrator::RunObserver;
use super::outcome::RunSummary;
use crate::navigation::DocumentRef;
use crate::observability::{log_event_with_fields, Event};

/// `<base>/tmp/sync-YYYYmmdd-HHMMSS`
pub fn default_workdir(base: &Path, now: DateTime<Utc>) -> PathBuf {
    base.join("tmp")
        .join(format!("sync-{}", now.format("%Y%m%d-%H%M%S")))
}

/// File stem shared by every artifact of one document
pub fn artifact_stem(document: &DocumentRef) -> String {
    format!("{:03}_{}", document.position + 1, document.id.replace(['/', '\\'], "_"))
}

/// Unified diff between two bodies, labelled with the artifact file names
///
/// Empty when the bodies are identical.
pub fn unified_diff(stem: &str, original: &str, updated: &str) -> String {
    if original == updated {
        return String::new();
    }
    let mut options = DiffOptions::new();
    options
        .set_original_filename(format!("{}_original.html", stem))
        .set_modified_filename(format!("{}_updated.html", stem));
    options.create_patch(original, updated).to_string()
}

/// Writes per-document artifacts into an empty work directory
#[derive(Debug)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Use `dir`, creating it when absent
    ///
    /// Refuses a path that is a file or a non-empty directory so a run never
    /// mixes its artifacts with an earlier one.
    pub fn create(dir: impl Into<PathBuf>) -> ArtifactResult<Self> {
        let dir = dir.into();
        if dir.exists() {
            if !dir.is_dir() {
                return Err(ArtifactError::NotADirectory(dir));
            }
            let mut entries = fs::read_dir(&dir).map_err(|e| ArtifactError::io(&dir, e))?;
            if entries.next().is_some() {
                return Err(ArtifactError::NotEmpty(dir));
            }
        } else {
            fs::create_dir_all(&dir).map_err(|e| ArtifactError::io(&dir, e))?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, contents: &str) -> ArtifactResult<()> {
        let path = self.dir.join(name);
        fs::write(&path, contents).map_err(|e| ArtifactError::io(path, e))
    }

    /// Write meta, original, updated and (when changed) diff files
    pub fn write_document(
        &self,
        document: &DocumentRef,
        fetched: &FetchedDocument,
        updated: &str,
    ) -> ArtifactResult<()> {
        let stem = artifact_stem(document);
        let meta = json!({
            "document": document,
            "preserved": fetched.preserved.to_json(),
        });
        self.write(&format!("{}_meta.json", stem), &serde_json::to_string_pretty(&meta)?)?;
        self.write(&format!("{}_original.html", stem), &fetched.body)?;
        self.write(&format!("{}_updated.html", stem), updated)?;

        let diff = unified_diff(&stem, &fetched.body, updated);
        if !diff.is_empty() {
            self.write(&format!("{}.diff", stem), &diff)?;
        }
        Ok(())
    }

    /// Write `summary.json`
    pub fn write_summary(&self, summary: &RunSummary) -> ArtifactResult<()> {
        let text = serde_json::to_string_pretty(&summary.to_json())?;
        self.write("summary.json", &text)
    }
}

impl RunObserver for ArtifactWriter {
    fn document_edited(&mut self, document: &DocumentRef, fetched: &FetchedDocument, updated: &str) {
        if let Err(e) = self.write_document(document, fetched, updated) {
            let detail = e.to_string();
            log_event_with_fields(
                Event::ArtifactWriteFailed,
                &[("id", &document.id), ("detail", &detail)],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::collaborator::PreservedFields;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn doc(position: usize, id: &str) -> DocumentRef {
        DocumentRef {
            id: id.to_string(),
            title: format!("Title {}", id),
            position,
            url: format!("https://example.com/{}", id),
        }
    }

    fn fetched(body: &str) -> FetchedDocument {
        let mut preserved = PreservedFields::new();
        preserved.insert("is_mature", json!(false));
        FetchedDocument {
            body: body.to_string(),
            preserved,
        }
    }

    #[test]
    fn test_default_workdir_is_timestamped() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let dir = default_workdir(Path::new("/base"), now);
        assert_eq!(dir, PathBuf::from("/base/tmp/sync-20240309-070501"));
    }

    #[test]
    fn test_stem_is_one_based_and_path_safe() {
        assert_eq!(artifact_stem(&doc(0, "abc")), "001_abc");
        assert_eq!(artifact_stem(&doc(11, "a/b")), "012_a_b");
    }

    #[test]
    fn test_create_accepts_missing_and_empty_dirs() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nested").join("run");
        let writer = ArtifactWriter::create(&missing).unwrap();
        assert!(writer.dir().is_dir());

        let empty = tmp.path().join("empty");
        fs::create_dir(&empty).unwrap();
        assert!(ArtifactWriter::create(&empty).is_ok());
    }

    #[test]
    fn test_create_rejects_file_and_non_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            ArtifactWriter::create(&file),
            Err(ArtifactError::NotADirectory(_))
        ));

        let full = tmp.path().join("full");
        fs::create_dir(&full).unwrap();
        fs::write(full.join("old.html"), "x").unwrap();
        assert!(matches!(
            ArtifactWriter::create(&full),
            Err(ArtifactError::NotEmpty(_))
        ));
    }

    #[test]
    fn test_write_document_changed_body_writes_diff() {
        let tmp = TempDir::new().unwrap();
        let writer = ArtifactWriter::create(tmp.path().join("run")).unwrap();
        let document = doc(1, "xyz");

        writer
            .write_document(&document, &fetched("<p>story</p>"), "<p>nav</p>\n<p>story</p>")
            .unwrap();

        let dir = writer.dir();
        assert!(dir.join("002_xyz_meta.json").exists());
        assert_eq!(
            fs::read_to_string(dir.join("002_xyz_original.html")).unwrap(),
            "<p>story</p>"
        );
        let diff = fs::read_to_string(dir.join("002_xyz.diff")).unwrap();
        assert!(diff.contains("002_xyz_original.html"));
        assert!(diff.contains("+<p>nav</p>"));

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("002_xyz_meta.json")).unwrap())
                .unwrap();
        assert_eq!(meta["document"]["id"], "xyz");
        assert_eq!(meta["preserved"]["is_mature"], false);
    }

    #[test]
    fn test_write_document_unchanged_body_has_no_diff() {
        let tmp = TempDir::new().unwrap();
        let writer = ArtifactWriter::create(tmp.path().join("run")).unwrap();
        writer
            .write_document(&doc(0, "same"), &fetched("<p>x</p>"), "<p>x</p>")
            .unwrap();
        assert!(writer.dir().join("001_same_updated.html").exists());
        assert!(!writer.dir().join("001_same.diff").exists());
    }

    #[test]
    fn test_unified_diff_empty_for_identical() {
        assert!(unified_diff("001_a", "same", "same").is_empty());
    }
}
