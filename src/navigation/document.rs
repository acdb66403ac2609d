//! Document references and the run-scoped sequence snapshot

use std::collections::HashSet;

use serde::Serialize;

/// One literature document as listed for this run
///
/// Created once from the listing response and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRef {
    /// Opaque stable identifier (a deviation UUID on DeviantArt)
    pub id: String,
    pub title: String,
    /// Index within the current run's sequence
    pub position: usize,
    /// Informational only; rendered into navigation links
    pub url: String,
}

/// Immutable, ordered snapshot of the documents processed in one run
///
/// Order is whatever the caller supplies. The only normalization is that a
/// repeated id keeps its first occurrence, so positions stay unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSequence {
    docs: Vec<DocumentRef>,
}

impl DocumentSequence {
    /// Build a sequence from `(id, title, url)` entries in display order
    pub fn from_listing<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut docs = Vec::new();

        for (id, title, url) in entries {
            let id = id.into();
            if !seen.insert(id.clone()) {
                continue;
            }
            docs.push(DocumentRef {
                id,
                title: title.into(),
                position: docs.len(),
                url: url.into(),
            });
        }

        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&DocumentRef> {
        self.docs.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentRef> {
        self.docs.iter()
    }

    pub fn as_slice(&self) -> &[DocumentRef] {
        &self.docs
    }
}

impl<'a> IntoIterator for &'a DocumentSequence {
    type Item = &'a DocumentRef;
    type IntoIter = std::slice::Iter<'a, DocumentRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_listing_order() {
        let seq = DocumentSequence::from_listing(vec![
            ("c", "Chapter 3", "https://x/c"),
            ("a", "Chapter 1", "https://x/a"),
        ]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(0).unwrap().id, "c");
        assert_eq!(seq.get(1).unwrap().position, 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first_occurrence() {
        let seq = DocumentSequence::from_listing(vec![
            ("a", "A", "u1"),
            ("b", "B", "u2"),
            ("a", "A again", "u3"),
        ]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(0).unwrap().title, "A");
        assert_eq!(seq.get(1).unwrap().id, "b");
        assert_eq!(seq.get(1).unwrap().position, 1);
    }

    #[test]
    fn test_empty_listing() {
        let seq = DocumentSequence::from_listing(Vec::<(String, String, String)>::new());
        assert!(seq.is_empty());
        assert!(seq.get(0).is_none());
    }
}
