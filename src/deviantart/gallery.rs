//! Gallery input parsing and listing payloads
//!
//! Pure functions over strings and JSON; no network access.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::errors::{ApiError, ApiResult};
use crate::navigation::DocumentSequence;

pub const GALLERY_HOST: &str = "www.deviantart.com";

/// Which gallery (and optionally which folder) to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryTarget {
    pub username: String,
    /// Numeric folder id or folder UUID taken from the URL
    pub folder_ref: Option<String>,
    pub folder_slug: Option<String>,
}

impl GalleryTarget {
    /// Folder UUIDs can be passed to the API as they are
    pub fn folder_uuid(&self) -> Option<&str> {
        self.folder_ref
            .as_deref()
            .filter(|folder| uuid::Uuid::parse_str(folder).is_ok())
    }
}

/// Parse a gallery URL or a bare username
///
/// URLs must be `https://www.deviantart.com/<user>/gallery[/<folder>[/<slug>]]`.
pub fn parse_gallery_target(raw: &str) -> ApiResult<GalleryTarget> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ApiError::InvalidGallery(
            "Gallery input must not be empty.".to_string(),
        ));
    }

    if !value.contains("://") {
        return Ok(GalleryTarget {
            username: value.to_string(),
            folder_ref: None,
            folder_slug: None,
        });
    }

    let url = Url::parse(value)
        .map_err(|e| ApiError::InvalidGallery(format!("Gallery URL is not valid: {}", e)))?;
    if url.host_str() != Some(GALLERY_HOST) {
        return Err(ApiError::InvalidGallery(
            "Gallery URL must use host www.deviantart.com.".to_string(),
        ));
    }

    let parts: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    if parts.len() < 2 || parts[1] != "gallery" {
        return Err(ApiError::InvalidGallery(
            "Gallery URL must look like /<user>/gallery/... .".to_string(),
        ));
    }

    let folder_ref = parts.get(2).and_then(|folder| {
        let numeric = !folder.is_empty() && folder.bytes().all(|b| b.is_ascii_digit());
        if numeric || uuid::Uuid::parse_str(folder).is_ok() {
            Some(folder.to_string())
        } else {
            None
        }
    });
    let folder_slug = parts.get(3).map(|slug| slug.trim().to_lowercase());

    Ok(GalleryTarget {
        username: parts[0].to_string(),
        folder_ref,
        folder_slug,
    })
}

/// Gallery folder name normalized for slug comparison
///
/// Lowercases and drops everything outside `[a-z0-9]`. Non-ASCII letters are
/// dropped rather than folded.
pub fn slugify_name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// One gallery entry from a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviationSummary {
    pub deviation_id: String,
    pub title: String,
    pub url: String,
    /// Lowercased `type`, `literature` for text entries, else `unknown`
    pub kind: String,
}

impl DeviationSummary {
    pub fn is_literature(&self) -> bool {
        self.kind == "literature"
    }
}

fn text_field(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Entries of a gallery listing page
///
/// Entries without id, title or url are dropped.
pub fn parse_gallery_results(payload: &Value) -> ApiResult<Vec<DeviationSummary>> {
    let results = payload
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ApiError::InvalidResponse("Gallery API response is missing a 'results' list.".to_string())
        })?;

    let mut items = Vec::new();
    for entry in results.iter().filter(|entry| entry.is_object()) {
        let deviation_id = text_field(entry, "deviationid");
        let title = text_field(entry, "title");
        let url = text_field(entry, "url");
        let mut kind = text_field(entry, "type").to_lowercase();
        if kind.is_empty() && entry.get("text_content").is_some_and(Value::is_object) {
            kind = "literature".to_string();
        }
        if kind.is_empty() {
            kind = "unknown".to_string();
        }
        if deviation_id.is_empty() || title.is_empty() || url.is_empty() {
            continue;
        }
        items.push(DeviationSummary {
            deviation_id,
            title,
            url,
            kind,
        });
    }
    Ok(items)
}

/// A gallery folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryFolder {
    pub folder_id: String,
    pub name: String,
}

/// Entries of a folder listing page
pub fn parse_folders(payload: &Value) -> ApiResult<Vec<GalleryFolder>> {
    let results = payload
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ApiError::InvalidResponse(
                "Gallery folders API response is missing a 'results' list.".to_string(),
            )
        })?;

    Ok(results
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| {
            let folder_id = text_field(entry, "folderid");
            let name = text_field(entry, "name");
            if folder_id.is_empty() || name.is_empty() {
                None
            } else {
                Some(GalleryFolder { folder_id, name })
            }
        })
        .collect())
}

/// Folder whose name matches `slug` after slugification
pub fn match_folder<'a>(folders: &'a [GalleryFolder], slug: &str) -> Option<&'a GalleryFolder> {
    let wanted = slugify_name(slug);
    folders.iter().find(|folder| slugify_name(&folder.name) == wanted)
}

/// Deviation URLs of `username` in page order, first occurrence only
pub fn extract_gallery_deviation_urls(html: &str, username: &str) -> Vec<String> {
    let pattern = format!(
        r#"https://www\.deviantart\.com/{}/art/[^"]+"#,
        regex::escape(username)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    re.find_iter(html)
        .map(|m| m.as_str().to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

pub fn normalize_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Order the listing is turned into a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    /// As returned by the listing API
    Ascending,
    /// Reverse of the listing API order
    #[default]
    Descending,
}

impl ListingOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingOrder::Ascending => "ascending",
            ListingOrder::Descending => "descending",
        }
    }

    /// Apply this order to entries in listing API order
    pub fn arrange<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if *self == ListingOrder::Descending {
            items.reverse();
        }
        items
    }
}

/// Literature entries as a run sequence, in `order`
pub fn literature_sequence(deviations: &[DeviationSummary], order: ListingOrder) -> DocumentSequence {
    let literature: Vec<_> = deviations.iter().filter(|d| d.is_literature()).collect();
    DocumentSequence::from_listing(order.arrange(literature).into_iter().map(|d| {
        (
            d.deviation_id.as_str(),
            d.title.as_str(),
            d.url.as_str(),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_target_from_gallery_url() {
        let target =
            parse_gallery_target("https://www.deviantart.com/zoec98/gallery/100193480/testgallery")
                .unwrap();
        assert_eq!(target.username, "zoec98");
        assert_eq!(target.folder_ref.as_deref(), Some("100193480"));
        assert_eq!(target.folder_slug.as_deref(), Some("testgallery"));
        assert_eq!(target.folder_uuid(), None);
    }

    #[test]
    fn test_parse_target_from_username() {
        let target = parse_gallery_target("  zoec98 ").unwrap();
        assert_eq!(target.username, "zoec98");
        assert!(target.folder_ref.is_none());
    }

    #[test]
    fn test_parse_target_with_folder_uuid() {
        let target = parse_gallery_target(
            "https://www.deviantart.com/zoec98/gallery/0f3b6a1c-8a9e-4b2a-9d5e-1c2b3a4d5e6f",
        )
        .unwrap();
        assert_eq!(
            target.folder_uuid(),
            Some("0f3b6a1c-8a9e-4b2a-9d5e-1c2b3a4d5e6f")
        );
    }

    #[test]
    fn test_parse_target_rejects_bad_input() {
        assert!(parse_gallery_target("   ").is_err());
        assert!(matches!(
            parse_gallery_target("https://example.com/zoec98/gallery/100193480/testgallery"),
            Err(ApiError::InvalidGallery(_))
        ));
        assert!(parse_gallery_target("https://www.deviantart.com/zoec98/art/x").is_err());
    }

    #[test]
    fn test_gallery_all_has_no_folder() {
        let target = parse_gallery_target("https://www.deviantart.com/zoec98/gallery/all").unwrap();
        assert!(target.folder_ref.is_none());
        assert_eq!(target.folder_slug, None);
    }

    #[test]
    fn test_parse_gallery_results_drops_incomplete_entries() {
        let payload = json!({
            "results": [
                {"deviationid": "uuid-1", "title": "Title 1",
                 "url": "https://www.deviantart.com/a/art/x", "type": "literature"},
                {"deviationid": "", "title": "missing id",
                 "url": "https://www.deviantart.com/a/art/y", "type": "literature"},
                {"deviationid": "uuid-3", "title": "Text",
                 "url": "https://www.deviantart.com/a/art/z", "text_content": {"excerpt": "..."}},
                {"deviationid": "uuid-4", "title": "Pic",
                 "url": "https://www.deviantart.com/a/art/w"},
                "not an object",
            ]
        });

        let results = parse_gallery_results(&payload).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].deviation_id, "uuid-1");
        assert!(results[0].is_literature());
        assert!(results[1].is_literature());
        assert_eq!(results[2].kind, "unknown");
    }

    #[test]
    fn test_parse_gallery_results_requires_results_list() {
        assert!(matches!(
            parse_gallery_results(&json!({"has_more": false})),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_slugify_name_matches_gallery_slug_style() {
        assert_eq!(slugify_name("Test Gallery"), "testgallery");
        assert_eq!(slugify_name("Part 2: The-End!"), "part2theend");
    }

    #[test]
    fn test_match_folder_by_slug() {
        let folders = parse_folders(&json!({
            "results": [
                {"folderid": "F1", "name": "Featured"},
                {"folderid": "F2", "name": "Test Gallery"},
                {"folderid": "", "name": "broken"},
            ]
        }))
        .unwrap();
        assert_eq!(folders.len(), 2);
        assert_eq!(match_folder(&folders, "testgallery").unwrap().folder_id, "F2");
        assert!(match_folder(&folders, "other").is_none());
    }

    #[test]
    fn test_extract_urls_preserves_order_and_deduplicates() {
        let html = r#"
            <a href="https://www.deviantart.com/zoec98/art/A-1"></a>
            <a href="https://www.deviantart.com/zoec98/art/B-2"></a>
            <a href="https://www.deviantart.com/zoec98/art/A-1"></a>
            <a href="https://www.deviantart.com/someone/art/C-3"></a>
        "#;
        assert_eq!(
            extract_gallery_deviation_urls(html, "zoec98"),
            vec![
                "https://www.deviantart.com/zoec98/art/A-1",
                "https://www.deviantart.com/zoec98/art/B-2",
            ]
        );
    }

    #[test]
    fn test_literature_sequence_order() {
        let entry = |id: &str, kind: &str| DeviationSummary {
            deviation_id: id.to_string(),
            title: id.to_uppercase(),
            url: format!("https://www.deviantart.com/a/art/{}", id),
            kind: kind.to_string(),
        };
        let listing = vec![
            entry("c3", "literature"),
            entry("p", "image"),
            entry("c2", "literature"),
            entry("c1", "literature"),
        ];

        let desc = literature_sequence(&listing, ListingOrder::Descending);
        let ids: Vec<_> = desc.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);

        let asc = literature_sequence(&listing, ListingOrder::Ascending);
        assert_eq!(asc.get(0).unwrap().id, "c3");
        assert_eq!(asc.len(), 3);
    }
}
