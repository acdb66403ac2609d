//! Document Body Editor
//!
//! Locates tool-managed navigation blocks in a document body, removes them,
//! and splices freshly rendered blocks at the start and end.
//!
//! # Guarantees
//!
//! - Pure: no I/O, the caller submits the returned string
//! - Fail-fast: ambiguous markers leave the body untouched and return
//!   `MalformedMarkers`; nothing is guessed at or repaired
//! - Idempotent: `apply(apply(b, t), t) == apply(b, t)` byte for byte
//!
//! # Boundary rule
//!
//! Each removed region takes exactly one line break with it on the side facing
//! the user content (after `TOP:END`, before `BOTTOM:START`). On the outward
//! side, text made only of line breaks between the region and the body edge is
//! dropped as well. `apply` inserts exactly one line break on each side, so a
//! second `strip` returns the same clean body the first one did.

use super::calculator::NavigationTargets;
use super::document::DocumentRef;
use super::errors::{MarkerDefect, NavResult, NavigationError};
use super::markers::{find_all, Region};

const LINK_SEPARATOR: &str = " | ";
const LABELS: [&str; 4] = ["first", "prev", "next", "last"];

/// What `strip` found for one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionScan {
    /// Neither marker present (first run for this document)
    Absent,
    /// Well-formed block removed; byte offsets of START and END-exclusive
    Removed { start: usize, end: usize },
}

/// Diagnostics of a successful strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripReport {
    pub top: RegionScan,
    pub bottom: RegionScan,
}

impl StripReport {
    pub fn region(&self, region: Region) -> RegionScan {
        match region {
            Region::Top => self.top,
            Region::Bottom => self.bottom,
        }
    }

    /// True when the body carried no managed markup at all
    pub fn is_first_run(&self) -> bool {
        self.top == RegionScan::Absent && self.bottom == RegionScan::Absent
    }
}

/// Rendered top and bottom blocks, markers included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlocks {
    pub top: String,
    pub bottom: String,
}

/// Marker span of a well-formed region: START offset to END-exclusive
#[derive(Debug, Clone, Copy)]
struct Span {
    region: Region,
    start: usize,
    end: usize,
}

fn locate(body: &str, region: Region) -> NavResult<Option<Span>> {
    let starts = find_all(body, region.start_marker());
    let ends = find_all(body, region.end_marker());

    let malformed = |defect| NavigationError::MalformedMarkers { region, defect };

    if starts.len() > 1 || ends.len() > 1 {
        return Err(malformed(MarkerDefect::Duplicated));
    }

    match (starts.first(), ends.first()) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(malformed(MarkerDefect::MissingEnd)),
        (None, Some(_)) => Err(malformed(MarkerDefect::MissingStart)),
        (Some(&start), Some(&end)) if end < start => Err(malformed(MarkerDefect::EndBeforeStart)),
        (Some(&start), Some(&end)) => Ok(Some(Span {
            region,
            start,
            end: end + region.end_marker().len(),
        })),
    }
}

fn is_line_breaks(text: &str) -> bool {
    text.chars().all(|c| c == '\n' || c == '\r')
}

fn line_break_prefix_len(text: &str) -> usize {
    if text.starts_with("\r\n") {
        2
    } else if text.starts_with('\n') {
        1
    } else {
        0
    }
}

fn line_break_suffix_len(text: &str) -> usize {
    if text.ends_with("\r\n") {
        2
    } else if text.ends_with('\n') {
        1
    } else {
        0
    }
}

/// Byte range to delete for `span`, boundary artifacts included
fn removal_range(body: &str, span: Span) -> (usize, usize) {
    let before = &body[..span.start];
    let after = &body[span.end..];

    match span.region {
        Region::Top => {
            let start = if is_line_breaks(before) { 0 } else { span.start };
            (start, span.end + line_break_prefix_len(after))
        }
        Region::Bottom => {
            let end = if is_line_breaks(after) { body.len() } else { span.end };
            (span.start - line_break_suffix_len(before), end)
        }
    }
}

/// Remove every well-formed managed region from `body`
///
/// Returns the clean body and a report of what was found. On any marker
/// defect the body is not modified and `MalformedMarkers` is returned.
pub fn strip(body: &str) -> NavResult<(String, StripReport)> {
    let top = locate(body, Region::Top)?;
    let bottom = locate(body, Region::Bottom)?;

    if let (Some(t), Some(b)) = (top, bottom) {
        if t.start < b.end && b.start < t.end {
            let inner = if t.start < b.start { Region::Bottom } else { Region::Top };
            return Err(NavigationError::MalformedMarkers {
                region: inner,
                defect: MarkerDefect::Overlapping,
            });
        }
    }

    let report = StripReport {
        top: top.map_or(RegionScan::Absent, |s| RegionScan::Removed {
            start: s.start,
            end: s.end,
        }),
        bottom: bottom.map_or(RegionScan::Absent, |s| RegionScan::Removed {
            start: s.start,
            end: s.end,
        }),
    };

    let mut ranges: Vec<(usize, usize)> = [top, bottom]
        .into_iter()
        .flatten()
        .map(|span| removal_range(body, span))
        .collect();
    ranges.sort_unstable();

    let mut clean = String::with_capacity(body.len());
    let mut cursor = 0;
    for (start, end) in ranges {
        if start > cursor {
            clean.push_str(&body[cursor..start]);
        }
        cursor = cursor.max(end);
    }
    clean.push_str(&body[cursor..]);

    Ok((clean, report))
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn link(label: &str, target: Option<&DocumentRef>) -> String {
    match target {
        Some(doc) if !doc.url.is_empty() => {
            format!("<a href=\"{}\">{}</a>", escape_attr(&doc.url), label)
        }
        // Placeholder keeps the link layout stable across documents
        _ => label.to_string(),
    }
}

fn render_block(region: Region, links: &str) -> String {
    format!(
        "{}\n<p>{}</p>\n{}",
        region.start_marker(),
        links,
        region.end_marker()
    )
}

/// Render the top and bottom blocks; both carry identical links
pub fn render(targets: &NavigationTargets<'_>) -> RenderedBlocks {
    let links = LABELS
        .iter()
        .zip(targets.in_order())
        .map(|(label, target)| link(label, target))
        .collect::<Vec<_>>()
        .join(LINK_SEPARATOR);

    RenderedBlocks {
        top: render_block(Region::Top, &links),
        bottom: render_block(Region::Bottom, &links),
    }
}

/// Strip, render, and splice, also returning what the strip found
pub fn apply_with_report(
    body: &str,
    targets: &NavigationTargets<'_>,
) -> NavResult<(String, StripReport)> {
    let (clean, report) = strip(body)?;
    let blocks = render(targets);

    let updated = if clean.is_empty() {
        format!("{}\n{}", blocks.top, blocks.bottom)
    } else {
        // A trailing CR would otherwise pair with the separator on the next strip
        let separator = if clean.ends_with('\r') { "\r\n" } else { "\n" };
        format!("{}\n{}{}{}", blocks.top, clean, separator, blocks.bottom)
    };

    Ok((updated, report))
}

/// Replace the managed navigation of `body` with blocks for `targets`
pub fn apply(body: &str, targets: &NavigationTargets<'_>) -> NavResult<String> {
    apply_with_report(body, targets).map(|(updated, _)| updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::calculator::compute;
    use crate::navigation::document::DocumentSequence;
    use crate::navigation::markers::{BOTTOM_END, BOTTOM_START, TOP_END, TOP_START};

    fn three() -> DocumentSequence {
        DocumentSequence::from_listing(vec![
            ("a", "A", "https://example.com/1"),
            ("b", "B", "https://example.com/2"),
            ("c", "C", "https://example.com/9"),
        ])
    }

    #[test]
    fn test_apply_inserts_top_and_bottom_blocks() {
        let s = three();
        let targets = compute(s.as_slice(), 0).unwrap();
        let updated = apply("<p>Hello world</p>", &targets).unwrap();

        assert!(updated.starts_with(TOP_START));
        assert!(updated.ends_with(BOTTOM_END));
        assert!(updated.contains(TOP_END));
        assert!(updated.contains(BOTTOM_START));
        assert!(updated.contains("\n<p>Hello world</p>\n"));
        assert_eq!(updated.matches(TOP_START).count(), 1);
        assert_eq!(updated.matches(BOTTOM_START).count(), 1);
    }

    #[test]
    fn test_render_uses_placeholder_for_missing_targets() {
        let s = three();
        let targets = compute(s.as_slice(), 0).unwrap();
        let blocks = render(&targets);

        assert_eq!(
            blocks.top,
            format!(
                "{TOP_START}\n<p><a href=\"https://example.com/1\">first</a> | prev | \
                 <a href=\"https://example.com/2\">next</a> | \
                 <a href=\"https://example.com/9\">last</a></p>\n{TOP_END}"
            )
        );
        assert_eq!(
            blocks.top.replace(TOP_START, "").replace(TOP_END, ""),
            blocks.bottom.replace(BOTTOM_START, "").replace(BOTTOM_END, "")
        );
    }

    #[test]
    fn test_render_escapes_urls() {
        let s = DocumentSequence::from_listing(vec![("a", "A", "https://x/?a=1&b=\"2\"")]);
        let targets = compute(s.as_slice(), 0).unwrap();
        let blocks = render(&targets);
        assert!(blocks.top.contains("href=\"https://x/?a=1&amp;b=&quot;2&quot;\""));
    }

    #[test]
    fn test_strip_removes_existing_blocks() {
        let body = format!(
            "{TOP_START}\n<p>old</p>\n{TOP_END}\n<p>content</p>\n{BOTTOM_START}\n<p>old</p>\n{BOTTOM_END}"
        );
        let (clean, report) = strip(&body).unwrap();
        assert_eq!(clean, "<p>content</p>");
        assert!(!report.is_first_run());
        assert!(matches!(report.top, RegionScan::Removed { start: 0, .. }));
    }

    #[test]
    fn test_strip_without_markers_is_noop() {
        let body = "\n  <p>untouched</p>\n\n";
        let (clean, report) = strip(body).unwrap();
        assert_eq!(clean, body);
        assert!(report.is_first_run());
    }

    #[test]
    fn test_strip_drops_trailing_line_breaks_after_bottom() {
        let body = format!("{TOP_START}\nx\n{TOP_END}\n<p>c</p>\n{BOTTOM_START}\ny\n{BOTTOM_END}\r\n\n");
        let (clean, _) = strip(&body).unwrap();
        assert_eq!(clean, "<p>c</p>");
    }

    #[test]
    fn test_strip_handles_crlf_separators() {
        let body = format!("{TOP_START}\r\nx\r\n{TOP_END}\r\n<p>c</p>\r\n{BOTTOM_START}\r\ny\r\n{BOTTOM_END}");
        let (clean, _) = strip(&body).unwrap();
        assert_eq!(clean, "<p>c</p>");
    }

    #[test]
    fn test_strip_keeps_user_blank_lines_inside_content() {
        let body = format!("{TOP_START}\nx\n{TOP_END}\n\n<p>c</p>\n\n{BOTTOM_START}\ny\n{BOTTOM_END}");
        let (clean, _) = strip(&body).unwrap();
        assert_eq!(clean, "\n<p>c</p>\n");
    }

    #[test]
    fn test_strip_only_top_block() {
        let body = format!("{TOP_START}\nx\n{TOP_END}\n<p>c</p>");
        let (clean, report) = strip(&body).unwrap();
        assert_eq!(clean, "<p>c</p>");
        assert_eq!(report.bottom, RegionScan::Absent);
    }

    #[test]
    fn test_strip_block_in_middle_of_prose() {
        let body = format!("<p>intro</p>\n{TOP_START}\nx\n{TOP_END}\n<p>rest</p>");
        let (clean, _) = strip(&body).unwrap();
        assert_eq!(clean, "<p>intro</p>\n<p>rest</p>");
    }

    #[test]
    fn test_missing_end_fails() {
        let body = format!("{TOP_START}\n<p>story</p>");
        let err = strip(&body).unwrap_err();
        assert_eq!(
            err,
            NavigationError::MalformedMarkers {
                region: Region::Top,
                defect: MarkerDefect::MissingEnd,
            }
        );
    }

    #[test]
    fn test_missing_start_fails() {
        let body = format!("<p>story</p>\n{BOTTOM_END}");
        let err = strip(&body).unwrap_err();
        assert_eq!(err.region(), Some(Region::Bottom));
        assert!(matches!(
            err,
            NavigationError::MalformedMarkers { defect: MarkerDefect::MissingStart, .. }
        ));
    }

    #[test]
    fn test_duplicate_markers_fail() {
        let body = format!("{TOP_START}\n{TOP_END}\n{TOP_START}\n{TOP_END}");
        let err = strip(&body).unwrap_err();
        assert!(matches!(
            err,
            NavigationError::MalformedMarkers {
                region: Region::Top,
                defect: MarkerDefect::Duplicated
            }
        ));
    }

    #[test]
    fn test_end_before_start_fails() {
        let body = format!("{BOTTOM_END}\n<p>c</p>\n{BOTTOM_START}");
        let err = strip(&body).unwrap_err();
        assert!(matches!(
            err,
            NavigationError::MalformedMarkers {
                region: Region::Bottom,
                defect: MarkerDefect::EndBeforeStart
            }
        ));
    }

    #[test]
    fn test_nested_regions_fail() {
        let body = format!("{TOP_START}\n{BOTTOM_START}\n{BOTTOM_END}\n{TOP_END}");
        let err = strip(&body).unwrap_err();
        assert!(matches!(
            err,
            NavigationError::MalformedMarkers {
                region: Region::Bottom,
                defect: MarkerDefect::Overlapping
            }
        ));
    }

    #[test]
    fn test_apply_fails_identically_to_strip() {
        let s = three();
        let targets = compute(s.as_slice(), 1).unwrap();
        let body = format!("{TOP_START}\n<p>story</p>");
        assert_eq!(apply(&body, &targets), Err(strip(&body).unwrap_err()));
    }

    #[test]
    fn test_apply_empty_body() {
        let s = three();
        let targets = compute(s.as_slice(), 1).unwrap();
        let once = apply("", &targets).unwrap();
        let blocks = render(&targets);
        assert_eq!(once, format!("{}\n{}", blocks.top, blocks.bottom));
        assert_eq!(apply(&once, &targets).unwrap(), once);
    }

    #[test]
    fn test_apply_is_idempotent_with_edge_line_breaks() {
        let s = three();
        let targets = compute(s.as_slice(), 2).unwrap();
        for body in ["\n<p>a</p>", "<p>a</p>\n", "\r\n\r\n<p>a</p>\r\n", "\n", "<p>a</p>\r", "\r"] {
            let once = apply(body, &targets).unwrap();
            let twice = apply(&once, &targets).unwrap();
            assert_eq!(once, twice, "body {:?}", body);
        }
    }

    #[test]
    fn test_apply_replaces_stale_links() {
        let s = three();
        let first = compute(s.as_slice(), 0).unwrap();
        let middle = compute(s.as_slice(), 1).unwrap();

        let stale = apply("<p>story</p>", &first).unwrap();
        let fresh = apply(&stale, &middle).unwrap();
        assert_eq!(fresh, apply("<p>story</p>", &middle).unwrap());
    }
}
