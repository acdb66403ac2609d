//! Managed-block sentinels
//!
//! These literals are embedded in published documents. Changing any byte of
//! them orphans every block written by earlier versions.

use std::fmt;

pub const TOP_START: &str = "<!-- DA-STORY-EDIT:NAV:TOP:START -->";
pub const TOP_END: &str = "<!-- DA-STORY-EDIT:NAV:TOP:END -->";
pub const BOTTOM_START: &str = "<!-- DA-STORY-EDIT:NAV:BOTTOM:START -->";
pub const BOTTOM_END: &str = "<!-- DA-STORY-EDIT:NAV:BOTTOM:END -->";

/// Which managed block a marker pair delimits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Top,
    Bottom,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Top, Region::Bottom];

    pub fn start_marker(&self) -> &'static str {
        match self {
            Region::Top => TOP_START,
            Region::Bottom => BOTTOM_START,
        }
    }

    pub fn end_marker(&self) -> &'static str {
        match self {
            Region::Top => TOP_END,
            Region::Bottom => BOTTOM_END,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Top => "TOP",
            Region::Bottom => "BOTTOM",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every byte offset at which `marker` occurs literally in `body`
pub(crate) fn find_all(body: &str, marker: &str) -> Vec<usize> {
    body.match_indices(marker).map(|(idx, _)| idx).collect()
}
