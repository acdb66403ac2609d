//! # Navigation Errors

use std::fmt;

use thiserror::Error;

use super::markers::Region;

/// Result type for navigation operations
pub type NavResult<T> = Result<T, NavigationError>;

/// Why a region's markers could not be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerDefect {
    /// START present, END absent
    MissingEnd,
    /// END present, START absent
    MissingStart,
    /// START or END occurs more than once
    Duplicated,
    /// END occurs before START
    EndBeforeStart,
    /// Region overlaps or nests inside the other region
    Overlapping,
}

impl MarkerDefect {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingEnd => "start marker without matching end marker",
            Self::MissingStart => "end marker without matching start marker",
            Self::Duplicated => "marker occurs more than once",
            Self::EndBeforeStart => "end marker precedes start marker",
            Self::Overlapping => "region overlaps the other managed region",
        }
    }
}

impl fmt::Display for MarkerDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Navigation calculator and body editor errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// Empty sequence or position outside it. A caller bug, never tolerated.
    #[error("invalid sequence: position {position} outside sequence of length {len}")]
    InvalidSequence { position: usize, len: usize },

    /// The entry at `expected` claims a different position
    #[error("invalid sequence: entry at index {expected} records position {found}")]
    PositionMismatch { expected: usize, found: usize },

    /// Existing managed markup is ambiguous; the body is left untouched
    #[error("malformed {region} markers: {defect}")]
    MalformedMarkers { region: Region, defect: MarkerDefect },
}

impl NavigationError {
    /// Stable tag used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSequence { .. } | Self::PositionMismatch { .. } => "InvalidSequence",
            Self::MalformedMarkers { .. } => "MalformedMarkers",
        }
    }

    /// The offending region, for marker errors
    pub fn region(&self) -> Option<Region> {
        match self {
            Self::MalformedMarkers { region, .. } => Some(*region),
            _ => None,
        }
    }
}
