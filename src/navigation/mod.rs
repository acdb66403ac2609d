//! Navigation engine
//!
//! Pure, I/O-free core of da-story-edit:
//! - `document`: `DocumentRef` and the run-scoped `DocumentSequence`
//! - `calculator`: position -> first/prev/next/last targets
//! - `markers`: the bit-exact sentinels delimiting managed blocks
//! - `editor`: strip / render / apply over opaque body text

mod calculator;
mod document;
mod editor;
mod errors;
mod markers;

pub use calculator::{compute, NavigationTargets};
pub use document::{DocumentRef, DocumentSequence};
pub use editor::{apply, apply_with_report, render, strip, RegionScan, RenderedBlocks, StripReport};
pub use errors::{MarkerDefect, NavResult, NavigationError};
pub use markers::{Region, BOTTOM_END, BOTTOM_START, TOP_END, TOP_START};
