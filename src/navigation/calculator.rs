//! Navigation Calculator
//!
//! Maps a position in the ordered sequence to its first/prev/next/last
//! targets. The caller's order is ground truth; nothing is compared or sorted.

use super::document::DocumentRef;
use super::errors::{NavResult, NavigationError};

/// Link targets for one document, borrowed from the run's sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTargets<'a> {
    pub first: Option<&'a DocumentRef>,
    pub prev: Option<&'a DocumentRef>,
    pub next: Option<&'a DocumentRef>,
    pub last: Option<&'a DocumentRef>,
}

impl<'a> NavigationTargets<'a> {
    /// Targets in render order: first, prev, next, last
    pub fn in_order(&self) -> [Option<&'a DocumentRef>; 4] {
        [self.first, self.prev, self.next, self.last]
    }
}

/// Compute the targets for `sequence[position]`
///
/// Fails with `InvalidSequence` when the sequence is empty or the position is
/// out of range, and with `PositionMismatch` when the entry at `position`
/// records a different index.
pub fn compute(sequence: &[DocumentRef], position: usize) -> NavResult<NavigationTargets<'_>> {
    let len = sequence.len();
    let current = sequence
        .get(position)
        .ok_or(NavigationError::InvalidSequence { position, len })?;

    if current.position != position {
        return Err(NavigationError::PositionMismatch {
            expected: position,
            found: current.position,
        });
    }

    Ok(NavigationTargets {
        first: sequence.first(),
        prev: position.checked_sub(1).and_then(|p| sequence.get(p)),
        next: sequence.get(position + 1),
        last: sequence.last(),
    })
}
