//! Pure edits over a voice's stamp sequence.
//!
//! Every operation takes the current sequence by reference and returns a fresh `Vec<Stamp>`, so
//! a snapshot handed to a presentation layer is never mutated behind its back.
//!
//! Ordering rule: the sequence is re-sorted by `start_time` on insertion only. Boundary moves are
//! applied verbatim and may leave a stamp out of place or with `end <= start`; the
//! [`StampValidator`] hook reports those cases without blocking the edit.

use tracing::debug;

use crate::pivot::pivot_index;
use crate::stamp::Stamp;

/// Which edge of a stamp a boundary move applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

/// Insert a new open stamp at `current_time` and return the sequence with the stamp's index.
pub fn open_stamp(stamps: &[Stamp], current_time: f64) -> (Vec<Stamp>, usize) {
    let stamp = Stamp::open(current_time);
    let id = stamp.id;

    let mut next = stamps.to_vec();
    next.push(stamp);
    // Stable sort keeps equal start times in insertion order.
    next.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let index = next
        .iter()
        .position(|s| s.id == id)
        .unwrap_or(next.len() - 1);
    (next, index)
}

/// Close the pivot stamp at `current_time`.
///
/// Returns the index of the closed stamp, or `None` (and an unchanged copy) when no open stamp
/// precedes `current_time`.
pub fn close_stamp(stamps: &[Stamp], current_time: f64) -> (Vec<Stamp>, Option<usize>) {
    let mut next = stamps.to_vec();
    let Some(index) = pivot_index(&next, current_time) else {
        debug!(current_time, "close requested with no open stamp before it");
        return (next, None);
    };

    next[index].end_time = Some(current_time);
    (next, Some(index))
}

/// Shift one boundary of the stamp at `index` by `delta_seconds`.
///
/// Moving the end of an open stamp, or addressing a missing index, leaves the sequence as is.
pub fn move_boundary(
    stamps: &[Stamp],
    index: usize,
    boundary: Boundary,
    delta_seconds: f64,
) -> Vec<Stamp> {
    let mut next = stamps.to_vec();
    let Some(stamp) = next.get_mut(index) else {
        debug!(index, "boundary move on a missing stamp");
        return next;
    };

    match boundary {
        Boundary::Start => stamp.start_time += delta_seconds,
        Boundary::End => {
            if let Some(end) = stamp.end_time.as_mut() {
                *end += delta_seconds;
            }
        }
    }

    next
}

/// Replace the text of the stamp at `index`.
pub fn set_text(stamps: &[Stamp], index: usize, text: impl Into<String>) -> Vec<Stamp> {
    let mut next = stamps.to_vec();
    match next.get_mut(index) {
        Some(stamp) => stamp.text = text.into(),
        None => debug!(index, "text edit on a missing stamp"),
    }
    next
}

/// Remove the stamp at `index`; later stamps move down by one.
pub fn delete_stamp(stamps: &[Stamp], index: usize) -> Vec<Stamp> {
    let mut next = stamps.to_vec();
    if index < next.len() {
        next.remove(index);
    } else {
        debug!(index, "delete on a missing stamp");
    }
    next
}

/// Something a validator found suspicious about a stamp sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationWarning {
    /// The stamp starts before the stamp preceding it.
    OutOfOrder { index: usize },
    /// The stamp's end is not after its start.
    Inverted { index: usize },
    /// The stamp starts before the beginning of the media.
    NegativeStart { index: usize },
}

/// Inspects a stamp sequence after a permissive edit.
///
/// Validators only report; edits are never rejected.
pub trait StampValidator {
    fn validate(&self, stamps: &[Stamp]) -> Vec<ValidationWarning>;
}

/// Flags stamps that start below zero, are out of chronological order, or are inverted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronologyValidator;

impl StampValidator for ChronologyValidator {
    fn validate(&self, stamps: &[Stamp]) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        for (index, stamp) in stamps.iter().enumerate() {
            if stamp.start_time < 0.0 {
                warnings.push(ValidationWarning::NegativeStart { index });
            }
            if index > 0 && stamp.start_time < stamps[index - 1].start_time {
                warnings.push(ValidationWarning::OutOfOrder { index });
            }
            if stamp.end_time.is_some_and(|end| end <= stamp.start_time) {
                warnings.push(ValidationWarning::Inverted { index });
            }
        }
        warnings
    }
}
