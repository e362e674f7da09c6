use crate::stamp::Stamp;

/// Index of the pivot stamp: the open stamp with the greatest `start_time` strictly before
/// `current_time`.
///
/// Ties go to the first such stamp in sequence order.
pub fn pivot_index(stamps: &[Stamp], current_time: f64) -> Option<usize> {
    let mut pivot: Option<usize> = None;
    for (index, stamp) in stamps.iter().enumerate() {
        if !stamp.is_open() || stamp.start_time >= current_time {
            continue;
        }
        if pivot.is_none_or(|p| stamp.start_time > stamps[p].start_time) {
            pivot = Some(index);
        }
    }
    pivot
}

/// Indices of the closed stamps with `start < current_time < end`, in sequence order.
pub fn covering_stamps(stamps: &[Stamp], current_time: f64) -> Vec<usize> {
    stamps
        .iter()
        .enumerate()
        .filter(|(_, s)| covers(s, current_time))
        .map(|(index, _)| index)
        .collect()
}

fn covers(stamp: &Stamp, current_time: f64) -> bool {
    stamp.start_time < current_time && stamp.end_time.is_some_and(|end| current_time < end)
}

/// How far `current_time` is through a closed stamp, in `[0, 1]`.
pub fn progress(stamp: &Stamp, current_time: f64) -> Option<f64> {
    let end = stamp.end_time?;
    let span = end - stamp.start_time;
    if span <= 0.0 {
        return None;
    }
    Some(((current_time - stamp.start_time) / span).clamp(0.0, 1.0))
}
