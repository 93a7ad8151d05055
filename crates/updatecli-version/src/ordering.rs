//! Deterministic maximum selection

use std::cmp::Ordering;

/// Greatest item under `compare`; on ties the earliest item wins
/// (`Iterator::max_by` keeps the last one).
pub(crate) fn first_max_by<T, F>(items: impl IntoIterator<Item = T>, mut compare: F) -> Option<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut best: Option<T> = None;
    for item in items {
        let replace = match &best {
            Some(current) => compare(&item, current) == Ordering::Greater,
            None => true,
        };
        if replace {
            best = Some(item);
        }
    }
    best
}
